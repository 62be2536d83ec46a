// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the [`Unlock`] types.

use std::collections::HashSet;

use packable::{error::UnpackError, packer::Packer, unpacker::Unpacker, Packable};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use super::Signature;
use crate::types::{
    codec::{CollectionRules, LengthPrefix, Verify},
    error::Error,
    protocol::ProtocolParameters,
    util::{from_json_value, json_kind_u8, Tagged},
};

fn unsupported_unlock_kind(discriminant: u8) -> Error {
    Error::UnsupportedTypeDiscriminant {
        kind: "unlock",
        discriminant: discriminant as u32,
    }
}

/// Unlocks an input with a signature.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Packable)]
#[packable(unpack_error = Error)]
pub struct SignatureUnlock {
    /// The signature over the transaction essence.
    pub signature: Signature,
}

impl SignatureUnlock {
    /// The discriminant of the unlock.
    pub const KIND: u8 = 0;
}

/// Points at an earlier unlock of the same transaction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Packable)]
#[packable(unpack_error = Error)]
pub struct IndexUnlock {
    /// The index of the referenced unlock.
    pub reference: u16,
}

/// The different types of [`Unlock`]s.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Packable)]
#[packable(unpack_error = Error)]
#[packable(tag_type = u8, with_error = unsupported_unlock_kind)]
pub enum Unlock {
    /// A signature unlock.
    #[packable(tag = SignatureUnlock::KIND)]
    Signature(SignatureUnlock),
    /// Reuses the signature unlock at the referenced index.
    #[packable(tag = Unlock::REFERENCE_KIND)]
    Reference(IndexUnlock),
    /// Unlocks through the alias output consumed at the referenced index.
    #[packable(tag = Unlock::ALIAS_KIND)]
    Alias(IndexUnlock),
    /// Unlocks through the NFT output consumed at the referenced index.
    #[packable(tag = Unlock::NFT_KIND)]
    Nft(IndexUnlock),
}

#[allow(missing_docs)]
impl Unlock {
    pub const REFERENCE_KIND: u8 = 1;
    pub const ALIAS_KIND: u8 = 2;
    pub const NFT_KIND: u8 = 3;

    /// Creates a signature unlock.
    pub fn signature(signature: impl Into<Signature>) -> Self {
        Self::Signature(SignatureUnlock {
            signature: signature.into(),
        })
    }

    /// Creates a reference unlock.
    pub fn reference(reference: u16) -> Self {
        Self::Reference(IndexUnlock { reference })
    }

    pub fn kind(&self) -> u8 {
        match self {
            Self::Signature(_) => SignatureUnlock::KIND,
            Self::Reference(_) => Self::REFERENCE_KIND,
            Self::Alias(_) => Self::ALIAS_KIND,
            Self::Nft(_) => Self::NFT_KIND,
        }
    }

    /// The referenced index of the non-signature unlocks.
    pub fn reference_index(&self) -> Option<u16> {
        match self {
            Self::Signature(_) => None,
            Self::Reference(unlock) | Self::Alias(unlock) | Self::Nft(unlock) => Some(unlock.reference),
        }
    }
}

impl Verify for Unlock {
    fn verify_syntax<const VERIFY: bool>(&self, _: &ProtocolParameters) -> Result<(), Error> {
        Ok(())
    }
}

impl Serialize for Unlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kind = self.kind();
        match self {
            Self::Signature(unlock) => Tagged::new(kind, unlock).serialize(serializer),
            Self::Reference(unlock) | Self::Alias(unlock) | Self::Nft(unlock) => {
                Tagged::new(kind, unlock).serialize(serializer)
            }
        }
    }
}

impl<'de> Deserialize<'de> for Unlock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match json_kind_u8::<D::Error>("unlock", &value)? {
            SignatureUnlock::KIND => Self::Signature(from_json_value(value)?),
            Self::REFERENCE_KIND => Self::Reference(from_json_value(value)?),
            Self::ALIAS_KIND => Self::Alias(from_json_value(value)?),
            Self::NFT_KIND => Self::Nft(from_json_value(value)?),
            discriminant => return Err(D::Error::custom(unsupported_unlock_kind(discriminant))),
        })
    }
}

/// The unlocks of a transaction, index-aligned with its inputs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Unlocks(Box<[Unlock]>);

impl Unlocks {
    /// The rules every set of unlocks satisfies.
    pub const RULES: CollectionRules = CollectionRules::new("unlock", LengthPrefix::U16, 1, 128).allowed_types(&[
        SignatureUnlock::KIND,
        Unlock::REFERENCE_KIND,
        Unlock::ALIAS_KIND,
        Unlock::NFT_KIND,
    ]);

    /// Wraps unlocks that are aligned with the inputs of a transaction.
    pub fn new(unlocks: impl Into<Box<[Unlock]>>) -> Self {
        Self(unlocks.into())
    }

    /// Checks that every reference points strictly backwards, that reference unlocks point at signature unlocks and
    /// that no signature unlock is repeated.
    pub fn verify(&self) -> Result<(), Error> {
        let mut signatures = HashSet::new();
        for (index, unlock) in self.0.iter().enumerate() {
            match unlock {
                Unlock::Signature(unlock) => {
                    if !signatures.insert(unlock.signature) {
                        return Err(Error::DuplicateElement { kind: "signature unlock", index });
                    }
                }
                Unlock::Reference(IndexUnlock { reference }) => {
                    let target = self.0.get(*reference as usize);
                    if *reference as usize >= index || !matches!(target, Some(Unlock::Signature(_))) {
                        return Err(Error::InvalidUnlockReference {
                            index,
                            reference: *reference,
                        });
                    }
                }
                Unlock::Alias(IndexUnlock { reference }) | Unlock::Nft(IndexUnlock { reference }) => {
                    if *reference as usize >= index {
                        return Err(Error::InvalidUnlockReference {
                            index,
                            reference: *reference,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

impl std::ops::Deref for Unlocks {
    type Target = [Unlock];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Packable for Unlocks {
    type UnpackError = Error;

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        Self::RULES.pack(&self.0, packer)
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(
        unpacker: &mut U,
    ) -> Result<Self, UnpackError<Self::UnpackError, U::Error>> {
        let unlocks = Self(Self::RULES.unpack::<_, _, VERIFY>(unpacker)?);
        if VERIFY {
            unlocks.verify().map_err(UnpackError::Packable)?;
        }
        Ok(unlocks)
    }
}

impl Verify for Unlocks {
    fn verify_syntax<const VERIFY: bool>(&self, _: &ProtocolParameters) -> Result<(), Error> {
        Self::RULES.verify_with::<_, VERIFY>(&self.0)?;
        if VERIFY {
            self.verify()?;
        }
        Ok(())
    }
}

#[cfg(all(test, feature = "rand"))]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::types::codec::{CodecConfig, CodecExt};

    #[test]
    fn test_unlock_json() {
        let unlock = Unlock::signature(Signature::rand());
        let json = serde_json::to_value(&unlock).unwrap();
        assert_eq!(json["type"], 0);
        assert_eq!(json["signature"]["type"], 0);
        assert_eq!(serde_json::from_value::<Unlock>(json).unwrap(), unlock);

        let unlock = Unlock::reference(3);
        let json = serde_json::to_value(&unlock).unwrap();
        assert_eq!(json, serde_json::json!({ "type": 1, "reference": 3 }));
        assert_eq!(serde_json::from_value::<Unlock>(json).unwrap(), unlock);
    }

    #[test]
    fn test_unlocks_binary() {
        let config = CodecConfig::default();
        let unlocks = Unlocks::new(vec![
            Unlock::signature(Signature::rand()),
            Unlock::reference(0),
            Unlock::Alias(IndexUnlock { reference: 1 }),
        ]);
        let bytes = unlocks.pack_with(&config).unwrap();
        assert_eq!(&bytes[..3], &[3, 0, 0]);
        assert_eq!(Unlocks::unpack_with(&bytes, &config).unwrap(), unlocks);
    }

    #[test]
    fn test_unlock_binary() {
        let config = CodecConfig::default();
        let bytes = Unlock::Nft(IndexUnlock { reference: 2 }).pack_with(&config).unwrap();
        assert_eq!(bytes, vec![Unlock::NFT_KIND, 2, 0]);
        assert!(matches!(
            Unlock::unpack_with([4u8, 0, 0], &config),
            Err(Error::UnsupportedTypeDiscriminant { discriminant: 4, .. })
        ));
    }

    #[test]
    fn forward_reference_is_rejected() {
        let unlocks = Unlocks::new(vec![Unlock::reference(1), Unlock::signature(Signature::rand())]);
        assert!(matches!(
            unlocks.verify(),
            Err(Error::InvalidUnlockReference { index: 0, reference: 1 })
        ));
    }

    #[test]
    fn reference_to_reference_is_rejected() {
        let unlocks = Unlocks::new(vec![
            Unlock::signature(Signature::rand()),
            Unlock::reference(0),
            Unlock::reference(1),
        ]);
        assert!(matches!(
            unlocks.verify(),
            Err(Error::InvalidUnlockReference { index: 2, reference: 1 })
        ));
    }

    #[test]
    fn duplicate_signature_is_rejected() {
        let signature = Signature::rand();
        let unlocks = Unlocks::new(vec![Unlock::signature(signature), Unlock::signature(signature)]);
        assert!(matches!(
            unlocks.verify(),
            Err(Error::DuplicateElement { index: 1, .. })
        ));
    }

    #[test]
    fn invalid_reference_fails_when_unpacking() {
        let config = CodecConfig::default();
        let unlocks = Unlocks::new(vec![Unlock::reference(1), Unlock::signature(Signature::rand())]);
        let bytes = unlocks.pack_with(&config.clone().with_verify(false)).unwrap();
        assert!(matches!(
            Unlocks::unpack_with(&bytes, &config),
            Err(Error::InvalidUnlockReference { index: 0, reference: 1 })
        ));
        assert!(matches!(
            Unlocks::unpack_with([0u8, 0], &config),
            Err(Error::InvalidCollectionCardinality { count: 0, .. })
        ));
    }
}
