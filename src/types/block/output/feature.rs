// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use packable::{error::UnpackError, packer::Packer, unpacker::Unpacker, Packable};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use crate::types::{
    block::Address,
    codec::{verify_length, CollectionRules, LengthPrefix},
    error::Error,
    util::{from_json_value, hexify, json_kind_u8, Tagged},
};

/// Identifies the sender of an output.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Packable)]
#[packable(unpack_error = Error)]
pub struct SenderFeature {
    /// The sender.
    pub address: Address,
}

/// Identifies the issuer of a chain output.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Packable)]
#[packable(unpack_error = Error)]
pub struct IssuerFeature {
    /// The issuer.
    pub address: Address,
}

/// Arbitrary binary data.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetadataFeature {
    /// The data.
    #[serde(with = "hexify")]
    pub data: Box<[u8]>,
}

#[allow(missing_docs)]
impl MetadataFeature {
    pub const LENGTH_MIN: usize = 1;
    pub const LENGTH_MAX: usize = 8192;

    fn verify<const VERIFY: bool>(data: &[u8]) -> Result<(), Error> {
        if VERIFY {
            verify_length("metadata feature", data.len(), Self::LENGTH_MIN, Self::LENGTH_MAX)
        } else {
            LengthPrefix::U16.check("metadata feature", data.len())
        }
    }
}

impl Packable for MetadataFeature {
    type UnpackError = Error;

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        LengthPrefix::U16.pack_bytes(&self.data, packer)
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(
        unpacker: &mut U,
    ) -> Result<Self, UnpackError<Self::UnpackError, U::Error>> {
        let data = LengthPrefix::U16.unpack_bytes::<_, VERIFY>(unpacker)?;
        Self::verify::<VERIFY>(&data).map_err(UnpackError::Packable)?;
        Ok(Self { data })
    }
}

/// A short tag used for indexing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagFeature {
    /// The tag.
    #[serde(with = "hexify")]
    pub tag: Box<[u8]>,
}

#[allow(missing_docs)]
impl TagFeature {
    pub const LENGTH_MIN: usize = 1;
    pub const LENGTH_MAX: usize = 64;

    fn verify<const VERIFY: bool>(tag: &[u8]) -> Result<(), Error> {
        if VERIFY {
            verify_length("tag feature", tag.len(), Self::LENGTH_MIN, Self::LENGTH_MAX)
        } else {
            LengthPrefix::U8.check("tag feature", tag.len())
        }
    }
}

impl Packable for TagFeature {
    type UnpackError = Error;

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        LengthPrefix::U8.pack_bytes(&self.tag, packer)
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(
        unpacker: &mut U,
    ) -> Result<Self, UnpackError<Self::UnpackError, U::Error>> {
        let tag = LengthPrefix::U8.unpack_bytes::<_, VERIFY>(unpacker)?;
        Self::verify::<VERIFY>(&tag).map_err(UnpackError::Packable)?;
        Ok(Self { tag })
    }
}

fn unsupported_feature_kind(discriminant: u8) -> Error {
    Error::UnsupportedTypeDiscriminant {
        kind: "feature",
        discriminant: discriminant as u32,
    }
}

/// The different [`Feature`] variants.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Packable)]
#[packable(unpack_error = Error)]
#[packable(tag_type = u8, with_error = unsupported_feature_kind)]
pub enum Feature {
    /// The sender feature.
    #[packable(tag = Feature::SENDER_KIND)]
    Sender(SenderFeature),
    /// The issuer feature.
    #[packable(tag = Feature::ISSUER_KIND)]
    Issuer(IssuerFeature),
    /// The metadata feature.
    #[packable(tag = Feature::METADATA_KIND)]
    Metadata(MetadataFeature),
    /// The tag feature.
    #[packable(tag = Feature::TAG_KIND)]
    Tag(TagFeature),
}

#[allow(missing_docs)]
impl Feature {
    pub const SENDER_KIND: u8 = 0;
    pub const ISSUER_KIND: u8 = 1;
    pub const METADATA_KIND: u8 = 2;
    pub const TAG_KIND: u8 = 3;

    pub fn kind(&self) -> u8 {
        match self {
            Self::Sender(_) => Self::SENDER_KIND,
            Self::Issuer(_) => Self::ISSUER_KIND,
            Self::Metadata(_) => Self::METADATA_KIND,
            Self::Tag(_) => Self::TAG_KIND,
        }
    }

    pub fn sender(address: impl Into<Address>) -> Self {
        Self::Sender(SenderFeature {
            address: address.into(),
        })
    }

    pub fn issuer(address: impl Into<Address>) -> Self {
        Self::Issuer(IssuerFeature {
            address: address.into(),
        })
    }

    pub fn metadata(data: impl Into<Box<[u8]>>) -> Self {
        Self::Metadata(MetadataFeature { data: data.into() })
    }

    pub fn tag(tag: impl Into<Box<[u8]>>) -> Self {
        Self::Tag(TagFeature { tag: tag.into() })
    }

    /// Checks the lengths of the binary features.
    pub fn verify<const VERIFY: bool>(&self) -> Result<(), Error> {
        match self {
            Self::Metadata(feature) => MetadataFeature::verify::<VERIFY>(&feature.data),
            Self::Tag(feature) => TagFeature::verify::<VERIFY>(&feature.tag),
            Self::Sender(_) | Self::Issuer(_) => Ok(()),
        }
    }
}

impl Serialize for Feature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kind = self.kind();
        match self {
            Self::Sender(feature) => Tagged::new(kind, feature).serialize(serializer),
            Self::Issuer(feature) => Tagged::new(kind, feature).serialize(serializer),
            Self::Metadata(feature) => Tagged::new(kind, feature).serialize(serializer),
            Self::Tag(feature) => Tagged::new(kind, feature).serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Feature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match json_kind_u8::<D::Error>("feature", &value)? {
            Self::SENDER_KIND => Self::Sender(from_json_value(value)?),
            Self::ISSUER_KIND => Self::Issuer(from_json_value(value)?),
            Self::METADATA_KIND => Self::Metadata(from_json_value(value)?),
            Self::TAG_KIND => Self::Tag(from_json_value(value)?),
            discriminant => return Err(D::Error::custom(unsupported_feature_kind(discriminant))),
        })
    }
}

/// A set of features. Which kinds are allowed depends on the output carrying them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Features(Box<[Feature]>);

impl Features {
    /// Rules for a feature set with the given allowed kinds. Every kind may occur once, in ascending order.
    pub const fn rules(kind: &'static str, allowed: &'static [u8]) -> CollectionRules {
        CollectionRules::new(kind, LengthPrefix::U8, 0, allowed.len())
            .allowed_types(allowed)
            .lexical_order()
            .unique_types()
    }

    /// Wraps features that are already in canonical order.
    pub fn new(features: impl Into<Box<[Feature]>>) -> Self {
        Self(features.into())
    }

    /// Sorts the features into their canonical order.
    pub fn sorted(features: impl IntoIterator<Item = Feature>) -> Self {
        let mut features = features.into_iter().collect::<Vec<_>>();
        features.sort_by_key(Feature::kind);
        Self(features.into_boxed_slice())
    }

    /// Writes the features. They have to be checked with [`Features::verify_with`] beforehand.
    pub fn pack_with_rules<P: Packer>(&self, packer: &mut P, rules: &CollectionRules) -> Result<(), P::Error> {
        rules.pack(&self.0, packer)
    }

    /// Reads features that satisfy `rules`.
    pub fn unpack_with_rules<U: Unpacker, const VERIFY: bool>(
        unpacker: &mut U,
        rules: &CollectionRules,
    ) -> Result<Self, UnpackError<Error, U::Error>> {
        rules.unpack::<_, _, VERIFY>(unpacker).map(Self)
    }

    /// Checks every feature and the set against `rules`.
    pub fn verify_with<const VERIFY: bool>(&self, rules: &CollectionRules) -> Result<(), Error> {
        self.0.iter().try_for_each(Feature::verify::<VERIFY>)?;
        rules.verify_with::<_, VERIFY>(&self.0)
    }

    /// Checks the kinds against the allowed ones.
    pub fn check_types(&self, rules: &CollectionRules) -> Result<(), Error> {
        rules.check_types(self.0.iter().map(Feature::kind))
    }

    /// The sender feature, if present.
    pub fn sender(&self) -> Option<&SenderFeature> {
        self.0.iter().find_map(|feature| match feature {
            Feature::Sender(sender) => Some(sender),
            _ => None,
        })
    }

    /// The issuer feature, if present.
    pub fn issuer(&self) -> Option<&IssuerFeature> {
        self.0.iter().find_map(|feature| match feature {
            Feature::Issuer(issuer) => Some(issuer),
            _ => None,
        })
    }

    /// The metadata feature, if present.
    pub fn metadata(&self) -> Option<&MetadataFeature> {
        self.0.iter().find_map(|feature| match feature {
            Feature::Metadata(metadata) => Some(metadata),
            _ => None,
        })
    }

    /// The tag feature, if present.
    pub fn tag(&self) -> Option<&TagFeature> {
        self.0.iter().find_map(|feature| match feature {
            Feature::Tag(tag) => Some(tag),
            _ => None,
        })
    }
}

impl std::ops::Deref for Features {
    type Target = [Feature];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(feature = "rand")]
mod rand {
    use super::*;
    use crate::types::rand::{rand_bool, rand_bytes, rand_number_range};

    impl Feature {
        /// Generates a random sender [`Feature`].
        pub fn rand_sender() -> Self {
            Self::sender(Address::rand_ed25519())
        }

        /// Generates a random issuer [`Feature`].
        pub fn rand_issuer() -> Self {
            Self::issuer(Address::rand_ed25519())
        }

        /// Generates a random metadata [`Feature`].
        pub fn rand_metadata() -> Self {
            Self::metadata(rand_bytes(rand_number_range(1..128)))
        }

        /// Generates a random tag [`Feature`].
        pub fn rand_tag() -> Self {
            Self::tag(rand_bytes(rand_number_range(1..64)))
        }

        /// Generates a random [`Feature`] of the given kind.
        pub fn rand_of_kind(kind: u8) -> Self {
            match kind {
                Self::SENDER_KIND => Self::rand_sender(),
                Self::ISSUER_KIND => Self::rand_issuer(),
                Self::METADATA_KIND => Self::rand_metadata(),
                _ => Self::rand_tag(),
            }
        }
    }

    impl Features {
        /// Generates a random canonical feature set satisfying `rules`.
        pub fn rand_allowed(rules: &CollectionRules) -> Self {
            Self::sorted(
                rules
                    .allowed_types
                    .unwrap_or_default()
                    .iter()
                    .filter(|_| rand_bool())
                    .map(|kind| Feature::rand_of_kind(*kind)),
            )
        }
    }
}
