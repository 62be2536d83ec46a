// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use packable::{error::UnpackError, packer::Packer, unpacker::Unpacker, Packable};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use super::{AliasAddress, Ed25519Address, NftAddress};
use crate::types::{codec::LengthPrefix, error::Error};

/// An address that can be wrapped into a [`RestrictedAddress`].
pub trait RestrictableAddress: Packable<UnpackError = Error> {
    /// The discriminant of the restricted variant.
    const RESTRICTED_KIND: u8;
}

impl RestrictableAddress for Ed25519Address {
    const RESTRICTED_KIND: u8 = 1;
}

impl RestrictableAddress for AliasAddress {
    const RESTRICTED_KIND: u8 = 9;
}

impl RestrictableAddress for NftAddress {
    const RESTRICTED_KIND: u8 = 17;
}

/// The kinds of outputs an address is allowed to receive.
///
/// Encoded as a length-prefixed bit mask without trailing zero bytes, so the empty set has no bytes at all.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AddressCapabilities(u8);

#[allow(missing_docs)]
impl AddressCapabilities {
    pub const NATIVE_TOKENS: u8 = 1 << 0;
    pub const TIMELOCKED_OUTPUTS: u8 = 1 << 1;
    pub const EXPIRING_OUTPUTS: u8 = 1 << 2;
    pub const STORAGE_DEPOSIT_RETURN_OUTPUTS: u8 = 1 << 3;
    pub const ALIAS_OUTPUTS: u8 = 1 << 4;
    pub const NFT_OUTPUTS: u8 = 1 << 5;

    pub const fn new(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    pub const fn has(&self, capability: u8) -> bool {
        self.0 & capability == capability
    }

    /// The canonical bytes of the bit mask.
    pub fn as_bytes(&self) -> &[u8] {
        match self.0 {
            0 => &[],
            _ => std::slice::from_ref(&self.0),
        }
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        match bytes {
            [] => Ok(Self(0)),
            [0] => Err(Error::NonCanonicalCapabilities),
            [bits] => Ok(Self(*bits)),
            _ => Err(Error::InvalidLength {
                kind: "address capabilities",
                length: bytes.len(),
                min: 0,
                max: 1,
            }),
        }
    }
}

impl Packable for AddressCapabilities {
    type UnpackError = Error;

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        LengthPrefix::U8.pack_bytes(self.as_bytes(), packer)
    }

    // Checked even without `VERIFY`, a trailing zero byte does not re-encode to the same bytes.
    fn unpack<U: Unpacker, const VERIFY: bool>(
        unpacker: &mut U,
    ) -> Result<Self, UnpackError<Self::UnpackError, U::Error>> {
        let bytes = LengthPrefix::U8.unpack_bytes::<_, VERIFY>(unpacker)?;
        Self::from_bytes(&bytes).map_err(UnpackError::Packable)
    }
}

impl Serialize for AddressCapabilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.as_bytes()))
    }
}

impl<'de> Deserialize<'de> for AddressCapabilities {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = hex::decode(String::deserialize(deserializer)?).map_err(D::Error::custom)?;
        Self::from_bytes(&bytes).map_err(D::Error::custom)
    }
}

/// An address together with the capabilities it is restricted to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RestrictedAddress<A> {
    /// The wrapped address.
    #[serde(flatten)]
    pub address: A,
    /// The output kinds the address may receive.
    pub capabilities: AddressCapabilities,
}

impl<A: RestrictableAddress> RestrictedAddress<A> {
    /// The discriminant of the restricted variant.
    pub const KIND: u8 = A::RESTRICTED_KIND;

    /// Wraps `address`.
    pub fn new(address: A, capabilities: AddressCapabilities) -> Self {
        Self { address, capabilities }
    }
}

impl<A: RestrictableAddress> Packable for RestrictedAddress<A> {
    type UnpackError = Error;

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        self.address.pack(packer)?;
        self.capabilities.pack(packer)
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(
        unpacker: &mut U,
    ) -> Result<Self, UnpackError<Self::UnpackError, U::Error>> {
        Ok(Self {
            address: A::unpack::<_, VERIFY>(unpacker)?,
            capabilities: AddressCapabilities::unpack::<_, VERIFY>(unpacker)?,
        })
    }
}
