// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the [`Address`] types.

use packable::Packable;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

mod alias;
mod ed25519;
mod implicit;
mod nft;
mod restricted;

pub use self::{
    alias::AliasAddress,
    ed25519::Ed25519Address,
    implicit::ImplicitAccountCreationAddress,
    nft::NftAddress,
    restricted::{AddressCapabilities, RestrictableAddress, RestrictedAddress},
};
use crate::types::{
    codec::Verify,
    error::Error,
    protocol::ProtocolParameters,
    util::{from_json_value, json_kind_u8, Tagged},
};

const RESTRICTED_ED25519_KIND: u8 = <Ed25519Address as RestrictableAddress>::RESTRICTED_KIND;
const RESTRICTED_ALIAS_KIND: u8 = <AliasAddress as RestrictableAddress>::RESTRICTED_KIND;
const RESTRICTED_NFT_KIND: u8 = <NftAddress as RestrictableAddress>::RESTRICTED_KIND;

fn unsupported_address_kind(discriminant: u8) -> Error {
    Error::UnsupportedTypeDiscriminant {
        kind: "address",
        discriminant: discriminant as u32,
    }
}

/// The possible address variants.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Packable)]
#[packable(unpack_error = Error)]
#[packable(tag_type = u8, with_error = unsupported_address_kind)]
#[allow(missing_docs)]
pub enum Address {
    #[packable(tag = Ed25519Address::KIND)]
    Ed25519(Ed25519Address),
    #[packable(tag = RESTRICTED_ED25519_KIND)]
    RestrictedEd25519(RestrictedAddress<Ed25519Address>),
    #[packable(tag = AliasAddress::KIND)]
    Alias(AliasAddress),
    #[packable(tag = RESTRICTED_ALIAS_KIND)]
    RestrictedAlias(RestrictedAddress<AliasAddress>),
    #[packable(tag = NftAddress::KIND)]
    Nft(NftAddress),
    #[packable(tag = RESTRICTED_NFT_KIND)]
    RestrictedNft(RestrictedAddress<NftAddress>),
    #[packable(tag = ImplicitAccountCreationAddress::KIND)]
    ImplicitAccountCreation(ImplicitAccountCreationAddress),
}

impl Address {
    /// The discriminant of the variant.
    pub fn kind(&self) -> u8 {
        match self {
            Self::Ed25519(_) => Ed25519Address::KIND,
            Self::RestrictedEd25519(_) => RESTRICTED_ED25519_KIND,
            Self::Alias(_) => AliasAddress::KIND,
            Self::RestrictedAlias(_) => RESTRICTED_ALIAS_KIND,
            Self::Nft(_) => NftAddress::KIND,
            Self::RestrictedNft(_) => RESTRICTED_NFT_KIND,
            Self::ImplicitAccountCreation(_) => ImplicitAccountCreationAddress::KIND,
        }
    }

    /// The key hash of addresses that are unlocked by an Ed25519 signature.
    pub fn ed25519_key_hash(&self) -> Option<&Ed25519Address> {
        match self {
            Self::Ed25519(address) => Some(address),
            Self::RestrictedEd25519(restricted) => Some(&restricted.address),
            Self::ImplicitAccountCreation(address) => Some(address.ed25519_address()),
            _ => None,
        }
    }

    /// The capabilities of restricted addresses.
    pub fn capabilities(&self) -> Option<AddressCapabilities> {
        match self {
            Self::RestrictedEd25519(a) => Some(a.capabilities),
            Self::RestrictedAlias(a) => Some(a.capabilities),
            Self::RestrictedNft(a) => Some(a.capabilities),
            _ => None,
        }
    }

    /// The alias address, restricted or not.
    pub fn as_alias(&self) -> Option<&AliasAddress> {
        match self {
            Self::Alias(address) => Some(address),
            Self::RestrictedAlias(restricted) => Some(&restricted.address),
            _ => None,
        }
    }

    /// The NFT address, restricted or not.
    pub fn as_nft(&self) -> Option<&NftAddress> {
        match self {
            Self::Nft(address) => Some(address),
            Self::RestrictedNft(restricted) => Some(&restricted.address),
            _ => None,
        }
    }
}

impl From<Ed25519Address> for Address {
    fn from(value: Ed25519Address) -> Self {
        Self::Ed25519(value)
    }
}

impl From<AliasAddress> for Address {
    fn from(value: AliasAddress) -> Self {
        Self::Alias(value)
    }
}

impl From<NftAddress> for Address {
    fn from(value: NftAddress) -> Self {
        Self::Nft(value)
    }
}

impl From<ImplicitAccountCreationAddress> for Address {
    fn from(value: ImplicitAccountCreationAddress) -> Self {
        Self::ImplicitAccountCreation(value)
    }
}

impl From<RestrictedAddress<Ed25519Address>> for Address {
    fn from(value: RestrictedAddress<Ed25519Address>) -> Self {
        Self::RestrictedEd25519(value)
    }
}

impl From<RestrictedAddress<AliasAddress>> for Address {
    fn from(value: RestrictedAddress<AliasAddress>) -> Self {
        Self::RestrictedAlias(value)
    }
}

impl From<RestrictedAddress<NftAddress>> for Address {
    fn from(value: RestrictedAddress<NftAddress>) -> Self {
        Self::RestrictedNft(value)
    }
}

// Addresses carry no rules beyond their encoding.
impl Verify for Address {
    fn verify_syntax<const VERIFY: bool>(&self, _: &ProtocolParameters) -> Result<(), Error> {
        Ok(())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kind = self.kind();
        match self {
            Self::Ed25519(a) => Tagged::new(kind, a).serialize(serializer),
            Self::RestrictedEd25519(a) => Tagged::new(kind, a).serialize(serializer),
            Self::Alias(a) => Tagged::new(kind, a).serialize(serializer),
            Self::RestrictedAlias(a) => Tagged::new(kind, a).serialize(serializer),
            Self::Nft(a) => Tagged::new(kind, a).serialize(serializer),
            Self::RestrictedNft(a) => Tagged::new(kind, a).serialize(serializer),
            Self::ImplicitAccountCreation(a) => Tagged::new(kind, a).serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match json_kind_u8::<D::Error>("address", &value)? {
            Ed25519Address::KIND => Self::Ed25519(from_json_value(value)?),
            RESTRICTED_ED25519_KIND => Self::RestrictedEd25519(from_json_value(value)?),
            AliasAddress::KIND => Self::Alias(from_json_value(value)?),
            RESTRICTED_ALIAS_KIND => Self::RestrictedAlias(from_json_value(value)?),
            NftAddress::KIND => Self::Nft(from_json_value(value)?),
            RESTRICTED_NFT_KIND => Self::RestrictedNft(from_json_value(value)?),
            ImplicitAccountCreationAddress::KIND => Self::ImplicitAccountCreation(from_json_value(value)?),
            discriminant => return Err(D::Error::custom(unsupported_address_kind(discriminant))),
        })
    }
}

#[cfg(feature = "rand")]
mod rand {
    use super::*;
    use crate::types::rand::{rand_number, rand_number_range};

    impl Address {
        /// Generates a random [`Address`] of any kind.
        pub fn rand() -> Self {
            match rand_number_range(0..7) {
                0 => Self::rand_ed25519(),
                1 => Self::RestrictedEd25519(RestrictedAddress::new(Ed25519Address::rand(), rand_capabilities())),
                2 => Self::rand_alias(),
                3 => Self::RestrictedAlias(RestrictedAddress::new(AliasAddress::rand(), rand_capabilities())),
                4 => Self::rand_nft(),
                5 => Self::RestrictedNft(RestrictedAddress::new(NftAddress::rand(), rand_capabilities())),
                6 => Self::ImplicitAccountCreation(Ed25519Address::rand().into()),
                _ => unreachable!(),
            }
        }

        /// Generates a random Ed25519 [`Address`].
        pub fn rand_ed25519() -> Self {
            Self::Ed25519(Ed25519Address::rand())
        }

        /// Generates a random alias [`Address`].
        pub fn rand_alias() -> Self {
            Self::Alias(AliasAddress::rand())
        }

        /// Generates a random nft [`Address`].
        pub fn rand_nft() -> Self {
            Self::Nft(NftAddress::rand())
        }
    }

    fn rand_capabilities() -> AddressCapabilities {
        AddressCapabilities::new(rand_number())
    }
}
