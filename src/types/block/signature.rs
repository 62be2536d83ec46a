// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the signatures carried by signature unlocks.

use ed25519_dalek::Verifier;
use packable::Packable;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use super::address::Ed25519Address;
use crate::types::{
    error::Error,
    util::{from_json_value, hexify, json_kind_u8, Tagged},
};

fn unsupported_signature_kind(discriminant: u8) -> Error {
    Error::UnsupportedTypeDiscriminant {
        kind: "signature",
        discriminant: discriminant as u32,
    }
}

/// An Ed25519 signature together with the public key that created it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Packable)]
#[serde(rename_all = "camelCase")]
#[packable(unpack_error = Error)]
pub struct Ed25519Signature {
    /// The public key of the signer.
    #[serde(with = "hexify")]
    pub public_key: [u8; Self::PUBLIC_KEY_LENGTH],
    /// The signature bytes.
    #[serde(with = "hexify")]
    pub signature: [u8; Self::SIGNATURE_LENGTH],
}

#[allow(missing_docs)]
impl Ed25519Signature {
    pub const KIND: u8 = 0;
    pub const PUBLIC_KEY_LENGTH: usize = 32;
    pub const SIGNATURE_LENGTH: usize = 64;

    pub fn new(public_key: [u8; Self::PUBLIC_KEY_LENGTH], signature: [u8; Self::SIGNATURE_LENGTH]) -> Self {
        Self { public_key, signature }
    }

    /// The address owned by the public key.
    pub fn signer_address(&self) -> Ed25519Address {
        Ed25519Address::from_public_key(&self.public_key)
    }

    /// Checks the signature over `message`. Malformed keys never verify.
    pub fn is_valid_for(&self, message: &[u8]) -> bool {
        let public_key = match ed25519_dalek::PublicKey::from_bytes(&self.public_key) {
            Ok(key) => key,
            Err(_) => return false,
        };
        match ed25519_dalek::Signature::try_from(&self.signature[..]) {
            Ok(signature) => public_key.verify(message, &signature).is_ok(),
            Err(_) => false,
        }
    }
}

/// The possible signature schemes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Packable)]
#[packable(unpack_error = Error)]
#[packable(tag_type = u8, with_error = unsupported_signature_kind)]
pub enum Signature {
    /// An Ed25519 signature.
    #[packable(tag = Ed25519Signature::KIND)]
    Ed25519(Ed25519Signature),
}

impl Signature {
    /// The discriminant of the variant.
    pub fn kind(&self) -> u8 {
        match self {
            Self::Ed25519(_) => Ed25519Signature::KIND,
        }
    }
}

impl From<Ed25519Signature> for Signature {
    fn from(value: Ed25519Signature) -> Self {
        Self::Ed25519(value)
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Ed25519(signature) => Tagged::new(self.kind(), signature).serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        match json_kind_u8::<D::Error>("signature", &value)? {
            Ed25519Signature::KIND => Ok(Self::Ed25519(from_json_value(value)?)),
            discriminant => Err(D::Error::custom(unsupported_signature_kind(discriminant))),
        }
    }
}

#[cfg(feature = "rand")]
mod rand {
    use super::*;
    use crate::types::rand::rand_bytes_array;

    impl Signature {
        /// Generates a random [`Signature`]. It does not verify.
        pub fn rand() -> Self {
            Self::Ed25519(Ed25519Signature::new(rand_bytes_array(), rand_bytes_array()))
        }
    }
}
