// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::str::FromStr;

use derive_more::{Deref, From};
use serde::{Deserialize, Serialize};

use packable::Packable;

use crate::types::{
    error::Error,
    util::{blake2b256, hexify},
};

/// A regular Ed25519 address: the BLAKE2b-256 hash of a public key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, From, Deref, Packable)]
#[serde(rename_all = "camelCase")]
#[packable(unpack_error = Error)]
pub struct Ed25519Address {
    #[serde(with = "hexify")]
    /// The BLAKE2b-256 hash of the public key.
    pub pub_key_hash: [u8; Self::LENGTH],
}

impl Ed25519Address {
    /// The discriminant of the address.
    pub const KIND: u8 = 0;
    /// The length of the key hash.
    pub const LENGTH: usize = 32;

    /// Derives the address owned by `public_key`.
    pub fn from_public_key(public_key: &[u8; 32]) -> Self {
        blake2b256(public_key).into()
    }
}

impl std::fmt::Display for Ed25519Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", prefix_hex::encode(self.pub_key_hash))
    }
}

impl FromStr for Ed25519Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        prefix_hex::decode::<[u8; Self::LENGTH]>(s)
            .map(Self::from)
            .map_err(|_| Error::InvalidHex { value: s.to_owned() })
    }
}

#[cfg(feature = "rand")]
mod rand {
    use super::*;
    use crate::types::rand::rand_bytes_array;

    impl Ed25519Address {
        /// Generates a random [`Ed25519Address`].
        pub fn rand() -> Self {
            rand_bytes_array().into()
        }
    }
}
