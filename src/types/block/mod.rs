// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the ledger objects carried in blocks.

/// Defines a fixed-size identifier with its hex representations, its binary encoding and a random generator.
macro_rules! impl_id {
    ($(#[$meta:meta])* $vis:vis $name:ident, $length:literal) => {
        $(#[$meta])*
        #[derive(
            Copy,
            Clone,
            Debug,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
            packable::Packable,
        )]
        #[serde(transparent)]
        #[packable(unpack_error = crate::types::error::Error)]
        $vis struct $name(#[serde(with = "crate::types::util::hexify")] pub [u8; Self::LENGTH]);

        impl $name {
            /// The length of the identifier in bytes.
            pub const LENGTH: usize = $length;

            /// Creates a new identifier from its bytes.
            pub const fn new(bytes: [u8; Self::LENGTH]) -> Self {
                Self(bytes)
            }

            /// The identifier with all bytes set to zero.
            pub const fn null() -> Self {
                Self([0; Self::LENGTH])
            }

            /// Returns whether all bytes are zero.
            pub fn is_null(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }
        }

        impl From<[u8; $length]> for $name {
            fn from(bytes: [u8; $length]) -> Self {
                Self(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", prefix_hex::encode(self.0))
            }
        }

        impl core::str::FromStr for $name {
            type Err = crate::types::error::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                prefix_hex::decode::<[u8; Self::LENGTH]>(s)
                    .map(Self)
                    .map_err(|_| crate::types::error::Error::InvalidHex { value: s.to_owned() })
            }
        }

        #[cfg(feature = "rand")]
        impl $name {
            /// Generates a random identifier.
            pub fn rand() -> Self {
                Self(crate::types::rand::rand_bytes_array())
            }
        }
    };
}

pub mod address;
pub mod input;
pub mod output;
pub mod payload;
pub mod signature;
pub mod unlock;

pub use self::{
    address::Address,
    input::Input,
    output::Output,
    payload::{Payload, TransactionEssence, TransactionPayload},
    signature::Signature,
    unlock::Unlock,
};
