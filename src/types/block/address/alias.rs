// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use packable::Packable;
use serde::{Deserialize, Serialize};

use crate::types::{block::output::AliasId, error::Error};

/// An address of an alias.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Packable)]
#[serde(rename_all = "camelCase")]
#[packable(unpack_error = Error)]
pub struct AliasAddress {
    /// The id of the alias that controls the address.
    pub alias_id: AliasId,
}

impl AliasAddress {
    /// The discriminant of the address.
    pub const KIND: u8 = 8;
    /// The length including the kind byte, as embedded in a [`FoundryId`](crate::types::block::output::FoundryId).
    pub const PACKED_LENGTH: usize = 1 + AliasId::LENGTH;

    /// Creates the address of an alias.
    pub fn new(alias_id: AliasId) -> Self {
        Self { alias_id }
    }
}

impl From<AliasId> for AliasAddress {
    fn from(alias_id: AliasId) -> Self {
        Self::new(alias_id)
    }
}

#[cfg(feature = "rand")]
mod rand {
    use super::*;

    impl AliasAddress {
        /// Generates a random [`AliasAddress`].
        pub fn rand() -> Self {
            AliasId::rand().into()
        }
    }
}
