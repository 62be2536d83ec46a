// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use packable::Packable;
use serde::{Deserialize, Serialize};

use crate::types::{block::output::NftId, error::Error};

/// An NFT address.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Packable)]
#[serde(rename_all = "camelCase")]
#[packable(unpack_error = Error)]
pub struct NftAddress {
    /// The id of the NFT that controls the address.
    pub nft_id: NftId,
}

impl NftAddress {
    /// The discriminant of the address.
    pub const KIND: u8 = 16;

    #[allow(missing_docs)]
    pub fn new(nft_id: NftId) -> Self {
        Self { nft_id }
    }
}

impl From<NftId> for NftAddress {
    fn from(nft_id: NftId) -> Self {
        Self::new(nft_id)
    }
}

#[cfg(feature = "rand")]
mod rand {
    use super::*;

    impl NftAddress {
        /// Generates a random [`NftAddress`].
        pub fn rand() -> Self {
            NftId::rand().into()
        }
    }
}
