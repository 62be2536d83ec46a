// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use super::{AliasId, FoundryId, NftId, Output};

/// The identity of a chain-constrained output that persists across transactions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum ChainId {
    Alias(AliasId),
    Nft(NftId),
    Foundry(FoundryId),
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alias(id) => write!(f, "alias {id}"),
            Self::Nft(id) => write!(f, "nft {id}"),
            Self::Foundry(id) => write!(f, "foundry {id}"),
        }
    }
}

/// How a chain-constrained output moves from one ledger state to the next.
#[derive(Copy, Clone, Debug)]
pub enum ChainTransition<'a> {
    /// The chain is created by the transaction.
    Genesis,
    /// The chain is consumed and recreated.
    StateChange {
        /// The successor created by the same transaction.
        next: &'a Output,
    },
    /// The chain is consumed without a successor.
    Destroy,
}
