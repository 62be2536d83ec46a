// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use packable::Packable;
use serde::{Deserialize, Serialize};

use super::verify_amount;
use crate::types::{codec::Verify, error::Error, protocol::ProtocolParameters, util::stringify};

/// Holds the tokens that have not been migrated yet. It may be empty.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Packable)]
#[packable(unpack_error = Error)]
pub struct TreasuryOutput {
    /// The unmigrated tokens.
    #[serde(with = "stringify")]
    pub amount: u64,
}

impl TreasuryOutput {
    /// The discriminant of the output.
    pub const KIND: u8 = 2;
}

impl Verify for TreasuryOutput {
    fn verify_syntax<const VERIFY: bool>(&self, protocol_parameters: &ProtocolParameters) -> Result<(), Error> {
        if VERIFY {
            verify_amount(self.amount, 0, protocol_parameters)?;
        }
        Ok(())
    }
}

#[cfg(feature = "rand")]
mod rand {
    use super::*;
    use crate::types::rand::rand_number_range;

    impl TreasuryOutput {
        /// Generates a random [`TreasuryOutput`].
        pub fn rand() -> Self {
            Self {
                amount: rand_number_range(0..1_000_000_000),
            }
        }
    }
}
