// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use packable::Packable;
use serde::{Deserialize, Serialize};

use super::verify_amount;
use crate::types::{block::Address, codec::Verify, error::Error, protocol::ProtocolParameters, util::stringify};

/// A single deposit locked by the signature of its address.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Packable)]
#[packable(unpack_error = Error)]
pub struct SimpleOutput {
    /// The owner.
    pub address: Address,
    /// The deposit.
    #[serde(with = "stringify")]
    pub amount: u64,
}

impl SimpleOutput {
    /// The discriminant of the output.
    pub const KIND: u8 = 0;
}

impl Verify for SimpleOutput {
    fn verify_syntax<const VERIFY: bool>(&self, protocol_parameters: &ProtocolParameters) -> Result<(), Error> {
        if VERIFY {
            verify_amount(self.amount, 1, protocol_parameters)?;
        }
        Ok(())
    }
}

#[cfg(feature = "rand")]
mod rand {
    use super::*;
    use crate::types::rand::rand_number_range;

    impl SimpleOutput {
        /// Generates a random [`SimpleOutput`].
        pub fn rand() -> Self {
            Self {
                address: Address::rand_ed25519(),
                amount: rand_number_range(1_000_000..1_000_000_000),
            }
        }
    }
}
