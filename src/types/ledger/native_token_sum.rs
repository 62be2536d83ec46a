// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::{collections::HashMap, fmt};

use derive_more::Deref;
use primitive_types::U256;

use crate::types::{
    block::output::{NativeToken, NativeTokenId, NativeTokens},
    error::Error,
};

/// The signed change of a native token balance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenDelta {
    /// Tokens were minted.
    Increase(U256),
    /// Tokens were burned.
    Decrease(U256),
}

impl TokenDelta {
    /// The change from `from` to `to`. No change is always represented as `Increase(0)`.
    pub fn between(from: U256, to: U256) -> Self {
        if to >= from {
            Self::Increase(to - from)
        } else {
            Self::Decrease(from - to)
        }
    }

    /// Whether the delta neither mints nor burns.
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Increase(amount) | Self::Decrease(amount) => amount.is_zero(),
        }
    }
}

impl Default for TokenDelta {
    fn default() -> Self {
        Self::Increase(U256::zero())
    }
}

impl fmt::Display for TokenDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Increase(amount) => write!(f, "+{amount}"),
            Self::Decrease(amount) => write!(f, "-{amount}"),
        }
    }
}

/// The total amount per native token over a set of outputs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deref)]
pub struct NativeTokenSum(HashMap<NativeTokenId, U256>);

impl NativeTokenSum {
    /// Adds the amount of `token` to the sum of its id.
    pub fn add(&mut self, token: &NativeToken) -> Result<(), Error> {
        let sum = self.0.entry(token.token_id).or_default();
        *sum = sum
            .checked_add(token.amount)
            .ok_or(Error::NativeTokenSumOverflow {
                token_id: token.token_id,
            })?;
        Ok(())
    }

    /// Adds every token of `tokens`.
    pub fn add_all(&mut self, tokens: &NativeTokens) -> Result<(), Error> {
        tokens.iter().try_for_each(|token| self.add(token))
    }

    /// The amount of `token_id`, zero if the token does not occur.
    pub fn amount(&self, token_id: &NativeTokenId) -> U256 {
        self.0.get(token_id).copied().unwrap_or_default()
    }
}

/// Checks that the balance of `token_id` changed by exactly `expected` between `input` and `output`.
pub fn balanced_with_diff(
    token_id: &NativeTokenId,
    input: &NativeTokenSum,
    output: &NativeTokenSum,
    expected: TokenDelta,
) -> Result<(), Error> {
    let actual = TokenDelta::between(input.amount(token_id), output.amount(token_id));
    if actual != expected {
        return Err(Error::NativeTokenSupplyMismatch {
            token_id: *token_id,
            expected,
            actual,
        });
    }
    Ok(())
}
