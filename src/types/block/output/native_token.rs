// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;

use packable::{error::UnpackError, packer::Packer, unpacker::Unpacker, Packable};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

use super::{FoundryId, TokenTag};
use crate::types::{
    codec::{CollectionRules, LengthPrefix, Verify},
    error::Error,
    protocol::ProtocolParameters,
    util::decimal,
};

impl_id!(
    /// The identifier of a native token: the id of its foundry followed by the token tag.
    pub NativeTokenId,
    50
);

impl NativeTokenId {
    /// Joins a foundry id and a token tag.
    pub fn build(foundry_id: &FoundryId, token_tag: &TokenTag) -> Self {
        let mut bytes = [0u8; Self::LENGTH];
        bytes[..FoundryId::LENGTH].copy_from_slice(&foundry_id.0);
        bytes[FoundryId::LENGTH..].copy_from_slice(&token_tag.0);
        Self(bytes)
    }

    /// The id of the foundry that controls the token.
    pub fn foundry_id(&self) -> FoundryId {
        let mut bytes = [0u8; FoundryId::LENGTH];
        bytes.copy_from_slice(&self.0[..FoundryId::LENGTH]);
        FoundryId(bytes)
    }
}

fn verify_native_token_amount<const VERIFY: bool>(amount: &U256) -> Result<(), Error> {
    if VERIFY && amount.is_zero() {
        return Err(Error::NullNativeTokenAmount);
    }
    Ok(())
}

/// A balance of a native token.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Packable)]
#[packable(unpack_error = Error)]
pub struct NativeToken {
    /// The token.
    #[serde(rename = "id")]
    pub token_id: NativeTokenId,
    /// The balance, never zero.
    #[serde(with = "decimal")]
    #[packable(verify_with = verify_native_token_amount)]
    pub amount: U256,
}

impl NativeToken {
    /// Creates a balance of `token_id`.
    pub fn new(token_id: NativeTokenId, amount: U256) -> Self {
        Self { token_id, amount }
    }
}

impl Verify for NativeToken {
    fn verify_syntax<const VERIFY: bool>(&self, _: &ProtocolParameters) -> Result<(), Error> {
        verify_native_token_amount::<VERIFY>(&self.amount)
    }
}

/// The native token balances of an output, sorted by their encoding.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NativeTokens(Box<[NativeToken]>);

impl NativeTokens {
    /// The rules every set of native tokens satisfies.
    pub const RULES: CollectionRules = CollectionRules::new("native token", LengthPrefix::U8, 0, 64)
        .lexical_order()
        .no_duplicates();

    /// Wraps tokens that are already in canonical order.
    pub fn new(tokens: impl Into<Box<[NativeToken]>>) -> Self {
        Self(tokens.into())
    }

    /// Sorts the tokens into their canonical order.
    pub fn sorted(tokens: impl IntoIterator<Item = NativeToken>) -> Self {
        let mut tokens = tokens.into_iter().collect::<Vec<_>>();
        tokens.sort_by(|a, b| a.token_id.cmp(&b.token_id).then_with(|| a.amount.cmp(&b.amount)));
        Self(tokens.into_boxed_slice())
    }

    /// Every token id may appear only once, even with different amounts.
    fn verify_unique_ids(&self) -> Result<(), Error> {
        let mut seen = HashSet::new();
        for (index, token) in self.0.iter().enumerate() {
            if !seen.insert(token.token_id) {
                return Err(Error::DuplicateElement {
                    kind: Self::RULES.kind,
                    index,
                });
            }
        }
        Ok(())
    }

    /// Checks the balances and the set.
    pub fn verify<const VERIFY: bool>(&self) -> Result<(), Error> {
        self.0
            .iter()
            .try_for_each(|token| verify_native_token_amount::<VERIFY>(&token.amount))?;
        Self::RULES.verify_with::<_, VERIFY>(&self.0)?;
        if VERIFY {
            self.verify_unique_ids()?;
        }
        Ok(())
    }
}

impl std::ops::Deref for NativeTokens {
    type Target = [NativeToken];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Packable for NativeTokens {
    type UnpackError = Error;

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        Self::RULES.pack(&self.0, packer)
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(
        unpacker: &mut U,
    ) -> Result<Self, UnpackError<Self::UnpackError, U::Error>> {
        let tokens = Self(Self::RULES.unpack::<_, _, VERIFY>(unpacker)?);
        if VERIFY {
            tokens.verify_unique_ids().map_err(UnpackError::Packable)?;
        }
        Ok(tokens)
    }
}

impl Verify for NativeTokens {
    fn verify_syntax<const VERIFY: bool>(&self, _: &ProtocolParameters) -> Result<(), Error> {
        self.verify::<VERIFY>()
    }
}

#[cfg(feature = "rand")]
mod rand {
    use super::*;
    use crate::types::rand::{rand_number, rand_number_range};

    impl NativeToken {
        /// Generates a random [`NativeToken`] with a non-zero amount.
        pub fn rand() -> Self {
            Self::new(NativeTokenId::rand(), U256::from(rand_number::<u64>()) + 1)
        }
    }

    impl NativeTokens {
        /// Generates a canonical set of random [`NativeToken`]s.
        pub fn rand() -> Self {
            Self::sorted((0..rand_number_range(0..4)).map(|_| NativeToken::rand()))
        }
    }
}
