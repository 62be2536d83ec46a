// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use packable::{
    error::{UnpackError, UnpackErrorExt},
    packer::Packer,
    unpacker::Unpacker,
    Packable,
};
use serde::{Deserialize, Serialize};

use super::{verify_amount, Feature, Features, NativeTokens, UnlockCondition, UnlockConditions};
use crate::types::{
    codec::{CollectionRules, LengthPrefix, Verify},
    error::Error,
    protocol::ProtocolParameters,
    util::stringify,
};

/// An output holding base tokens and native tokens, owned by an address.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct BasicOutput {
    #[serde(with = "stringify")]
    pub amount: u64,
    pub native_tokens: NativeTokens,
    pub unlock_conditions: UnlockConditions,
    #[serde(rename = "featureBlocks")]
    pub features: Features,
}

#[allow(missing_docs)]
impl BasicOutput {
    pub const KIND: u8 = 3;

    pub const UNLOCK_CONDITION_RULES: CollectionRules =
        CollectionRules::new("unlock condition", LengthPrefix::U8, 1, 4)
            .allowed_types(&[
                UnlockCondition::ADDRESS_KIND,
                UnlockCondition::STORAGE_DEPOSIT_RETURN_KIND,
                UnlockCondition::TIMELOCK_KIND,
                UnlockCondition::EXPIRATION_KIND,
            ])
            .must_occur(&[UnlockCondition::ADDRESS_KIND])
            .lexical_order()
            .unique_types();

    pub const FEATURE_RULES: CollectionRules = Features::rules(
        "feature",
        &[Feature::SENDER_KIND, Feature::METADATA_KIND, Feature::TAG_KIND],
    );

    /// Checks the kinds of the sub-objects against the kinds this output allows.
    pub fn check_types(&self) -> Result<(), Error> {
        self.unlock_conditions.check_types(&Self::UNLOCK_CONDITION_RULES)?;
        self.features.check_types(&Self::FEATURE_RULES)
    }
}

impl Packable for BasicOutput {
    type UnpackError = Error;

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        self.amount.pack(packer)?;
        self.native_tokens.pack(packer)?;
        self.unlock_conditions
            .pack_with_rules(packer, &Self::UNLOCK_CONDITION_RULES)?;
        self.features.pack_with_rules(packer, &Self::FEATURE_RULES)
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(
        unpacker: &mut U,
    ) -> Result<Self, UnpackError<Self::UnpackError, U::Error>> {
        Ok(Self {
            amount: u64::unpack::<_, VERIFY>(unpacker).coerce()?,
            native_tokens: NativeTokens::unpack::<_, VERIFY>(unpacker)?,
            unlock_conditions: UnlockConditions::unpack_with_rules::<_, VERIFY>(
                unpacker,
                &Self::UNLOCK_CONDITION_RULES,
            )?,
            features: Features::unpack_with_rules::<_, VERIFY>(unpacker, &Self::FEATURE_RULES)?,
        })
    }
}

impl Verify for BasicOutput {
    fn verify_syntax<const VERIFY: bool>(&self, protocol_parameters: &ProtocolParameters) -> Result<(), Error> {
        if VERIFY {
            verify_amount(self.amount, 1, protocol_parameters)?;
        }
        self.native_tokens.verify::<VERIFY>()?;
        self.unlock_conditions
            .verify_with::<VERIFY>(&Self::UNLOCK_CONDITION_RULES)?;
        self.features.verify_with::<VERIFY>(&Self::FEATURE_RULES)
    }
}

#[cfg(feature = "rand")]
mod rand {
    use super::*;
    use crate::types::rand::rand_number_range;

    impl BasicOutput {
        /// Generates a random [`BasicOutput`].
        pub fn rand() -> Self {
            Self {
                amount: rand_number_range(1_000_000..1_000_000_000),
                native_tokens: NativeTokens::rand(),
                unlock_conditions: UnlockConditions::rand_with_address(),
                features: Features::rand_allowed(&Self::FEATURE_RULES),
            }
        }
    }
}
