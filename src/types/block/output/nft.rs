// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use packable::{
    error::{UnpackError, UnpackErrorExt},
    packer::Packer,
    unpacker::Unpacker,
    Packable,
};
use serde::{Deserialize, Serialize};

use super::{
    verify_amount, BasicOutput, ChainId, ChainTransition, Feature, Features, NativeTokens, Output, OutputId,
    UnlockConditions,
};
use crate::types::{
    codec::{CollectionRules, Verify},
    error::Error,
    ledger::SemanticValidationContext,
    protocol::ProtocolParameters,
    util::stringify,
};

impl_id!(
    /// The identifier of an NFT chain.
    pub NftId,
    32
);

impl NftId {
    /// The id of the NFT created by the output with the given id.
    pub fn from_output_id(output_id: &OutputId) -> Self {
        Self(output_id.hash())
    }

    /// Resolves the null id of a freshly minted NFT.
    pub fn or_from_output_id(self, output_id: &OutputId) -> Self {
        if self.is_null() {
            Self::from_output_id(output_id)
        } else {
            self
        }
    }
}

/// An output representing a non-fungible token.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct NftOutput {
    #[serde(with = "stringify")]
    pub amount: u64,
    pub native_tokens: NativeTokens,
    pub nft_id: NftId,
    pub unlock_conditions: UnlockConditions,
    #[serde(rename = "featureBlocks")]
    pub features: Features,
    #[serde(rename = "immutableFeatureBlocks")]
    pub immutable_features: Features,
}

#[allow(missing_docs)]
impl NftOutput {
    pub const KIND: u8 = 6;

    pub const UNLOCK_CONDITION_RULES: CollectionRules = BasicOutput::UNLOCK_CONDITION_RULES;

    pub const FEATURE_RULES: CollectionRules = Features::rules(
        "feature",
        &[Feature::SENDER_KIND, Feature::METADATA_KIND, Feature::TAG_KIND],
    );

    pub const IMMUTABLE_FEATURE_RULES: CollectionRules =
        Features::rules("immutable feature", &[Feature::ISSUER_KIND, Feature::METADATA_KIND]);

    pub fn chain_id(&self, output_id: &OutputId) -> ChainId {
        ChainId::Nft(self.nft_id.or_from_output_id(output_id))
    }

    /// Checks the kinds of the sub-objects against the kinds this output allows.
    pub fn check_types(&self) -> Result<(), Error> {
        self.unlock_conditions.check_types(&Self::UNLOCK_CONDITION_RULES)?;
        self.features.check_types(&Self::FEATURE_RULES)?;
        self.immutable_features.check_types(&Self::IMMUTABLE_FEATURE_RULES)
    }

    /// Validates the transition of this NFT, which was consumed or created as `output_id`.
    pub fn transition(
        &self,
        output_id: &OutputId,
        transition: ChainTransition<'_>,
        _context: &SemanticValidationContext<'_>,
    ) -> Result<(), Error> {
        match transition {
            ChainTransition::Genesis | ChainTransition::Destroy => Ok(()),
            ChainTransition::StateChange { next } => {
                let next = match next {
                    Output::Nft(next) => next,
                    _ => {
                        return Err(Error::InvalidChainStateTransition {
                            chain_id: self.chain_id(output_id),
                            reason: "next state is not an nft output",
                        });
                    }
                };
                if self.immutable_features != next.immutable_features {
                    return Err(Error::ImmutableFieldMutated {
                        field: "immutable features",
                    });
                }
                Ok(())
            }
        }
    }
}

impl Packable for NftOutput {
    type UnpackError = Error;

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        self.amount.pack(packer)?;
        self.native_tokens.pack(packer)?;
        self.nft_id.pack(packer)?;
        self.unlock_conditions
            .pack_with_rules(packer, &Self::UNLOCK_CONDITION_RULES)?;
        self.features.pack_with_rules(packer, &Self::FEATURE_RULES)?;
        self.immutable_features
            .pack_with_rules(packer, &Self::IMMUTABLE_FEATURE_RULES)
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(
        unpacker: &mut U,
    ) -> Result<Self, UnpackError<Self::UnpackError, U::Error>> {
        Ok(Self {
            amount: u64::unpack::<_, VERIFY>(unpacker).coerce()?,
            native_tokens: NativeTokens::unpack::<_, VERIFY>(unpacker)?,
            nft_id: NftId::unpack::<_, VERIFY>(unpacker)?,
            unlock_conditions: UnlockConditions::unpack_with_rules::<_, VERIFY>(
                unpacker,
                &Self::UNLOCK_CONDITION_RULES,
            )?,
            features: Features::unpack_with_rules::<_, VERIFY>(unpacker, &Self::FEATURE_RULES)?,
            immutable_features: Features::unpack_with_rules::<_, VERIFY>(unpacker, &Self::IMMUTABLE_FEATURE_RULES)?,
        })
    }
}

impl Verify for NftOutput {
    fn verify_syntax<const VERIFY: bool>(&self, protocol_parameters: &ProtocolParameters) -> Result<(), Error> {
        if VERIFY {
            verify_amount(self.amount, 1, protocol_parameters)?;
        }
        self.native_tokens.verify::<VERIFY>()?;
        self.unlock_conditions
            .verify_with::<VERIFY>(&Self::UNLOCK_CONDITION_RULES)?;
        self.features.verify_with::<VERIFY>(&Self::FEATURE_RULES)?;
        self.immutable_features
            .verify_with::<VERIFY>(&Self::IMMUTABLE_FEATURE_RULES)
    }
}

#[cfg(feature = "rand")]
mod rand {
    use super::*;
    use crate::types::rand::rand_number_range;

    impl NftOutput {
        /// Generates a random [`NftOutput`].
        pub fn rand() -> Self {
            Self {
                amount: rand_number_range(1_000_000..1_000_000_000),
                native_tokens: NativeTokens::rand(),
                nft_id: NftId::rand(),
                unlock_conditions: UnlockConditions::rand_with_address(),
                features: Features::rand_allowed(&Self::FEATURE_RULES),
                immutable_features: Features::rand_allowed(&Self::IMMUTABLE_FEATURE_RULES),
            }
        }
    }
}
