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
    verify_amount, ChainId, ChainTransition, Feature, Features, GovernorAddressUnlockCondition, NativeTokens, Output,
    OutputId, StateControllerAddressUnlockCondition, UnlockCondition, UnlockConditions,
};
use crate::types::{
    block::address::AliasAddress,
    codec::{verify_length, CollectionRules, LengthPrefix, Verify},
    error::Error,
    ledger::SemanticValidationContext,
    protocol::ProtocolParameters,
    util::{hexify, stringify},
};

impl_id!(
    /// The identifier of an alias chain.
    pub AliasId,
    32
);

impl AliasId {
    /// The id of the alias created by the output with the given id.
    pub fn from_output_id(output_id: &OutputId) -> Self {
        Self(output_id.hash())
    }

    /// Resolves the null id of a freshly created alias.
    pub fn or_from_output_id(self, output_id: &OutputId) -> Self {
        if self.is_null() {
            Self::from_output_id(output_id)
        } else {
            self
        }
    }
}

/// An output representing an alias account that controls foundries.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "AliasOutputDto", into = "AliasOutputDto")]
#[allow(missing_docs)]
pub struct AliasOutput {
    pub amount: u64,
    pub native_tokens: NativeTokens,
    pub alias_id: AliasId,
    pub state_index: u32,
    pub state_metadata: Box<[u8]>,
    pub foundry_counter: u32,
    pub state_controller_address_unlock_condition: StateControllerAddressUnlockCondition,
    pub governor_address_unlock_condition: GovernorAddressUnlockCondition,
    pub features: Features,
    pub immutable_features: Features,
}

#[allow(missing_docs)]
impl AliasOutput {
    pub const KIND: u8 = 4;
    pub const STATE_METADATA_LENGTH_MAX: usize = 8192;

    pub const UNLOCK_CONDITION_RULES: CollectionRules =
        CollectionRules::new("unlock condition", LengthPrefix::U8, 2, 2)
            .allowed_types(&[
                UnlockCondition::STATE_CONTROLLER_ADDRESS_KIND,
                UnlockCondition::GOVERNOR_ADDRESS_KIND,
            ])
            .must_occur(&[
                UnlockCondition::STATE_CONTROLLER_ADDRESS_KIND,
                UnlockCondition::GOVERNOR_ADDRESS_KIND,
            ])
            .lexical_order()
            .unique_types();

    pub const FEATURE_RULES: CollectionRules =
        Features::rules("feature", &[Feature::SENDER_KIND, Feature::METADATA_KIND]);

    pub const IMMUTABLE_FEATURE_RULES: CollectionRules =
        Features::rules("immutable feature", &[Feature::ISSUER_KIND, Feature::METADATA_KIND]);

    pub fn chain_id(&self, output_id: &OutputId) -> ChainId {
        ChainId::Alias(self.alias_id.or_from_output_id(output_id))
    }

    /// The address of this alias, as used by the foundries it controls.
    pub fn alias_address(&self, output_id: &OutputId) -> AliasAddress {
        AliasAddress::new(self.alias_id.or_from_output_id(output_id))
    }

    /// Checks the kinds of the sub-objects against the kinds this output allows.
    pub fn check_types(&self) -> Result<(), Error> {
        self.features.check_types(&Self::FEATURE_RULES)?;
        self.immutable_features.check_types(&Self::IMMUTABLE_FEATURE_RULES)
    }

    fn unlock_conditions(&self) -> UnlockConditions {
        UnlockConditions::new(vec![
            UnlockCondition::StateControllerAddress(self.state_controller_address_unlock_condition),
            UnlockCondition::GovernorAddress(self.governor_address_unlock_condition),
        ])
    }

    fn take_unlock_conditions(
        conditions: UnlockConditions,
    ) -> Result<(StateControllerAddressUnlockCondition, GovernorAddressUnlockCondition), Error> {
        conditions.require_exactly(&Self::UNLOCK_CONDITION_RULES)?;
        let missing = |discriminant| Error::MissingMandatoryElementType {
            kind: Self::UNLOCK_CONDITION_RULES.kind,
            discriminant,
        };
        Ok((
            *conditions
                .state_controller_address()
                .ok_or_else(|| missing(UnlockCondition::STATE_CONTROLLER_ADDRESS_KIND))?,
            *conditions
                .governor_address()
                .ok_or_else(|| missing(UnlockCondition::GOVERNOR_ADDRESS_KIND))?,
        ))
    }

    fn verify_state_metadata<const VERIFY: bool>(state_metadata: &[u8]) -> Result<(), Error> {
        if VERIFY {
            verify_length("state metadata", state_metadata.len(), 0, Self::STATE_METADATA_LENGTH_MAX)
        } else {
            LengthPrefix::U16.check("state metadata", state_metadata.len())
        }
    }

    /// Validates the transition of this alias, which was consumed or created as `output_id`.
    pub fn transition(
        &self,
        output_id: &OutputId,
        transition: ChainTransition<'_>,
        context: &SemanticValidationContext<'_>,
    ) -> Result<(), Error> {
        let alias_id = self.alias_id.or_from_output_id(output_id);
        match transition {
            ChainTransition::Genesis => {
                if self.state_index != 0 || self.foundry_counter != 0 {
                    return Err(Error::InvalidChainStateTransition {
                        chain_id: ChainId::Alias(alias_id),
                        reason: "a new alias must start with a zero state index and foundry counter",
                    });
                }
                Ok(())
            }
            ChainTransition::StateChange { next } => {
                let next = match next {
                    Output::Alias(next) => next,
                    _ => {
                        return Err(Error::InvalidChainStateTransition {
                            chain_id: ChainId::Alias(alias_id),
                            reason: "next state is not an alias output",
                        });
                    }
                };
                self.state_change_valid(alias_id, next, context)
            }
            ChainTransition::Destroy => Ok(()),
        }
    }

    fn state_change_valid(
        &self,
        alias_id: AliasId,
        next: &Self,
        context: &SemanticValidationContext<'_>,
    ) -> Result<(), Error> {
        let chain_id = ChainId::Alias(alias_id);
        if self.immutable_features != next.immutable_features {
            return Err(Error::ImmutableFieldMutated {
                field: "immutable features",
            });
        }

        if self.state_index.checked_add(1) == Some(next.state_index) {
            if next.foundry_counter < self.foundry_counter {
                return Err(Error::InvalidChainStateTransition {
                    chain_id,
                    reason: "foundry counter decreased",
                });
            }
            let created = context
                .working_set
                .transaction_outputs()
                .iter()
                .filter_map(|output| match output {
                    Output::Foundry(foundry) if foundry.alias_address().alias_id == alias_id => Some(foundry),
                    _ => None,
                })
                .filter(|foundry| !context.working_set.input_chains.contains_key(&foundry.chain_id()))
                .count();
            if (next.foundry_counter - self.foundry_counter) as usize != created {
                return Err(Error::InvalidChainStateTransition {
                    chain_id,
                    reason: "foundry counter does not match the number of created foundries",
                });
            }
            Ok(())
        } else if next.state_index == self.state_index {
            if self.amount != next.amount
                || self.native_tokens != next.native_tokens
                || self.state_metadata != next.state_metadata
                || self.foundry_counter != next.foundry_counter
            {
                return Err(Error::InvalidChainStateTransition {
                    chain_id,
                    reason: "governance transition changed the alias state",
                });
            }
            Ok(())
        } else {
            Err(Error::InvalidChainStateTransition {
                chain_id,
                reason: "state index must stay or grow by one",
            })
        }
    }
}

impl Packable for AliasOutput {
    type UnpackError = Error;

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        self.amount.pack(packer)?;
        self.native_tokens.pack(packer)?;
        self.alias_id.pack(packer)?;
        self.state_index.pack(packer)?;
        LengthPrefix::U16.pack_bytes(&self.state_metadata, packer)?;
        self.foundry_counter.pack(packer)?;
        self.unlock_conditions()
            .pack_with_rules(packer, &Self::UNLOCK_CONDITION_RULES)?;
        self.features.pack_with_rules(packer, &Self::FEATURE_RULES)?;
        self.immutable_features
            .pack_with_rules(packer, &Self::IMMUTABLE_FEATURE_RULES)
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(
        unpacker: &mut U,
    ) -> Result<Self, UnpackError<Self::UnpackError, U::Error>> {
        let amount = u64::unpack::<_, VERIFY>(unpacker).coerce()?;
        let native_tokens = NativeTokens::unpack::<_, VERIFY>(unpacker)?;
        let alias_id = AliasId::unpack::<_, VERIFY>(unpacker)?;
        let state_index = u32::unpack::<_, VERIFY>(unpacker).coerce()?;
        let state_metadata = LengthPrefix::U16.unpack_bytes::<_, VERIFY>(unpacker)?;
        Self::verify_state_metadata::<VERIFY>(&state_metadata).map_err(UnpackError::Packable)?;
        let foundry_counter = u32::unpack::<_, VERIFY>(unpacker).coerce()?;
        let conditions = UnlockConditions::unpack_with_rules::<_, VERIFY>(unpacker, &Self::UNLOCK_CONDITION_RULES)?;
        let (state_controller, governor) = Self::take_unlock_conditions(conditions).map_err(UnpackError::Packable)?;
        Ok(Self {
            amount,
            native_tokens,
            alias_id,
            state_index,
            state_metadata,
            foundry_counter,
            state_controller_address_unlock_condition: state_controller,
            governor_address_unlock_condition: governor,
            features: Features::unpack_with_rules::<_, VERIFY>(unpacker, &Self::FEATURE_RULES)?,
            immutable_features: Features::unpack_with_rules::<_, VERIFY>(unpacker, &Self::IMMUTABLE_FEATURE_RULES)?,
        })
    }
}

impl Verify for AliasOutput {
    fn verify_syntax<const VERIFY: bool>(&self, protocol_parameters: &ProtocolParameters) -> Result<(), Error> {
        if VERIFY {
            verify_amount(self.amount, 1, protocol_parameters)?;
        }
        Self::verify_state_metadata::<VERIFY>(&self.state_metadata)?;
        self.native_tokens.verify::<VERIFY>()?;
        self.unlock_conditions()
            .verify_with::<VERIFY>(&Self::UNLOCK_CONDITION_RULES)?;
        self.features.verify_with::<VERIFY>(&Self::FEATURE_RULES)?;
        self.immutable_features
            .verify_with::<VERIFY>(&Self::IMMUTABLE_FEATURE_RULES)
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AliasOutputDto {
    #[serde(with = "stringify")]
    amount: u64,
    native_tokens: NativeTokens,
    alias_id: AliasId,
    state_index: u32,
    #[serde(with = "hexify")]
    state_metadata: Box<[u8]>,
    foundry_counter: u32,
    unlock_conditions: UnlockConditions,
    #[serde(rename = "featureBlocks")]
    features: Features,
    #[serde(rename = "immutableFeatureBlocks")]
    immutable_features: Features,
}

impl From<AliasOutput> for AliasOutputDto {
    fn from(value: AliasOutput) -> Self {
        Self {
            amount: value.amount,
            unlock_conditions: value.unlock_conditions(),
            native_tokens: value.native_tokens,
            alias_id: value.alias_id,
            state_index: value.state_index,
            state_metadata: value.state_metadata,
            foundry_counter: value.foundry_counter,
            features: value.features,
            immutable_features: value.immutable_features,
        }
    }
}

impl TryFrom<AliasOutputDto> for AliasOutput {
    type Error = Error;

    fn try_from(value: AliasOutputDto) -> Result<Self, Self::Error> {
        let (state_controller, governor) = Self::take_unlock_conditions(value.unlock_conditions)?;
        Ok(Self {
            amount: value.amount,
            native_tokens: value.native_tokens,
            alias_id: value.alias_id,
            state_index: value.state_index,
            state_metadata: value.state_metadata,
            foundry_counter: value.foundry_counter,
            state_controller_address_unlock_condition: state_controller,
            governor_address_unlock_condition: governor,
            features: value.features,
            immutable_features: value.immutable_features,
        })
    }
}

#[cfg(feature = "rand")]
mod rand {
    use super::*;
    use crate::types::{
        block::Address,
        rand::{rand_bytes, rand_number_range},
    };

    impl AliasOutput {
        /// Generates a random [`AliasOutput`].
        pub fn rand() -> Self {
            Self {
                amount: rand_number_range(1_000_000..1_000_000_000),
                native_tokens: NativeTokens::rand(),
                alias_id: AliasId::rand(),
                state_index: rand_number_range(0..1000),
                state_metadata: rand_bytes(rand_number_range(0..64)).into(),
                foundry_counter: rand_number_range(0..1000),
                state_controller_address_unlock_condition: StateControllerAddressUnlockCondition {
                    address: Address::rand_ed25519(),
                },
                governor_address_unlock_condition: GovernorAddressUnlockCondition {
                    address: Address::rand_ed25519(),
                },
                features: Features::rand_allowed(&Self::FEATURE_RULES),
                immutable_features: Features::rand_allowed(&Self::IMMUTABLE_FEATURE_RULES),
            }
        }
    }
}
