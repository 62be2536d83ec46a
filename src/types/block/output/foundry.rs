// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use packable::{
    error::{UnpackError, UnpackErrorExt},
    packer::Packer,
    unpacker::Unpacker,
    Packable,
};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

use super::{
    verify_amount, ChainId, ChainTransition, Feature, Features, ImmutableAliasAddressUnlockCondition, NativeTokenId,
    NativeTokens, Output, TokenScheme, UnlockCondition, UnlockConditions,
};
use crate::types::{
    block::address::AliasAddress,
    codec::{CollectionRules, LengthPrefix, Verify},
    error::Error,
    ledger::{balanced_with_diff, SemanticValidationContext, TokenDelta},
    protocol::ProtocolParameters,
    util::{decimal, stringify},
};

impl_id!(
    /// The identifier of a foundry: its alias address, its serial number and its token scheme kind.
    pub FoundryId,
    38
);

impl FoundryId {
    /// Derives the id from the controlling alias, the serial number and the token scheme kind.
    pub fn build(alias_address: &AliasAddress, serial_number: u32, token_scheme_kind: u8) -> Self {
        let mut bytes = [0u8; Self::LENGTH];
        bytes[0] = AliasAddress::KIND;
        bytes[1..AliasAddress::PACKED_LENGTH].copy_from_slice(&alias_address.alias_id.0);
        bytes[AliasAddress::PACKED_LENGTH..AliasAddress::PACKED_LENGTH + 4]
            .copy_from_slice(&serial_number.to_le_bytes());
        bytes[Self::LENGTH - 1] = token_scheme_kind;
        Self(bytes)
    }

    /// The serial number of the foundry within its alias.
    pub fn serial_number(&self) -> u32 {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.0[AliasAddress::PACKED_LENGTH..AliasAddress::PACKED_LENGTH + 4]);
        u32::from_le_bytes(bytes)
    }
}

impl_id!(
    /// Distinguishes the native tokens minted by the same foundry.
    pub TokenTag,
    12
);

/// An output that controls the supply of a native token.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "FoundryOutputDto", into = "FoundryOutputDto")]
#[allow(missing_docs)]
pub struct FoundryOutput {
    pub amount: u64,
    pub native_tokens: NativeTokens,
    pub serial_number: u32,
    pub token_tag: TokenTag,
    pub circulating_supply: U256,
    pub maximum_supply: U256,
    pub token_scheme: TokenScheme,
    pub immutable_alias_address_unlock_condition: ImmutableAliasAddressUnlockCondition,
    pub features: Features,
    pub immutable_features: Features,
}

#[allow(missing_docs)]
impl FoundryOutput {
    pub const KIND: u8 = 5;

    pub const UNLOCK_CONDITION_RULES: CollectionRules =
        CollectionRules::new("unlock condition", LengthPrefix::U8, 1, 1)
            .allowed_types(&[UnlockCondition::IMMUTABLE_ALIAS_ADDRESS_KIND])
            .must_occur(&[UnlockCondition::IMMUTABLE_ALIAS_ADDRESS_KIND])
            .lexical_order()
            .unique_types();

    pub const FEATURE_RULES: CollectionRules = Features::rules("feature", &[Feature::METADATA_KIND]);

    pub const IMMUTABLE_FEATURE_RULES: CollectionRules =
        Features::rules("immutable feature", &[Feature::METADATA_KIND]);

    /// The controlling alias.
    pub fn alias_address(&self) -> &AliasAddress {
        &self.immutable_alias_address_unlock_condition.address
    }

    pub fn foundry_id(&self) -> FoundryId {
        FoundryId::build(self.alias_address(), self.serial_number, self.token_scheme.kind())
    }

    pub fn native_token_id(&self) -> NativeTokenId {
        NativeTokenId::build(&self.foundry_id(), &self.token_tag)
    }

    pub fn chain_id(&self) -> ChainId {
        ChainId::Foundry(self.foundry_id())
    }

    /// Checks the syntactic rules that do not depend on the protocol parameters.
    pub fn verify(&self) -> Result<(), Error> {
        if self.circulating_supply > self.maximum_supply {
            return Err(Error::CirculatingSupplyExceedsMaximum {
                circulating: self.circulating_supply,
                maximum: self.maximum_supply,
            });
        }
        Ok(())
    }

    /// Checks the kinds of the sub-objects against the kinds this output allows.
    pub fn check_types(&self) -> Result<(), Error> {
        self.features.check_types(&Self::FEATURE_RULES)?;
        self.immutable_features.check_types(&Self::IMMUTABLE_FEATURE_RULES)
    }

    fn unlock_conditions(&self) -> UnlockConditions {
        UnlockConditions::new(vec![UnlockCondition::ImmutableAliasAddress(
            self.immutable_alias_address_unlock_condition,
        )])
    }

    fn take_unlock_condition(conditions: UnlockConditions) -> Result<ImmutableAliasAddressUnlockCondition, Error> {
        conditions.require_exactly(&Self::UNLOCK_CONDITION_RULES)?;
        conditions
            .immutable_alias_address()
            .copied()
            .ok_or(Error::MissingMandatoryElementType {
                kind: Self::UNLOCK_CONDITION_RULES.kind,
                discriminant: UnlockCondition::IMMUTABLE_ALIAS_ADDRESS_KIND,
            })
    }

    /// Validates the transition of this foundry within the transaction of `context`.
    pub fn transition(
        &self,
        transition: ChainTransition<'_>,
        context: &SemanticValidationContext<'_>,
    ) -> Result<(), Error> {
        match transition {
            ChainTransition::Genesis => self.genesis_valid(context),
            ChainTransition::StateChange { next } => {
                let next = match next {
                    Output::Foundry(next) => next,
                    _ => {
                        return Err(Error::InvalidChainStateTransition {
                            chain_id: self.chain_id(),
                            reason: "next state is not a foundry output",
                        });
                    }
                };
                self.state_change_valid(next, context)
            }
            ChainTransition::Destroy => {
                let working_set = &context.working_set;
                balanced_with_diff(
                    &self.native_token_id(),
                    &working_set.in_native_token_sums,
                    &working_set.out_native_token_sums,
                    TokenDelta::between(self.circulating_supply, U256::zero()),
                )
            }
        }
    }

    fn genesis_valid(&self, context: &SemanticValidationContext<'_>) -> Result<(), Error> {
        let working_set = &context.working_set;
        let foundry_id = self.foundry_id();
        let alias_chain_id = ChainId::Alias(self.alias_address().alias_id);

        let alias_in = match working_set.input_chains.get(&alias_chain_id) {
            Some(Output::Alias(alias)) => alias,
            _ => {
                return Err(Error::MissingTransitioningChainOutput {
                    chain_id: alias_chain_id,
                    side: "input",
                });
            }
        };
        let alias_out = match working_set.output_chains.get(&alias_chain_id) {
            Some(Output::Alias(alias)) => alias,
            _ => {
                return Err(Error::MissingTransitioningChainOutput {
                    chain_id: alias_chain_id,
                    side: "output",
                });
            }
        };

        let (start, end) = (alias_in.foundry_counter, alias_out.foundry_counter);
        if self.serial_number <= start || self.serial_number > end {
            return Err(Error::SerialNumberOutOfRange {
                foundry_id,
                serial_number: self.serial_number,
                start,
                end,
            });
        }

        // New foundries of the same alias must appear with strictly increasing serial numbers.
        for (index, output) in working_set.transaction_outputs().iter().enumerate() {
            let other = match output {
                Output::Foundry(other) if other.alias_address() == self.alias_address() => other,
                _ => continue,
            };
            let other_id = other.foundry_id();
            if other_id == foundry_id {
                break;
            }
            if working_set.input_chains.contains_key(&ChainId::Foundry(other_id)) {
                continue;
            }
            if other.serial_number >= self.serial_number {
                return Err(Error::SerialNumberOutOfOrder {
                    foundry_id,
                    other: other_id,
                    index,
                });
            }
        }

        balanced_with_diff(
            &self.native_token_id(),
            &working_set.in_native_token_sums,
            &working_set.out_native_token_sums,
            TokenDelta::between(U256::zero(), self.circulating_supply),
        )
    }

    fn state_change_valid(&self, next: &Self, context: &SemanticValidationContext<'_>) -> Result<(), Error> {
        if self.immutable_features != next.immutable_features {
            return Err(Error::ImmutableFieldMutated {
                field: "immutable features",
            });
        }
        if self.maximum_supply != next.maximum_supply {
            return Err(Error::ImmutableFieldMutated {
                field: "maximum supply",
            });
        }
        if self.token_tag != next.token_tag {
            return Err(Error::ImmutableFieldMutated { field: "token tag" });
        }
        if self.foundry_id() != next.foundry_id() {
            return Err(Error::InvalidChainStateTransition {
                chain_id: self.chain_id(),
                reason: "next state belongs to another foundry",
            });
        }

        let working_set = &context.working_set;
        balanced_with_diff(
            &self.native_token_id(),
            &working_set.in_native_token_sums,
            &working_set.out_native_token_sums,
            TokenDelta::between(self.circulating_supply, next.circulating_supply),
        )
    }
}

impl Packable for FoundryOutput {
    type UnpackError = Error;

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        self.amount.pack(packer)?;
        self.native_tokens.pack(packer)?;
        self.serial_number.pack(packer)?;
        self.token_tag.pack(packer)?;
        self.circulating_supply.pack(packer)?;
        self.maximum_supply.pack(packer)?;
        self.token_scheme.pack(packer)?;
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
        let serial_number = u32::unpack::<_, VERIFY>(unpacker).coerce()?;
        let token_tag = TokenTag::unpack::<_, VERIFY>(unpacker)?;
        let circulating_supply = U256::unpack::<_, VERIFY>(unpacker).coerce()?;
        let maximum_supply = U256::unpack::<_, VERIFY>(unpacker).coerce()?;
        let token_scheme = TokenScheme::unpack::<_, VERIFY>(unpacker)?;
        let conditions = UnlockConditions::unpack_with_rules::<_, VERIFY>(unpacker, &Self::UNLOCK_CONDITION_RULES)?;
        let output = Self {
            amount,
            native_tokens,
            serial_number,
            token_tag,
            circulating_supply,
            maximum_supply,
            token_scheme,
            immutable_alias_address_unlock_condition: Self::take_unlock_condition(conditions)
                .map_err(UnpackError::Packable)?,
            features: Features::unpack_with_rules::<_, VERIFY>(unpacker, &Self::FEATURE_RULES)?,
            immutable_features: Features::unpack_with_rules::<_, VERIFY>(unpacker, &Self::IMMUTABLE_FEATURE_RULES)?,
        };
        if VERIFY {
            output.verify().map_err(UnpackError::Packable)?;
        }
        Ok(output)
    }
}

impl Verify for FoundryOutput {
    fn verify_syntax<const VERIFY: bool>(&self, protocol_parameters: &ProtocolParameters) -> Result<(), Error> {
        if VERIFY {
            verify_amount(self.amount, 1, protocol_parameters)?;
            self.verify()?;
        }
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
struct FoundryOutputDto {
    #[serde(with = "stringify")]
    amount: u64,
    native_tokens: NativeTokens,
    serial_number: u32,
    token_tag: TokenTag,
    #[serde(with = "decimal")]
    circulating_supply: U256,
    #[serde(with = "decimal")]
    maximum_supply: U256,
    token_scheme: TokenScheme,
    unlock_conditions: UnlockConditions,
    #[serde(rename = "featureBlocks")]
    features: Features,
    #[serde(rename = "immutableFeatureBlocks")]
    immutable_features: Features,
}

impl From<FoundryOutput> for FoundryOutputDto {
    fn from(value: FoundryOutput) -> Self {
        Self {
            amount: value.amount,
            unlock_conditions: value.unlock_conditions(),
            native_tokens: value.native_tokens,
            serial_number: value.serial_number,
            token_tag: value.token_tag,
            circulating_supply: value.circulating_supply,
            maximum_supply: value.maximum_supply,
            token_scheme: value.token_scheme,
            features: value.features,
            immutable_features: value.immutable_features,
        }
    }
}

impl TryFrom<FoundryOutputDto> for FoundryOutput {
    type Error = Error;

    fn try_from(value: FoundryOutputDto) -> Result<Self, Self::Error> {
        Ok(Self {
            amount: value.amount,
            native_tokens: value.native_tokens,
            serial_number: value.serial_number,
            token_tag: value.token_tag,
            circulating_supply: value.circulating_supply,
            maximum_supply: value.maximum_supply,
            token_scheme: value.token_scheme,
            immutable_alias_address_unlock_condition: Self::take_unlock_condition(value.unlock_conditions)?,
            features: value.features,
            immutable_features: value.immutable_features,
        })
    }
}

#[cfg(feature = "rand")]
mod rand {
    use super::*;
    use crate::types::rand::{rand_number, rand_number_range};

    impl FoundryOutput {
        /// Generates a random [`FoundryOutput`].
        pub fn rand() -> Self {
            Self::rand_for_alias(AliasAddress::rand(), rand_number_range(1..1000))
        }

        /// Generates a random [`FoundryOutput`] controlled by the given alias.
        pub fn rand_for_alias(alias_address: AliasAddress, serial_number: u32) -> Self {
            let maximum_supply = U256::from(rand_number::<u64>()) + 1;
            Self {
                amount: rand_number_range(1_000_000..1_000_000_000),
                native_tokens: NativeTokens::rand(),
                serial_number,
                token_tag: TokenTag::rand(),
                circulating_supply: maximum_supply / 2,
                maximum_supply,
                token_scheme: TokenScheme::Simple,
                immutable_alias_address_unlock_condition: ImmutableAliasAddressUnlockCondition {
                    address: alias_address,
                },
                features: Features::rand_allowed(&Self::FEATURE_RULES),
                immutable_features: Features::rand_allowed(&Self::IMMUTABLE_FEATURE_RULES),
            }
        }
    }
}

#[cfg(all(test, feature = "rand"))]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::types::{
        block::output::AliasId,
        codec::{CodecConfig, CodecExt},
    };

    #[test]
    fn test_foundry_id_layout() {
        let alias = AliasAddress::new(AliasId::from([1; 32]));
        let id = FoundryId::build(&alias, 0x0403_0201, TokenScheme::SIMPLE_KIND);
        assert_eq!(id.0[0], AliasAddress::KIND);
        assert_eq!(&id.0[1..33], &[1; 32]);
        assert_eq!(&id.0[33..37], &[1, 2, 3, 4]);
        assert_eq!(id.0[37], 0);
        assert_eq!(id.serial_number(), 0x0403_0201);
    }

    #[test]
    fn test_foundry_id_depends_on_every_component() {
        let alias = AliasAddress::rand();
        let id = FoundryId::build(&alias, 1, 0);
        assert_eq!(id, FoundryId::build(&alias, 1, 0));
        assert_ne!(id, FoundryId::build(&AliasAddress::rand(), 1, 0));
        assert_ne!(id, FoundryId::build(&alias, 2, 0));
        assert_ne!(id, FoundryId::build(&alias, 1, 1));
    }

    #[test]
    fn test_foundry_json() {
        let output = FoundryOutput::rand();
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["unlockConditions"][0]["type"], 6);
        assert_eq!(json["circulatingSupply"], output.circulating_supply.to_string());
        assert_eq!(serde_json::from_value::<FoundryOutput>(json).unwrap(), output);
    }

    #[test]
    fn test_foundry_binary() {
        let config = CodecConfig::default();
        let output = FoundryOutput::rand();
        let bytes = output.pack_with(&config).unwrap();
        assert_eq!(FoundryOutput::unpack_with(&bytes, &config).unwrap(), output);
    }

    #[test]
    fn circulating_above_maximum_is_rejected() {
        let mut output = FoundryOutput::rand();
        output.circulating_supply = output.maximum_supply + 1;
        assert!(matches!(output.verify(), Err(Error::CirculatingSupplyExceedsMaximum { .. })));

        let config = CodecConfig::default();
        assert!(matches!(
            output.pack_with(&config),
            Err(Error::CirculatingSupplyExceedsMaximum { .. })
        ));
        let unverified = config.clone().with_verify(false);
        let bytes = output.pack_with(&unverified).unwrap();
        assert_eq!(FoundryOutput::unpack_with(&bytes, &unverified).unwrap(), output);
        assert!(matches!(
            FoundryOutput::unpack_with(&bytes, &config),
            Err(Error::CirculatingSupplyExceedsMaximum { .. })
        ));
    }

    #[test]
    fn missing_unlock_condition_is_rejected_in_json() {
        let mut json = serde_json::to_value(&FoundryOutput::rand()).unwrap();
        json["unlockConditions"] = serde_json::json!([]);
        assert!(serde_json::from_value::<FoundryOutput>(json).is_err());
    }
}
