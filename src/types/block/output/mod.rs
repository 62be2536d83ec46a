// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the [`Output`] types.

mod alias;
mod basic;
mod chain;
mod feature;
mod foundry;
mod native_token;
mod nft;
mod simple;
mod token_scheme;
mod treasury;
mod unlock_condition;

use std::{fmt, str::FromStr};

use packable::{Packable, PackableExt};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

pub use self::{
    alias::{AliasId, AliasOutput},
    basic::BasicOutput,
    chain::{ChainId, ChainTransition},
    feature::{Feature, Features, IssuerFeature, MetadataFeature, SenderFeature, TagFeature},
    foundry::{FoundryId, FoundryOutput, TokenTag},
    native_token::{NativeToken, NativeTokenId, NativeTokens},
    nft::{NftId, NftOutput},
    simple::SimpleOutput,
    token_scheme::TokenScheme,
    treasury::TreasuryOutput,
    unlock_condition::{
        AddressUnlockCondition, ExpirationUnlockCondition, GovernorAddressUnlockCondition,
        ImmutableAliasAddressUnlockCondition, StateControllerAddressUnlockCondition,
        StorageDepositReturnUnlockCondition, TimelockUnlockCondition, UnlockCondition, UnlockConditions,
    },
};
use crate::types::{
    block::payload::TransactionId,
    codec::Verify,
    error::Error,
    ledger::SemanticValidationContext,
    protocol::{ProtocolParameters, RentStructure},
    util::{blake2b256, from_json_value, json_kind_u8, Tagged},
};

/// Checks that an amount lies in `min..=token_supply`.
pub(crate) fn verify_amount(amount: u64, min: u64, protocol_parameters: &ProtocolParameters) -> Result<(), Error> {
    let max = protocol_parameters.token_supply;
    if amount < min || amount > max {
        return Err(Error::InvalidAmount { amount, min, max });
    }
    Ok(())
}

/// The id of an output: the id of the transaction that created it and its index in that transaction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Packable)]
#[serde(rename_all = "camelCase")]
#[packable(unpack_error = Error)]
pub struct OutputId {
    /// The creating transaction.
    pub transaction_id: TransactionId,
    /// The position among the outputs of the transaction.
    pub index: u16,
}

impl OutputId {
    /// The length of the binary encoding.
    pub const LENGTH: usize = TransactionId::LENGTH + 2;

    /// Creates an output id.
    pub fn new(transaction_id: TransactionId, index: u16) -> Self {
        Self { transaction_id, index }
    }

    /// The binary encoding of the id.
    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        let mut bytes = [0u8; Self::LENGTH];
        bytes[..TransactionId::LENGTH].copy_from_slice(&self.transaction_id.0);
        bytes[TransactionId::LENGTH..].copy_from_slice(&self.index.to_le_bytes());
        bytes
    }

    /// The BLAKE2b-256 hash of the id, from which new chain ids are derived.
    pub fn hash(&self) -> [u8; 32] {
        blake2b256(self.to_bytes())
    }
}

impl From<[u8; OutputId::LENGTH]> for OutputId {
    fn from(bytes: [u8; OutputId::LENGTH]) -> Self {
        let mut transaction_id = [0u8; TransactionId::LENGTH];
        transaction_id.copy_from_slice(&bytes[..TransactionId::LENGTH]);
        Self {
            transaction_id: TransactionId(transaction_id),
            index: u16::from_le_bytes([bytes[TransactionId::LENGTH], bytes[TransactionId::LENGTH + 1]]),
        }
    }
}

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", prefix_hex::encode(self.to_bytes()))
    }
}

impl FromStr for OutputId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        prefix_hex::decode::<[u8; Self::LENGTH]>(s)
            .map(Self::from)
            .map_err(|_| Error::InvalidHex { value: s.to_owned() })
    }
}

fn unsupported_output_kind(discriminant: u8) -> Error {
    Error::UnsupportedTypeDiscriminant {
        kind: "output",
        discriminant: discriminant as u32,
    }
}

/// Represents the different output types.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Packable)]
#[packable(unpack_error = Error)]
#[packable(tag_type = u8, with_error = unsupported_output_kind)]
#[allow(missing_docs)]
pub enum Output {
    #[packable(tag = SimpleOutput::KIND)]
    Simple(SimpleOutput),
    #[packable(tag = TreasuryOutput::KIND)]
    Treasury(TreasuryOutput),
    #[packable(tag = BasicOutput::KIND)]
    Basic(BasicOutput),
    #[packable(tag = AliasOutput::KIND)]
    Alias(AliasOutput),
    #[packable(tag = FoundryOutput::KIND)]
    Foundry(FoundryOutput),
    #[packable(tag = NftOutput::KIND)]
    Nft(NftOutput),
}

impl Output {
    /// The discriminant of the variant.
    pub fn kind(&self) -> u8 {
        match self {
            Self::Simple(_) => SimpleOutput::KIND,
            Self::Treasury(_) => TreasuryOutput::KIND,
            Self::Basic(_) => BasicOutput::KIND,
            Self::Alias(_) => AliasOutput::KIND,
            Self::Foundry(_) => FoundryOutput::KIND,
            Self::Nft(_) => NftOutput::KIND,
        }
    }

    /// The base token deposit.
    pub fn amount(&self) -> u64 {
        match self {
            Self::Simple(output) => output.amount,
            Self::Treasury(output) => output.amount,
            Self::Basic(output) => output.amount,
            Self::Alias(output) => output.amount,
            Self::Foundry(output) => output.amount,
            Self::Nft(output) => output.amount,
        }
    }

    /// The native tokens, on the variants that can hold them.
    pub fn native_tokens(&self) -> Option<&NativeTokens> {
        match self {
            Self::Simple(_) | Self::Treasury(_) => None,
            Self::Basic(output) => Some(&output.native_tokens),
            Self::Alias(output) => Some(&output.native_tokens),
            Self::Foundry(output) => Some(&output.native_tokens),
            Self::Nft(output) => Some(&output.native_tokens),
        }
    }

    /// The chain id of chain-constrained outputs. Null alias and NFT ids are resolved from `output_id`.
    pub fn chain_id(&self, output_id: &OutputId) -> Option<ChainId> {
        match self {
            Self::Alias(output) => Some(output.chain_id(output_id)),
            Self::Foundry(output) => Some(output.chain_id()),
            Self::Nft(output) => Some(output.chain_id(output_id)),
            _ => None,
        }
    }

    /// The storage deposit this output has to carry.
    pub fn rent_cost(&self, rent_structure: &RentStructure) -> u64 {
        match self {
            Self::Treasury(_) => 0,
            _ => rent_structure.cost(self.packed_len()),
        }
    }

    /// Fails if the amount does not cover [`Output::rent_cost`].
    pub fn verify_storage_deposit(&self, rent_structure: &RentStructure) -> Result<(), Error> {
        let required = self.rent_cost(rent_structure);
        if self.amount() < required {
            return Err(Error::InsufficientStorageDeposit {
                amount: self.amount(),
                required,
            });
        }
        Ok(())
    }

    /// Checks the kinds of the sub-objects against the kinds allowed for this variant.
    pub fn check_types(&self) -> Result<(), Error> {
        match self {
            Self::Simple(_) | Self::Treasury(_) => Ok(()),
            Self::Basic(output) => output.check_types(),
            Self::Alias(output) => output.check_types(),
            Self::Foundry(output) => output.check_types(),
            Self::Nft(output) => output.check_types(),
        }
    }

    /// Runs the state transition validation of chain-constrained outputs. Other outputs always pass. `output_id`
    /// is the id under which the output was consumed or created.
    pub fn transition(
        &self,
        output_id: &OutputId,
        transition: ChainTransition<'_>,
        context: &SemanticValidationContext<'_>,
    ) -> Result<(), Error> {
        match self {
            Self::Alias(output) => output.transition(output_id, transition, context),
            Self::Foundry(output) => output.transition(transition, context),
            Self::Nft(output) => output.transition(output_id, transition, context),
            _ => Ok(()),
        }
    }
}

impl From<SimpleOutput> for Output {
    fn from(value: SimpleOutput) -> Self {
        Self::Simple(value)
    }
}

impl From<TreasuryOutput> for Output {
    fn from(value: TreasuryOutput) -> Self {
        Self::Treasury(value)
    }
}

impl From<BasicOutput> for Output {
    fn from(value: BasicOutput) -> Self {
        Self::Basic(value)
    }
}

impl From<AliasOutput> for Output {
    fn from(value: AliasOutput) -> Self {
        Self::Alias(value)
    }
}

impl From<FoundryOutput> for Output {
    fn from(value: FoundryOutput) -> Self {
        Self::Foundry(value)
    }
}

impl From<NftOutput> for Output {
    fn from(value: NftOutput) -> Self {
        Self::Nft(value)
    }
}

impl Verify for Output {
    fn verify_syntax<const VERIFY: bool>(&self, protocol_parameters: &ProtocolParameters) -> Result<(), Error> {
        match self {
            Self::Simple(output) => output.verify_syntax::<VERIFY>(protocol_parameters),
            Self::Treasury(output) => output.verify_syntax::<VERIFY>(protocol_parameters),
            Self::Basic(output) => output.verify_syntax::<VERIFY>(protocol_parameters),
            Self::Alias(output) => output.verify_syntax::<VERIFY>(protocol_parameters),
            Self::Foundry(output) => output.verify_syntax::<VERIFY>(protocol_parameters),
            Self::Nft(output) => output.verify_syntax::<VERIFY>(protocol_parameters),
        }
    }
}

impl Serialize for Output {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kind = self.kind();
        match self {
            Self::Simple(output) => Tagged::new(kind, output).serialize(serializer),
            Self::Treasury(output) => Tagged::new(kind, output).serialize(serializer),
            Self::Basic(output) => Tagged::new(kind, output).serialize(serializer),
            Self::Alias(output) => Tagged::new(kind, output).serialize(serializer),
            Self::Foundry(output) => Tagged::new(kind, output).serialize(serializer),
            Self::Nft(output) => Tagged::new(kind, output).serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Output {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let output = match json_kind_u8::<D::Error>("output", &value)? {
            SimpleOutput::KIND => Self::Simple(from_json_value(value)?),
            TreasuryOutput::KIND => Self::Treasury(from_json_value(value)?),
            BasicOutput::KIND => Self::Basic(from_json_value(value)?),
            AliasOutput::KIND => Self::Alias(from_json_value(value)?),
            FoundryOutput::KIND => Self::Foundry(from_json_value(value)?),
            NftOutput::KIND => Self::Nft(from_json_value(value)?),
            discriminant => return Err(D::Error::custom(unsupported_output_kind(discriminant))),
        };
        output.check_types().map_err(D::Error::custom)?;
        Ok(output)
    }
}

#[cfg(feature = "rand")]
mod rand {
    use super::*;
    use crate::types::rand::rand_number_range;

    impl OutputId {
        /// Generates a random [`OutputId`].
        pub fn rand() -> Self {
            Self::new(TransactionId::rand(), rand_number_range(0..128))
        }
    }

    impl Output {
        /// Generates a random [`Output`].
        pub fn rand() -> Self {
            match rand_number_range(0..6) {
                0 => Self::rand_simple(),
                1 => Self::rand_treasury(),
                2 => Self::rand_basic(),
                3 => Self::rand_alias(),
                4 => Self::rand_foundry(),
                5 => Self::rand_nft(),
                _ => unreachable!(),
            }
        }

        /// Generates a random [`Output`] that may appear in a transaction.
        pub fn rand_transaction_output() -> Self {
            match rand_number_range(0..5) {
                0 => Self::rand_simple(),
                1 => Self::rand_basic(),
                2 => Self::rand_alias(),
                3 => Self::rand_foundry(),
                4 => Self::rand_nft(),
                _ => unreachable!(),
            }
        }

        /// Generates a random simple [`Output`].
        pub fn rand_simple() -> Self {
            Self::Simple(SimpleOutput::rand())
        }

        /// Generates a random treasury [`Output`].
        pub fn rand_treasury() -> Self {
            Self::Treasury(TreasuryOutput::rand())
        }

        /// Generates a random basic [`Output`].
        pub fn rand_basic() -> Self {
            Self::Basic(BasicOutput::rand())
        }

        /// Generates a random alias [`Output`].
        pub fn rand_alias() -> Self {
            Self::Alias(AliasOutput::rand())
        }

        /// Generates a random foundry [`Output`].
        pub fn rand_foundry() -> Self {
            Self::Foundry(FoundryOutput::rand())
        }

        /// Generates a random nft [`Output`].
        pub fn rand_nft() -> Self {
            Self::Nft(NftOutput::rand())
        }
    }
}
