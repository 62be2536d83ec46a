// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the transaction payload, its essence and the builders that assemble them.

mod builder;
mod signer;

use packable::{
    error::{UnpackError, UnpackErrorExt},
    packer::Packer,
    unpacker::Unpacker,
    Packable, PackableExt,
};
use serde::{Deserialize, Serialize};

pub use self::{
    builder::{SignedTransactionBuilder, TransactionBuilder},
    signer::{AddressSigner, InMemoryAddressSigner, SignatureMaterial, SignerError},
};
use super::{IndexationPayload, Payload};
use crate::types::{
    block::{
        input::UtxoInput,
        output::{AliasOutput, BasicOutput, FoundryOutput, NftOutput, SimpleOutput, TreasuryOutput},
        unlock::Unlocks,
        Input, Output,
    },
    codec::{CollectionRules, LengthPrefix, Verify},
    error::Error,
    protocol::ProtocolParameters,
    util::{blake2b256, stringify},
};

impl_id!(
    /// The BLAKE2b-256 hash of a transaction payload.
    pub TransactionId,
    32
);

/// The part of a transaction that is signed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TransactionEssenceDto", into = "TransactionEssenceDto")]
#[allow(missing_docs)]
pub struct TransactionEssence {
    pub network_id: u64,
    pub inputs: Box<[Input]>,
    pub outputs: Box<[Output]>,
    pub payload: Option<Payload>,
}

impl TransactionEssence {
    /// The kind of a regular essence, the only one there is.
    pub const KIND: u8 = 0;

    /// The rules of the consumed inputs.
    pub const INPUT_RULES: CollectionRules = CollectionRules::new("input", LengthPrefix::U16, 1, 128)
        .allowed_types(&[UtxoInput::KIND])
        .lexical_order()
        .no_duplicates();

    /// The rules of the created outputs.
    pub const OUTPUT_RULES: CollectionRules = CollectionRules::new("output", LengthPrefix::U16, 1, 128)
        .allowed_types(&[
            SimpleOutput::KIND,
            BasicOutput::KIND,
            AliasOutput::KIND,
            FoundryOutput::KIND,
            NftOutput::KIND,
        ])
        .lexical_order()
        .no_duplicates();

    /// The payload kinds an essence may carry.
    pub const PAYLOAD_KINDS: &'static [u32] = &[IndexationPayload::KIND];

    fn verify(&self, network_id: u64, token_supply: u64) -> Result<(), Error> {
        if self.network_id != network_id {
            return Err(Error::NetworkIdMismatch {
                expected: network_id,
                actual: self.network_id,
            });
        }
        let total = self.outputs.iter().map(|output| output.amount() as u128).sum::<u128>();
        if total > token_supply as u128 {
            return Err(Error::TotalAmountExceedsTokenSupply { total, token_supply });
        }
        Ok(())
    }
}

impl Packable for TransactionEssence {
    type UnpackError = Error;

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        Self::KIND.pack(packer)?;
        self.network_id.pack(packer)?;
        Self::INPUT_RULES.pack(&self.inputs, packer)?;
        Self::OUTPUT_RULES.pack(&self.outputs, packer)?;
        match &self.payload {
            Some(payload) => {
                (payload.packed_len() as u32).pack(packer)?;
                payload.pack(packer)
            }
            None => 0u32.pack(packer),
        }
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(
        unpacker: &mut U,
    ) -> Result<Self, UnpackError<Self::UnpackError, U::Error>> {
        match u8::unpack::<_, VERIFY>(unpacker).coerce()? {
            Self::KIND => (),
            discriminant => {
                return Err(UnpackError::Packable(Error::UnsupportedTypeDiscriminant {
                    kind: "transaction essence",
                    discriminant: discriminant as u32,
                }));
            }
        }
        let network_id = u64::unpack::<_, VERIFY>(unpacker).coerce()?;
        let inputs = Self::INPUT_RULES.unpack::<_, _, VERIFY>(unpacker)?;
        let outputs = Self::OUTPUT_RULES.unpack::<_, _, VERIFY>(unpacker)?;
        let payload = match LengthPrefix::U32.unpack_length::<_, VERIFY>(unpacker)? {
            0 => None,
            length => {
                let payload =
                    Payload::unpack_allowed::<_, VERIFY>(unpacker, "essence payload", Self::PAYLOAD_KINDS)?;
                let consumed = payload.packed_len();
                if consumed != length {
                    return Err(UnpackError::Packable(Error::InvalidLength {
                        kind: "essence payload",
                        length,
                        min: consumed,
                        max: consumed,
                    }));
                }
                Some(payload)
            }
        };
        Ok(Self {
            network_id,
            inputs,
            outputs,
            payload,
        })
    }
}

impl Verify for TransactionEssence {
    fn verify_syntax<const VERIFY: bool>(&self, protocol_parameters: &ProtocolParameters) -> Result<(), Error> {
        Self::INPUT_RULES.verify_with::<_, VERIFY>(&self.inputs)?;
        Self::OUTPUT_RULES.verify_with::<_, VERIFY>(&self.outputs)?;
        for output in self.outputs.iter() {
            output.verify_syntax::<VERIFY>(protocol_parameters)?;
        }
        if let Some(payload) = &self.payload {
            Payload::check_kind(payload.kind(), "essence payload", Self::PAYLOAD_KINDS)?;
            payload.verify_syntax::<VERIFY>(protocol_parameters)?;
        }
        if VERIFY {
            self.verify(protocol_parameters.network_id(), protocol_parameters.token_supply)?;
        }
        Ok(())
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionEssenceDto {
    #[serde(rename = "type")]
    kind: u8,
    #[serde(with = "stringify")]
    network_id: u64,
    inputs: Vec<Input>,
    outputs: Vec<Output>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<Payload>,
}

impl From<TransactionEssence> for TransactionEssenceDto {
    fn from(value: TransactionEssence) -> Self {
        Self {
            kind: TransactionEssence::KIND,
            network_id: value.network_id,
            inputs: value.inputs.into_vec(),
            outputs: value.outputs.into_vec(),
            payload: value.payload,
        }
    }
}

impl TryFrom<TransactionEssenceDto> for TransactionEssence {
    type Error = Error;

    fn try_from(value: TransactionEssenceDto) -> Result<Self, Self::Error> {
        if value.kind != Self::KIND {
            return Err(Error::UnsupportedTypeDiscriminant {
                kind: "transaction essence",
                discriminant: value.kind as u32,
            });
        }
        if let Some(payload) = &value.payload {
            Payload::check_kind(payload.kind(), "essence payload", Self::PAYLOAD_KINDS)?;
        }
        if let Some(output) = value.outputs.iter().find(|o| o.kind() == TreasuryOutput::KIND) {
            return Err(Error::UnsupportedTypeDiscriminant {
                kind: "output",
                discriminant: output.kind() as u32,
            });
        }
        Ok(Self {
            network_id: value.network_id,
            inputs: value.inputs.into_boxed_slice(),
            outputs: value.outputs.into_boxed_slice(),
            payload: value.payload,
        })
    }
}

/// A transaction essence together with the unlocks of its inputs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct TransactionPayload {
    pub essence: TransactionEssence,
    pub unlocks: Unlocks,
}

impl TransactionPayload {
    /// The payload kind of a transaction.
    pub const KIND: u32 = 0;

    /// Creates a new [`TransactionPayload`].
    pub fn new(essence: TransactionEssence, unlocks: Unlocks) -> Self {
        Self { essence, unlocks }
    }

    /// The id of the transaction: the hash of the payload bytes including the payload kind.
    pub fn id(&self) -> TransactionId {
        let mut bytes = Self::KIND.pack_to_vec();
        bytes.extend(self.pack_to_vec());
        TransactionId(blake2b256(bytes))
    }

    fn verify(&self) -> Result<(), Error> {
        if self.essence.inputs.len() != self.unlocks.len() {
            return Err(Error::UnlockCountMismatch {
                inputs: self.essence.inputs.len(),
                unlocks: self.unlocks.len(),
            });
        }
        Ok(())
    }
}

impl Packable for TransactionPayload {
    type UnpackError = Error;

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        self.essence.pack(packer)?;
        self.unlocks.pack(packer)
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(
        unpacker: &mut U,
    ) -> Result<Self, UnpackError<Self::UnpackError, U::Error>> {
        let payload = Self {
            essence: TransactionEssence::unpack::<_, VERIFY>(unpacker)?,
            unlocks: Unlocks::unpack::<_, VERIFY>(unpacker)?,
        };
        if VERIFY {
            payload.verify().map_err(UnpackError::Packable)?;
        }
        Ok(payload)
    }
}

impl Verify for TransactionPayload {
    fn verify_syntax<const VERIFY: bool>(&self, protocol_parameters: &ProtocolParameters) -> Result<(), Error> {
        self.essence.verify_syntax::<VERIFY>(protocol_parameters)?;
        self.unlocks.verify_syntax::<VERIFY>(protocol_parameters)?;
        if VERIFY {
            self.verify()?;
        }
        Ok(())
    }
}

#[cfg(feature = "rand")]
mod rand {
    use super::*;
    use super::builder::canonical_order;
    use crate::types::{
        block::{output::OutputId, unlock::Unlock, Signature},
        codec::CodecConfig,
        rand::rand_number_range,
    };

    impl TransactionEssence {
        /// Generates a random, canonically ordered [`TransactionEssence`] for the default protocol parameters.
        pub fn rand() -> Self {
            let config = CodecConfig::default();
            let inputs = (0..rand_number_range(1..8))
                .map(|_| Input::from(OutputId::rand()))
                .collect::<Vec<_>>();
            let outputs = (0..rand_number_range(1..8))
                .map(|_| Output::rand_transaction_output())
                .collect::<Vec<_>>();
            Self {
                network_id: config.protocol_parameters.network_id(),
                inputs: canonical_order(inputs).into_boxed_slice(),
                outputs: canonical_order(outputs).into_boxed_slice(),
                payload: Some(IndexationPayload::rand().into()),
            }
        }
    }

    impl TransactionPayload {
        /// Generates a random [`TransactionPayload`] with one signature unlock per input.
        pub fn rand() -> Self {
            let essence = TransactionEssence::rand();
            let unlocks = (0..essence.inputs.len())
                .map(|_| Unlock::signature(Signature::rand()))
                .collect::<Vec<_>>();
            Self::new(essence, Unlocks::new(unlocks))
        }
    }
}
