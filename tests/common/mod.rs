// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use packable::PackableExt;
use stardust_ledger::types::{
    block::{
        address::{AliasAddress, Ed25519Address},
        output::{
            AliasId, AliasOutput, ChainId, Features, FoundryOutput, GovernorAddressUnlockCondition, NativeTokens,
            OutputId, SimpleOutput, StateControllerAddressUnlockCondition,
        },
        payload::{
            transaction::{AddressSigner, InMemoryAddressSigner},
            TransactionEssence, TransactionId,
        },
        signature::Ed25519Signature,
        unlock::{IndexUnlock, Unlocks},
        Address, Input, Output, Signature, TransactionPayload, Unlock,
    },
    codec::CodecConfig,
    ledger::WorkingSet,
    protocol::ProtocolParameters,
};

/// A codec configuration for the default test network with all checks enabled.
#[allow(unused)]
pub fn test_config() -> CodecConfig {
    CodecConfig::new(ProtocolParameters::default()).with_verify(true)
}

#[allow(unused)]
pub fn output_id(transaction_byte: u8, index: u16) -> OutputId {
    OutputId::new(TransactionId::from([transaction_byte; 32]), index)
}

/// A signer holding `count` keys, together with the addresses they own.
#[allow(unused)]
pub fn signer_with_keys(count: u8) -> (InMemoryAddressSigner, Vec<Address>) {
    let mut signer = InMemoryAddressSigner::new();
    let addresses = (1..=count)
        .map(|seed| Address::from(signer.add_secret_key(&[seed; 32]).unwrap()))
        .collect();
    (signer, addresses)
}

#[allow(unused)]
pub fn simple_output(address: impl Into<Address>, amount: u64) -> SimpleOutput {
    SimpleOutput {
        address: address.into(),
        amount,
    }
}

/// A foundry of the alias with id `[alias_byte; 32]` and a fixed token tag.
#[allow(unused)]
pub fn foundry(alias_byte: u8, serial_number: u32) -> FoundryOutput {
    let mut foundry =
        FoundryOutput::rand_for_alias(AliasAddress::new(AliasId::from([alias_byte; 32])), serial_number);
    foundry.token_tag = [7; 12].into();
    foundry
}

#[allow(unused)]
pub fn ed25519_address(byte: u8) -> Ed25519Address {
    Ed25519Address::from([byte; 32])
}

/// An alias without native tokens, metadata or features whose state controller and governor are both `owner`.
#[allow(unused)]
pub fn alias(alias_id: AliasId, owner: Address, state_index: u32, foundry_counter: u32) -> AliasOutput {
    AliasOutput {
        amount: 1_000_000,
        native_tokens: NativeTokens::default(),
        alias_id,
        state_index,
        state_metadata: Box::default(),
        foundry_counter,
        state_controller_address_unlock_condition: StateControllerAddressUnlockCondition { address: owner },
        governor_address_unlock_condition: GovernorAddressUnlockCondition { address: owner },
        features: Features::default(),
        immutable_features: Features::default(),
    }
}

/// Builds a transaction spending `consumed` whose inputs are unlocked by their owners. Keys are taken from
/// `signer`, chain owned inputs reference the consumed chain that owns them.
#[allow(unused)]
pub fn signed_transaction(
    signer: &InMemoryAddressSigner,
    consumed: &[(OutputId, Output)],
    outputs: Vec<Output>,
) -> TransactionPayload {
    let essence = TransactionEssence {
        network_id: ProtocolParameters::default().network_id(),
        inputs: consumed.iter().map(|(output_id, _)| Input::from(*output_id)).collect(),
        outputs: outputs.into_boxed_slice(),
        payload: None,
    };
    let message = essence.pack_to_vec();
    let unsigned = TransactionPayload::new(essence, Unlocks::new(Vec::new()));

    let unlocks = {
        let working_set = WorkingSet::new(&unsigned, consumed.to_vec()).unwrap();
        let chain_position = |chain_id: ChainId| {
            consumed
                .iter()
                .position(|(output_id, output)| output.chain_id(output_id) == Some(chain_id))
                .expect("owning chain is consumed") as u16
        };
        let mut signed = HashMap::new();
        let mut unlocks = Vec::new();
        for index in 0..consumed.len() {
            let owner = working_set.unlocking_address(index).unwrap();
            unlocks.push(if let Some(address) = owner.as_alias() {
                Unlock::Alias(IndexUnlock {
                    reference: chain_position(ChainId::Alias(address.alias_id)),
                })
            } else if let Some(address) = owner.as_nft() {
                Unlock::Nft(IndexUnlock {
                    reference: chain_position(ChainId::Nft(address.nft_id)),
                })
            } else if let Some(&reference) = signed.get(&owner) {
                Unlock::reference(reference)
            } else {
                signed.insert(owner, index as u16);
                let material = signer.sign(&owner, &message).unwrap();
                Unlock::signature(Signature::Ed25519(Ed25519Signature::new(
                    material.public_key.unwrap().try_into().unwrap(),
                    material.signature.try_into().unwrap(),
                )))
            });
        }
        unlocks
    };
    TransactionPayload::new(unsigned.essence, Unlocks::new(unlocks))
}
