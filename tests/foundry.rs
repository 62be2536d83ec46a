// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

mod common;

use pretty_assertions::assert_eq;
use primitive_types::U256;
use stardust_ledger::{
    types::{
        block::{
            address::AliasAddress,
            output::{AliasId, FoundryId, FoundryOutput, NativeToken, NativeTokens, OutputId, TokenScheme},
            unlock::Unlocks,
            Address, Output, Unlock,
        },
        ledger::SemanticValidationContext,
    },
    Error,
};

use self::common::{alias, foundry, output_id, signed_transaction, signer_with_keys};

#[test]
fn foundry_id_is_deterministic() {
    let alias = AliasAddress::new(AliasId::from([0xaa; 32]));
    let id = FoundryId::build(&alias, 5, TokenScheme::SIMPLE_KIND);
    assert_eq!(id, FoundryId::build(&alias, 5, TokenScheme::SIMPLE_KIND));

    let mut expected = vec![8];
    expected.extend([0xaa; 32]);
    expected.extend([5, 0, 0, 0, 0]);
    assert_eq!(id.as_ref(), expected.as_slice());
    assert_eq!(id.serial_number(), 5);

    assert_ne!(id, FoundryId::build(&alias, 6, TokenScheme::SIMPLE_KIND));
    assert_eq!(foundry(0xaa, 5).foundry_id(), id);
    assert_eq!(foundry(0xaa, 5).native_token_id().foundry_id(), id);
}

/// A foundry that holds all tokens it has put into circulation.
fn minting(alias_id: AliasId, serial_number: u32) -> FoundryOutput {
    let mut foundry = FoundryOutput::rand_for_alias(AliasAddress::new(alias_id), serial_number);
    foundry.native_tokens = NativeTokens::new(vec![NativeToken::new(
        foundry.native_token_id(),
        foundry.circulating_supply,
    )]);
    foundry
}

fn validate(consumed: Vec<(OutputId, Output)>, outputs: Vec<Output>) -> Result<(), Error> {
    let (signer, _) = signer_with_keys(1);
    let transaction = signed_transaction(&signer, &consumed, outputs);
    SemanticValidationContext::new(&transaction, consumed)?.validate()
}

fn owner() -> Address {
    signer_with_keys(1).1[0]
}

/// Mints one foundry per serial number, in the given output order, from an alias with no foundries yet.
fn mint_in_order(serial_numbers: &[u32]) -> Result<(), Error> {
    let alias_id = AliasId::from([0x33; 32]);
    let next_alias = alias(alias_id, owner(), 1, serial_numbers.len() as u32);

    let mut outputs = vec![Output::from(next_alias)];
    outputs.extend(
        serial_numbers
            .iter()
            .map(|serial_number| Output::from(minting(alias_id, *serial_number))),
    );

    let mut consumed_alias = alias(alias_id, owner(), 0, 0);
    consumed_alias.amount = outputs.iter().map(Output::amount).sum();
    validate(vec![(output_id(1, 0), Output::from(consumed_alias))], outputs)
}

#[test]
fn serial_numbers_in_order() {
    mint_in_order(&[1, 2, 3]).unwrap();
}

#[test]
fn serial_numbers_out_of_order() {
    let error = mint_in_order(&[3, 1, 2]).unwrap_err();
    match error {
        Error::SerialNumberOutOfOrder {
            foundry_id,
            other,
            index,
        } => {
            assert_eq!(foundry_id.serial_number(), 1);
            assert_eq!(other.serial_number(), 3);
            assert_eq!(index, 1);
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn foundry_counter_must_match_new_foundries() {
    let alias_id = AliasId::from([0x44; 32]);
    let next_alias = alias(alias_id, owner(), 4, 4);
    let outputs = vec![Output::from(next_alias), Output::from(minting(alias_id, 3))];
    let mut consumed_alias = alias(alias_id, owner(), 3, 2);
    consumed_alias.amount = outputs.iter().map(Output::amount).sum();
    assert!(matches!(
        validate(vec![(output_id(1, 0), Output::from(consumed_alias))], outputs),
        Err(Error::InvalidChainStateTransition { .. })
    ));
}

/// Spends the controlling alias together with a foundry that holds none of its circulating supply of 400.
fn foundry_inputs() -> (Vec<(OutputId, Output)>, FoundryOutput, Output) {
    let mut current = foundry(0x11, 1);
    current.native_tokens = NativeTokens::default();
    current.maximum_supply = U256::from(1_000u64);
    current.circulating_supply = U256::from(400u64);
    let controller = alias(AliasId::from([0x11; 32]), owner(), 6, 1);
    let mut next_controller = alias(controller.alias_id, owner(), 7, 1);
    next_controller.amount = controller.amount;
    let consumed = vec![
        (output_id(1, 0), Output::from(controller)),
        (output_id(1, 1), Output::from(current.clone())),
    ];
    (consumed, current, Output::from(next_controller))
}

fn state_change(update: impl FnOnce(&mut FoundryOutput)) -> Result<(), Error> {
    let (consumed, current, next_controller) = foundry_inputs();
    let mut next = current;
    update(&mut next);
    validate(consumed, vec![next_controller, Output::from(next)])
}

#[test]
fn circulating_supply_follows_minted_tokens() {
    state_change(|next| {
        next.circulating_supply = U256::from(650u64);
        next.native_tokens = NativeTokens::new(vec![NativeToken::new(next.native_token_id(), U256::from(250u64))]);
    })
    .unwrap();
}

#[test]
fn circulating_supply_without_minting() {
    assert!(matches!(
        state_change(|next| next.circulating_supply = U256::from(650u64)),
        Err(Error::NativeTokenSupplyMismatch { .. })
    ));
}

#[test]
fn maximum_supply_is_immutable() {
    assert!(matches!(
        state_change(|next| next.maximum_supply = U256::from(2_000u64)),
        Err(Error::ImmutableFieldMutated {
            field: "maximum supply"
        })
    ));
}

#[test]
fn token_tag_is_immutable() {
    assert!(matches!(
        state_change(|next| next.token_tag = [9; 12].into()),
        Err(Error::ImmutableFieldMutated { field: "token tag" })
    ));
}

fn destroy(held: u64) -> Result<(), Error> {
    let (mut consumed, mut current, next_controller) = foundry_inputs();
    current.native_tokens = NativeTokens::new(vec![NativeToken::new(current.native_token_id(), U256::from(held))]);
    consumed[1].1 = Output::from(current.clone());
    let receiver = Output::from(common::simple_output(common::ed25519_address(1), current.amount));
    validate(consumed, vec![next_controller, receiver])
}

#[test]
fn destroying_a_foundry_burns_its_supply() {
    destroy(400).unwrap();
}

#[test]
fn destroying_a_foundry_without_burning_its_supply() {
    assert!(matches!(destroy(399), Err(Error::NativeTokenSupplyMismatch { .. })));
}

#[test]
fn foundry_needs_its_alias_unlock() {
    let (signer, _) = signer_with_keys(1);
    let (consumed, current, next_controller) = foundry_inputs();
    let mut transaction = signed_transaction(&signer, &consumed, vec![next_controller, Output::from(current)]);
    let mut unlocks = transaction.unlocks.to_vec();
    unlocks[1] = Unlock::reference(0);
    transaction.unlocks = Unlocks::new(unlocks);
    assert!(matches!(
        SemanticValidationContext::new(&transaction, consumed).unwrap().validate(),
        Err(Error::UnlockOwnerMismatch { index: 1, .. })
    ));
}
