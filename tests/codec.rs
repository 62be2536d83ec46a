// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

mod common;

use pretty_assertions::assert_eq;
use primitive_types::U256;
use stardust_ledger::{
    types::{
        block::{
            output::{BasicOutput, FoundryOutput, NativeToken, NativeTokenId, NativeTokens},
            Address, Input, Output, TransactionEssence,
        },
        codec::CodecExt,
        protocol::ProtocolParameters,
    },
    Error,
};

use self::common::{output_id, simple_output, test_config};

#[test]
fn outputs_round_trip() {
    let config = test_config();
    let outputs = vec![
        Output::rand_simple(),
        Output::rand_treasury(),
        Output::rand_basic(),
        Output::rand_alias(),
        Output::rand_foundry(),
        Output::rand_nft(),
    ];
    for output in outputs {
        let bytes = output.pack_with(&config).unwrap();
        assert_eq!(bytes[0], output.kind());
        assert_eq!(Output::unpack_with(&bytes, &config).unwrap(), output);

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["type"], output.kind());
        assert_eq!(serde_json::from_value::<Output>(json).unwrap(), output);
    }
}

#[test]
fn addresses_round_trip() {
    let config = test_config();
    for address in [Address::rand_ed25519(), Address::rand_alias(), Address::rand_nft(), Address::rand()] {
        let bytes = address.pack_with(&config).unwrap();
        assert_eq!(Address::unpack_with(&bytes, &config).unwrap(), address);
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(serde_json::from_str::<Address>(&json).unwrap(), address);
    }
}

#[test]
fn json_and_binary_agree() {
    let config = test_config();
    let output = Output::rand_foundry();
    let from_json = serde_json::from_value::<Output>(serde_json::to_value(&output).unwrap()).unwrap();
    assert_eq!(from_json.pack_with(&config).unwrap(), output.pack_with(&config).unwrap());
}

fn essence(inputs: Vec<Input>) -> TransactionEssence {
    TransactionEssence {
        network_id: ProtocolParameters::default().network_id(),
        inputs: inputs.into_boxed_slice(),
        outputs: vec![Output::from(simple_output(Address::rand_ed25519(), 1_000_000))].into_boxed_slice(),
        payload: None,
    }
}

#[test]
fn non_canonical_inputs_are_rejected() {
    let config = test_config();
    let unsorted = essence(vec![output_id(2, 0).into(), output_id(1, 0).into()]);

    assert!(matches!(
        unsorted.pack_with(&config),
        Err(Error::NonCanonicalOrdering { index: 1, .. })
    ));

    // Every element decodes on its own, only the order is wrong.
    let bytes = unsorted.pack_with(&config.clone().with_verify(false)).unwrap();
    assert!(matches!(
        TransactionEssence::unpack_with(&bytes, &config),
        Err(Error::NonCanonicalOrdering { index: 1, .. })
    ));
    assert_eq!(
        TransactionEssence::unpack_with(&bytes, &config.with_verify(false)).unwrap(),
        unsorted
    );
}

#[test]
fn duplicate_inputs_are_rejected() {
    let config = test_config();
    let duplicated = essence(vec![output_id(1, 0).into(), output_id(1, 0).into()]);
    let bytes = duplicated.pack_with(&config.clone().with_verify(false)).unwrap();
    assert!(matches!(
        TransactionEssence::unpack_with(&bytes, &config),
        Err(Error::DuplicateElement { index: 1, .. })
    ));
}

#[test]
fn non_canonical_native_tokens_are_rejected() {
    let config = test_config();
    let mut basic = BasicOutput::rand();
    basic.native_tokens = NativeTokens::new(vec![
        NativeToken::new(NativeTokenId::from([2; 50]), U256::from(1u64)),
        NativeToken::new(NativeTokenId::from([1; 50]), U256::from(1u64)),
    ]);
    let output = Output::from(basic);
    let bytes = output.pack_with(&config.clone().with_verify(false)).unwrap();
    assert!(matches!(
        Output::unpack_with(&bytes, &config),
        Err(Error::NonCanonicalOrdering { index: 1, .. })
    ));
}

#[test]
fn truncated_input_fails() {
    let config = test_config();
    let bytes = Output::rand_alias().pack_with(&config).unwrap();
    for length in [0, 1, bytes.len() / 2, bytes.len() - 1] {
        assert!(
            Output::unpack_with(&bytes[..length], &config).is_err(),
            "decoding {length} of {} bytes succeeded",
            bytes.len()
        );
    }
    assert!(matches!(
        Output::unpack_with(&bytes[..bytes.len() - 1], &config),
        Err(Error::TruncatedInput { .. })
    ));
}

#[test]
fn trailing_bytes_fail() {
    let config = test_config();
    let mut bytes = Output::rand_simple().pack_with(&config).unwrap();
    bytes.push(0);
    assert!(matches!(
        Output::unpack_with(&bytes, &config),
        Err(Error::TrailingBytes { trailing: 1 })
    ));
}

#[test]
fn supply_invariant_is_checked_by_validation() {
    let config = test_config();
    let mut foundry = FoundryOutput::rand();
    foundry.maximum_supply = U256::from(10u64);
    foundry.circulating_supply = U256::from(11u64);
    assert!(matches!(
        foundry.verify(),
        Err(Error::CirculatingSupplyExceedsMaximum { .. })
    ));

    let output = Output::from(foundry);
    assert!(output.pack_with(&config).is_err());
    let bytes = output.pack_with(&config.clone().with_verify(false)).unwrap();
    assert!(matches!(
        Output::unpack_with(&bytes, &config),
        Err(Error::CirculatingSupplyExceedsMaximum { .. })
    ));
}

#[test]
fn unknown_discriminants_fail() {
    let config = test_config();
    assert!(matches!(
        Output::unpack_with([1u8], &config),
        Err(Error::UnsupportedTypeDiscriminant { discriminant: 1, .. })
    ));
    assert!(matches!(
        Input::unpack_with([1u8], &config),
        Err(Error::UnsupportedTypeDiscriminant { kind: "input", .. })
    ));
}
