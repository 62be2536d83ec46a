// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! The error type shared by the codec, the syntactic checks and the state transition validation.

use std::convert::Infallible;

use primitive_types::U256;
use thiserror::Error;

use crate::types::{
    block::{
        output::{ChainId, FoundryId, NativeTokenId, OutputId},
        Address,
    },
    ledger::TokenDelta,
};

/// Errors raised while encoding, decoding or validating ledger objects.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum Error {
    #[error("truncated input: expected {expected} bytes but only {available} are available")]
    TruncatedInput { expected: usize, available: usize },
    #[error("{trailing} trailing bytes left after decoding")]
    TrailingBytes { trailing: usize },
    #[error("unsupported {kind} type {discriminant}")]
    UnsupportedTypeDiscriminant { kind: &'static str, discriminant: u32 },
    #[error("invalid {kind} count {count}, expected between {min} and {max}")]
    InvalidCollectionCardinality {
        kind: &'static str,
        count: usize,
        min: usize,
        max: usize,
    },
    #[error("{kind} of type {discriminant} occurs more than once")]
    DuplicateElementType { kind: &'static str, discriminant: u8 },
    #[error("{kind} at index {index} is a duplicate of its predecessor")]
    DuplicateElement { kind: &'static str, index: usize },
    #[error("missing mandatory {kind} of type {discriminant}")]
    MissingMandatoryElementType { kind: &'static str, discriminant: u8 },
    #[error("{kind} at index {index} is not in lexical order")]
    NonCanonicalOrdering { kind: &'static str, index: usize },
    #[error("invalid {kind} length {length}, expected between {min} and {max}")]
    InvalidLength {
        kind: &'static str,
        length: usize,
        min: usize,
        max: usize,
    },
    #[error("{field} is not valid utf-8")]
    InvalidString { field: &'static str },
    #[error("invalid hex string `{value}`")]
    InvalidHex { value: String },
    #[error("address capabilities must not end with a zero byte")]
    NonCanonicalCapabilities,
    #[error("invalid amount {amount}, expected between {min} and {max}")]
    InvalidAmount { amount: u64, min: u64, max: u64 },
    #[error("native token amount must not be zero")]
    NullNativeTokenAmount,
    #[error("circulating supply {circulating} exceeds maximum supply {maximum}")]
    CirculatingSupplyExceedsMaximum { circulating: U256, maximum: U256 },
    #[error("transaction outputs deposit {total}, which exceeds the token supply {token_supply}")]
    TotalAmountExceedsTokenSupply { total: u128, token_supply: u64 },
    #[error("network id mismatch: expected {expected} but got {actual}")]
    NetworkIdMismatch { expected: u64, actual: u64 },
    #[error("transaction has {inputs} inputs but {unlocks} unlocks")]
    UnlockCountMismatch { inputs: usize, unlocks: usize },
    #[error("unlock at index {index} references invalid unlock {reference}")]
    InvalidUnlockReference { index: usize, reference: u16 },
    #[error("storage deposit of {amount} is lower than the required {required}")]
    InsufficientStorageDeposit { amount: u64, required: u64 },
    #[error("immutable field `{field}` was mutated")]
    ImmutableFieldMutated { field: &'static str },
    #[error("native token {token_id} supply mismatch: expected delta {expected} but got {actual}")]
    NativeTokenSupplyMismatch {
        token_id: NativeTokenId,
        expected: TokenDelta,
        actual: TokenDelta,
    },
    #[error("native token {token_id} sum overflows 256 bits")]
    NativeTokenSumOverflow { token_id: NativeTokenId },
    #[error("output index {index} does not fit into an output id")]
    OutputIndexOverflow { index: usize },
    #[error("unlock {index} does not match the owner {owner:?} of its input")]
    UnlockOwnerMismatch { index: usize, owner: Address },
    #[error("signature of unlock {index} does not verify")]
    InvalidSignature { index: usize },
    #[error("consumed output {index} does not belong to the input at the same index")]
    ConsumedOutputMismatch { index: usize },
    #[error("base token amounts do not balance: {input} consumed but {output} created")]
    AmountMismatch { input: u128, output: u128 },
    #[error("serial number {serial_number} of foundry {foundry_id} is not in the interval ({start}, {end}]")]
    SerialNumberOutOfRange {
        foundry_id: FoundryId,
        serial_number: u32,
        start: u32,
        end: u32,
    },
    #[error("new foundry {other} at output index {index} has a serial number greater or equal to foundry {foundry_id}")]
    SerialNumberOutOfOrder {
        foundry_id: FoundryId,
        other: FoundryId,
        index: usize,
    },
    #[error("missing {side} transitioning chain output {chain_id}")]
    MissingTransitioningChainOutput { chain_id: ChainId, side: &'static str },
    #[error("invalid state transition of chain {chain_id}: {reason}")]
    InvalidChainStateTransition { chain_id: ChainId, reason: &'static str },
    #[error("no signing scheme implemented for address type {kind}")]
    UnimplementedSigningScheme { kind: u8 },
    #[error("no owner address known for input {output_id}")]
    MissingInputOwner { output_id: OutputId },
    #[error("signer did not reveal a public key for address type {kind}")]
    MissingPublicKey { kind: u8 },
    #[error("signer failed: {0}")]
    Signer(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("invalid json field `{field}`: {value}")]
    JsonFieldDecode { field: &'static str, value: String },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<Infallible> for Error {
    fn from(error: Infallible) -> Self {
        match error {}
    }
}
