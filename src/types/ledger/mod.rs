// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the semantic validation of transactions against the outputs they consume.

mod native_token_sum;
mod semantic;

pub use self::{
    native_token_sum::{balanced_with_diff, NativeTokenSum, TokenDelta},
    semantic::{SemanticValidationContext, WorkingSet},
};
