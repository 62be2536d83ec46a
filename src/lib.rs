// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! The Stardust ledger object model: addresses, outputs and transactions with their canonical binary codec, the
//! syntactic rules on their collections and the state transition validation of chain outputs.

/// Module that contains the ledger types.
pub mod types;

pub use self::types::error::Error;
