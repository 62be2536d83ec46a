// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module that contains the types.

pub mod block;
pub mod codec;
pub mod error;
pub mod ledger;
pub mod protocol;
#[cfg(feature = "rand")]
pub mod rand;
pub mod util;
