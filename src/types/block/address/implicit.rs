// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use packable::Packable;
use serde::{Deserialize, Serialize};

use super::Ed25519Address;
use crate::types::error::Error;

/// An address that creates an implicit account when funds are sent to it. It is owned by the same key as the
/// wrapped [`Ed25519Address`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Packable)]
#[serde(transparent)]
#[packable(unpack_error = Error)]
pub struct ImplicitAccountCreationAddress(pub Ed25519Address);

impl ImplicitAccountCreationAddress {
    /// The discriminant of the address.
    pub const KIND: u8 = 24;

    /// The address of the key that may create the account.
    pub fn ed25519_address(&self) -> &Ed25519Address {
        &self.0
    }
}

impl From<Ed25519Address> for ImplicitAccountCreationAddress {
    fn from(value: Ed25519Address) -> Self {
        Self(value)
    }
}
