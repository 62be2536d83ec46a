// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the transaction inputs.

use packable::Packable;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use super::output::OutputId;
use crate::types::{
    codec::Verify,
    error::Error,
    protocol::ProtocolParameters,
    util::{from_json_value, json_kind_u8, Tagged},
};

fn unsupported_input_kind(discriminant: u8) -> Error {
    Error::UnsupportedTypeDiscriminant {
        kind: "input",
        discriminant: discriminant as u32,
    }
}

/// An input referencing an unspent output.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Packable)]
#[serde(transparent)]
#[packable(unpack_error = Error)]
pub struct UtxoInput(pub OutputId);

impl UtxoInput {
    /// The discriminant of the input.
    pub const KIND: u8 = 0;

    /// The referenced output.
    pub fn output_id(&self) -> &OutputId {
        &self.0
    }
}

/// The possible inputs of a transaction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Packable)]
#[packable(unpack_error = Error)]
#[packable(tag_type = u8, with_error = unsupported_input_kind)]
pub enum Input {
    /// References an unspent output.
    #[packable(tag = UtxoInput::KIND)]
    Utxo(UtxoInput),
}

impl Input {
    /// The discriminant of the variant.
    pub fn kind(&self) -> u8 {
        match self {
            Self::Utxo(_) => UtxoInput::KIND,
        }
    }

    /// The referenced output.
    pub fn output_id(&self) -> &OutputId {
        match self {
            Self::Utxo(input) => input.output_id(),
        }
    }
}

impl From<OutputId> for Input {
    fn from(value: OutputId) -> Self {
        Self::Utxo(UtxoInput(value))
    }
}

impl Verify for Input {
    fn verify_syntax<const VERIFY: bool>(&self, _: &ProtocolParameters) -> Result<(), Error> {
        Ok(())
    }
}

impl Serialize for Input {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Utxo(input) => Tagged::new(self.kind(), input).serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Input {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        match json_kind_u8::<D::Error>("input", &value)? {
            UtxoInput::KIND => Ok(Self::Utxo(from_json_value(value)?)),
            discriminant => Err(D::Error::custom(unsupported_input_kind(discriminant))),
        }
    }
}

#[cfg(feature = "rand")]
mod rand {
    use super::*;

    impl Input {
        /// Generates a random [`Input`].
        pub fn rand() -> Self {
            OutputId::rand().into()
        }
    }
}
