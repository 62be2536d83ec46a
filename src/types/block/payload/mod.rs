// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the [`Payload`] types.

use packable::{
    error::{UnpackError, UnpackErrorExt},
    packer::Packer,
    unpacker::Unpacker,
    Packable,
};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

mod indexation;
pub mod transaction;

pub use self::{
    indexation::IndexationPayload,
    transaction::{TransactionEssence, TransactionId, TransactionPayload},
};
use crate::types::{
    codec::Verify,
    error::Error,
    protocol::ProtocolParameters,
    util::{from_json_value, json_kind, Tagged},
};

/// The different payloads. Their discriminant is encoded as a `u32`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Payload {
    /// A signed transaction.
    Transaction(Box<TransactionPayload>),
    /// Indexed data.
    Indexation(Box<IndexationPayload>),
}

impl Payload {
    /// Every payload kind.
    pub const ALL_KINDS: &'static [u32] = &[TransactionPayload::KIND, IndexationPayload::KIND];

    /// The discriminant of the variant.
    pub fn kind(&self) -> u32 {
        match self {
            Self::Transaction(_) => TransactionPayload::KIND,
            Self::Indexation(_) => IndexationPayload::KIND,
        }
    }

    /// Fails if the kind of the payload is not in `allowed`.
    pub fn check_kind(kind: u32, context: &'static str, allowed: &[u32]) -> Result<(), Error> {
        if !allowed.contains(&kind) {
            return Err(Error::UnsupportedTypeDiscriminant {
                kind: context,
                discriminant: kind,
            });
        }
        Ok(())
    }

    /// Reads a payload whose kind has to be in `allowed`. The kind is checked before the body is read.
    pub fn unpack_allowed<U: Unpacker, const VERIFY: bool>(
        unpacker: &mut U,
        context: &'static str,
        allowed: &[u32],
    ) -> Result<Self, UnpackError<Error, U::Error>> {
        let kind = u32::unpack::<_, VERIFY>(unpacker).coerce()?;
        Self::check_kind(kind, context, allowed).map_err(UnpackError::Packable)?;
        Ok(match kind {
            TransactionPayload::KIND => {
                Self::Transaction(Box::new(TransactionPayload::unpack::<_, VERIFY>(unpacker)?))
            }
            IndexationPayload::KIND => Self::Indexation(Box::new(IndexationPayload::unpack::<_, VERIFY>(unpacker)?)),
            discriminant => {
                return Err(UnpackError::Packable(Error::UnsupportedTypeDiscriminant {
                    kind: context,
                    discriminant,
                }));
            }
        })
    }
}

impl From<TransactionPayload> for Payload {
    fn from(value: TransactionPayload) -> Self {
        Self::Transaction(Box::new(value))
    }
}

impl From<IndexationPayload> for Payload {
    fn from(value: IndexationPayload) -> Self {
        Self::Indexation(Box::new(value))
    }
}

impl Packable for Payload {
    type UnpackError = Error;

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        self.kind().pack(packer)?;
        match self {
            Self::Transaction(payload) => payload.pack(packer),
            Self::Indexation(payload) => payload.pack(packer),
        }
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(
        unpacker: &mut U,
    ) -> Result<Self, UnpackError<Self::UnpackError, U::Error>> {
        Self::unpack_allowed::<_, VERIFY>(unpacker, "payload", Self::ALL_KINDS)
    }
}

impl Verify for Payload {
    fn verify_syntax<const VERIFY: bool>(&self, protocol_parameters: &ProtocolParameters) -> Result<(), Error> {
        match self {
            Self::Transaction(payload) => payload.verify_syntax::<VERIFY>(protocol_parameters),
            Self::Indexation(payload) => payload.verify_syntax::<VERIFY>(protocol_parameters),
        }
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Transaction(payload) => Tagged::new(self.kind(), payload.as_ref()).serialize(serializer),
            Self::Indexation(payload) => Tagged::new(self.kind(), payload.as_ref()).serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match json_kind::<D::Error>(&value)? {
            TransactionPayload::KIND => Self::Transaction(Box::new(from_json_value(value)?)),
            IndexationPayload::KIND => Self::Indexation(Box::new(from_json_value(value)?)),
            discriminant => {
                return Err(D::Error::custom(Error::UnsupportedTypeDiscriminant {
                    kind: "payload",
                    discriminant,
                }));
            }
        })
    }
}
