// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use packable::{
    error::{UnpackError, UnpackErrorExt},
    packer::Packer,
    unpacker::Unpacker,
    Packable,
};
use serde::{de::Error as _, ser::SerializeMap, Deserialize, Deserializer, Serialize, Serializer};

use crate::types::{error::Error, util::json_kind_u8};

fn unsupported_token_scheme_kind(discriminant: u8) -> Error {
    Error::UnsupportedTypeDiscriminant {
        kind: "token scheme",
        discriminant: discriminant as u32,
    }
}

/// The supply policy of a foundry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenScheme {
    /// Tokens are minted and melted freely up to the maximum supply.
    Simple,
}

impl Default for TokenScheme {
    fn default() -> Self {
        Self::Simple
    }
}

impl TokenScheme {
    /// The discriminant of [`TokenScheme::Simple`].
    pub const SIMPLE_KIND: u8 = 0;

    /// The discriminant of the variant.
    pub fn kind(&self) -> u8 {
        match self {
            Self::Simple => Self::SIMPLE_KIND,
        }
    }
}

impl Packable for TokenScheme {
    type UnpackError = Error;

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        self.kind().pack(packer)
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(
        unpacker: &mut U,
    ) -> Result<Self, UnpackError<Self::UnpackError, U::Error>> {
        match u8::unpack::<_, VERIFY>(unpacker).coerce()? {
            Self::SIMPLE_KIND => Ok(Self::Simple),
            discriminant => Err(UnpackError::Packable(unsupported_token_scheme_kind(discriminant))),
        }
    }
}

impl Serialize for TokenScheme {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("type", &self.kind())?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for TokenScheme {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        match json_kind_u8::<D::Error>("token scheme", &value)? {
            Self::SIMPLE_KIND => Ok(Self::Simple),
            discriminant => Err(D::Error::custom(unsupported_token_scheme_kind(discriminant))),
        }
    }
}
