// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module contain utility functions.

use blake2::{digest::consts::U32, Blake2b, Digest};
use serde::{de::DeserializeOwned, Serialize};

type Blake2b256 = Blake2b<U32>;

/// Hashes `bytes` with BLAKE2b-256.
pub fn blake2b256(bytes: impl AsRef<[u8]>) -> [u8; 32] {
    Blake2b256::digest(bytes.as_ref()).into()
}

/// A Serde helper module for converting values to [`String`].
pub mod stringify {
    use std::{fmt::Display, marker::PhantomData, str::FromStr};

    use serde::{de::Visitor, Deserializer, Serializer};

    /// Deserialize T using [`FromStr`]
    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: Display,
    {
        struct Helper<S>(PhantomData<S>);

        impl<'de, S> Visitor<'de> for Helper<S>
        where
            S: FromStr,
            <S as FromStr>::Err: Display,
        {
            type Value = S;

            fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "a string")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                value.parse::<Self::Value>().map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(Helper(PhantomData))
    }

    /// Serialize T using [`Display`]
    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(&value)
    }
}

/// Serializes 256-bit integers as decimal strings. [`FromStr`](std::str::FromStr) of `U256` parses hex, so
/// [`stringify`] cannot be used.
pub mod decimal {
    use primitive_types::U256;
    use serde::{de::Visitor, Deserializer, Serializer};

    use crate::types::error::Error;

    /// Deserialize a [`U256`] from a decimal string.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Helper;

        impl<'de> Visitor<'de> for Helper {
            type Value = U256;

            fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "a decimal string")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                parse(value).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(Helper)
    }

    /// Serialize a [`U256`] as a decimal string.
    pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    /// Parses a decimal string, rejecting signs, empty strings and values wider than 256 bits.
    pub fn parse(value: &str) -> Result<U256, Error> {
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::JsonFieldDecode {
                field: "uint256",
                value: value.to_owned(),
            });
        }
        U256::from_dec_str(value).map_err(|_| Error::JsonFieldDecode {
            field: "uint256",
            value: value.to_owned(),
        })
    }
}

/// Serializes byte sequences and fixed-size arrays as lowercase hex strings without prefix.
pub mod hexify {
    use std::marker::PhantomData;

    use serde::{de::Visitor, Deserializer, Serializer};

    /// Deserialize T from a hex string
    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: for<'a> TryFrom<&'a [u8]>,
    {
        struct Helper<S>(PhantomData<S>);

        impl<'de, S> Visitor<'de> for Helper<S>
        where
            S: for<'a> TryFrom<&'a [u8]>,
        {
            type Value = S;

            fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "a hex string")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                let bytes = hex::decode(value).map_err(serde::de::Error::custom)?;
                S::try_from(bytes.as_slice()).map_err(|_| serde::de::Error::invalid_length(bytes.len(), &self))
            }
        }

        deserializer.deserialize_str(Helper(PhantomData))
    }

    /// Serialize T as a hex string
    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: AsRef<[u8]>,
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(value.as_ref()))
    }
}

/// The JSON shape of a polymorphic value: the `type` discriminant next to the fields of the variant.
#[derive(Serialize)]
pub(crate) struct Tagged<'a, T> {
    #[serde(rename = "type")]
    pub(crate) kind: u32,
    #[serde(flatten)]
    pub(crate) inner: &'a T,
}

impl<'a, T> Tagged<'a, T> {
    pub(crate) fn new(kind: impl Into<u32>, inner: &'a T) -> Self {
        Self {
            kind: kind.into(),
            inner,
        }
    }
}

/// Reads the `type` discriminant of a JSON object.
pub(crate) fn json_kind<E: serde::de::Error>(value: &serde_json::Value) -> Result<u32, E> {
    value
        .get("type")
        .and_then(serde_json::Value::as_u64)
        .and_then(|kind| u32::try_from(kind).ok())
        .ok_or_else(|| E::custom("missing or invalid `type` field"))
}

/// Reads a JSON `type` discriminant that has to fit into a single byte.
pub(crate) fn json_kind_u8<E: serde::de::Error>(kind: &'static str, value: &serde_json::Value) -> Result<u8, E> {
    let discriminant = json_kind(value)?;
    u8::try_from(discriminant).map_err(|_| {
        E::custom(crate::types::error::Error::UnsupportedTypeDiscriminant { kind, discriminant })
    })
}

/// Deserializes a variant body from an already parsed JSON value.
pub(crate) fn from_json_value<T: DeserializeOwned, E: serde::de::Error>(value: serde_json::Value) -> Result<T, E> {
    serde_json::from_value(value).map_err(E::custom)
}
