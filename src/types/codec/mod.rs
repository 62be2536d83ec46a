// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! The canonical binary codec of the ledger objects, built on [`packable`].
//!
//! All integers are little-endian. Polymorphic families write their discriminant first, followed by the body of the
//! concrete variant. Collections are written as an element count followed by the concatenated element encodings and
//! are checked against their [`CollectionRules`].
//!
//! Rules that only need the bytes run inside [`Packable::unpack`] when it verifies. Rules that depend on the
//! [`ProtocolParameters`] run in [`Verify::verify_syntax`], which [`CodecExt`] calls before packing and after
//! unpacking.

mod api;
mod rules;

use packable::{
    error::{UnexpectedEOF, UnpackError, UnpackErrorExt},
    packer::Packer,
    unpacker::Unpacker,
    Packable, PackableExt,
};

pub use self::{
    api::{default_config, swap_default_config, CodecConfig},
    rules::CollectionRules,
};
pub(crate) use self::api::with_default_config;
use crate::types::{error::Error, protocol::ProtocolParameters};

/// The width of a length or count prefix.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LengthPrefix {
    /// A single byte.
    U8,
    /// Two bytes.
    U16,
    /// Four bytes.
    U32,
}

impl LengthPrefix {
    /// Byte strings are read in chunks of this size, so a forged length cannot force a large allocation.
    const READ_CHUNK: usize = 4096;

    /// The largest length the prefix can hold.
    pub const fn max(self) -> usize {
        match self {
            Self::U8 => u8::MAX as usize,
            Self::U16 => u16::MAX as usize,
            Self::U32 => u32::MAX as usize,
        }
    }

    /// Fails if `length` does not fit into the prefix.
    pub fn check(self, kind: &'static str, length: usize) -> Result<(), Error> {
        if length > self.max() {
            return Err(Error::InvalidLength {
                kind,
                length,
                min: 0,
                max: self.max(),
            });
        }
        Ok(())
    }

    /// Writes `length`. It has to be checked with [`LengthPrefix::check`] beforehand.
    pub fn pack_length<P: Packer>(self, length: usize, packer: &mut P) -> Result<(), P::Error> {
        match self {
            Self::U8 => (length as u8).pack(packer),
            Self::U16 => (length as u16).pack(packer),
            Self::U32 => (length as u32).pack(packer),
        }
    }

    /// Reads a length written by [`LengthPrefix::pack_length`].
    pub fn unpack_length<U: Unpacker, const VERIFY: bool>(
        self,
        unpacker: &mut U,
    ) -> Result<usize, UnpackError<Error, U::Error>> {
        Ok(match self {
            Self::U8 => u8::unpack::<_, VERIFY>(unpacker).coerce()? as usize,
            Self::U16 => u16::unpack::<_, VERIFY>(unpacker).coerce()? as usize,
            Self::U32 => u32::unpack::<_, VERIFY>(unpacker).coerce()? as usize,
        })
    }

    /// Writes `bytes` behind their length.
    pub fn pack_bytes<P: Packer>(self, bytes: &[u8], packer: &mut P) -> Result<(), P::Error> {
        self.pack_length(bytes.len(), packer)?;
        packer.pack_bytes(bytes)
    }

    /// Reads bytes written by [`LengthPrefix::pack_bytes`].
    pub fn unpack_bytes<U: Unpacker, const VERIFY: bool>(
        self,
        unpacker: &mut U,
    ) -> Result<Box<[u8]>, UnpackError<Error, U::Error>> {
        let length = self.unpack_length::<_, VERIFY>(unpacker)?;
        let mut bytes = Vec::new();
        while bytes.len() < length {
            let start = bytes.len();
            bytes.resize(start + (length - start).min(Self::READ_CHUNK), 0);
            unpacker
                .unpack_bytes(&mut bytes[start..])
                .map_err(UnpackError::Unpacker)?;
        }
        Ok(bytes.into_boxed_slice())
    }
}

/// Checks a length against an inclusive range.
pub fn verify_length(kind: &'static str, length: usize, min: usize, max: usize) -> Result<(), Error> {
    if length < min || length > max {
        return Err(Error::InvalidLength { kind, length, min, max });
    }
    Ok(())
}

/// The syntactic checks of an object that run outside of [`Packable::unpack`].
pub trait Verify {
    /// Checks `self` and everything it contains. Without `VERIFY` only the checks that keep the encoding
    /// well-formed run: allowed kinds in every position and lengths that fit their prefixes.
    fn verify_syntax<const VERIFY: bool>(&self, protocol_parameters: &ProtocolParameters) -> Result<(), Error>;
}

/// Packing and unpacking under an explicit [`CodecConfig`].
pub trait CodecExt: Packable<UnpackError = Error> + Verify {
    /// Checks `self` according to `config` and packs it.
    fn pack_with(&self, config: &CodecConfig) -> Result<Vec<u8>, Error> {
        if config.verify {
            self.verify_syntax::<true>(&config.protocol_parameters)?;
        } else {
            self.verify_syntax::<false>(&config.protocol_parameters)?;
        }
        Ok(self.pack_to_vec())
    }

    /// Unpacks a value from `bytes`, which have to be consumed completely.
    fn unpack_with(bytes: impl AsRef<[u8]>, config: &CodecConfig) -> Result<Self, Error> {
        let bytes = bytes.as_ref();
        let value = if config.verify {
            Self::unpack_verified(bytes)
        } else {
            Self::unpack_unverified(bytes)
        }
        .map_err(Error::from)?;

        let consumed = value.packed_len();
        if consumed < bytes.len() {
            return Err(Error::TrailingBytes {
                trailing: bytes.len() - consumed,
            });
        }
        if config.verify {
            value.verify_syntax::<true>(&config.protocol_parameters)?;
        }
        Ok(value)
    }

    /// Packs `self` under the process-wide default configuration.
    fn pack_checked(&self) -> Result<Vec<u8>, Error> {
        with_default_config(|config| self.pack_with(config))
    }

    /// Unpacks a value under the process-wide default configuration.
    fn unpack_checked(bytes: impl AsRef<[u8]>) -> Result<Self, Error> {
        with_default_config(|config| Self::unpack_with(bytes, config))
    }
}

impl<T: Packable<UnpackError = Error> + Verify> CodecExt for T {}

impl From<UnpackError<Error, UnexpectedEOF>> for Error {
    fn from(error: UnpackError<Error, UnexpectedEOF>) -> Self {
        match error {
            UnpackError::Packable(error) => error,
            UnpackError::Unpacker(UnexpectedEOF { required, had }) => Self::TruncatedInput {
                expected: required,
                available: had,
            },
        }
    }
}
