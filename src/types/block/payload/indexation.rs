// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the [`IndexationPayload`] type.

use packable::{error::UnpackError, packer::Packer, unpacker::Unpacker, Packable};
use serde::{Deserialize, Serialize};

use crate::types::{
    codec::{verify_length, LengthPrefix, Verify},
    error::Error,
    protocol::ProtocolParameters,
    util::hexify,
};

/// Attaches indexed data to a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexationPayload {
    /// The index the data is found under.
    #[serde(with = "hexify")]
    pub index: Box<[u8]>,
    /// The data.
    #[serde(with = "hexify")]
    pub data: Box<[u8]>,
}

#[allow(missing_docs)]
impl IndexationPayload {
    pub const KIND: u32 = 2;
    pub const INDEX_LENGTH_MIN: usize = 1;
    pub const INDEX_LENGTH_MAX: usize = 64;

    pub fn new(index: impl Into<Box<[u8]>>, data: impl Into<Box<[u8]>>) -> Self {
        Self {
            index: index.into(),
            data: data.into(),
        }
    }

    fn verify_index<const VERIFY: bool>(index: &[u8]) -> Result<(), Error> {
        if VERIFY {
            verify_length(
                "indexation index",
                index.len(),
                Self::INDEX_LENGTH_MIN,
                Self::INDEX_LENGTH_MAX,
            )
        } else {
            LengthPrefix::U16.check("indexation index", index.len())
        }
    }
}

impl Packable for IndexationPayload {
    type UnpackError = Error;

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        LengthPrefix::U16.pack_bytes(&self.index, packer)?;
        LengthPrefix::U32.pack_bytes(&self.data, packer)
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(
        unpacker: &mut U,
    ) -> Result<Self, UnpackError<Self::UnpackError, U::Error>> {
        let index = LengthPrefix::U16.unpack_bytes::<_, VERIFY>(unpacker)?;
        Self::verify_index::<VERIFY>(&index).map_err(UnpackError::Packable)?;
        Ok(Self {
            index,
            data: LengthPrefix::U32.unpack_bytes::<_, VERIFY>(unpacker)?,
        })
    }
}

impl Verify for IndexationPayload {
    fn verify_syntax<const VERIFY: bool>(&self, _: &ProtocolParameters) -> Result<(), Error> {
        Self::verify_index::<VERIFY>(&self.index)?;
        LengthPrefix::U32.check("indexation data", self.data.len())
    }
}

#[cfg(feature = "rand")]
mod rand {
    use super::*;
    use crate::types::rand::{rand_bytes, rand_number_range};

    impl IndexationPayload {
        /// Generates a random [`IndexationPayload`].
        pub fn rand() -> Self {
            Self::new(
                rand_bytes(rand_number_range(Self::INDEX_LENGTH_MIN..Self::INDEX_LENGTH_MAX + 1)),
                rand_bytes(rand_number_range(0..256)),
            )
        }
    }
}

#[cfg(all(test, feature = "rand"))]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::types::codec::{CodecConfig, CodecExt};

    #[test]
    fn test_indexation_layout() {
        let payload = IndexationPayload::new(b"idx".to_vec(), vec![1, 2]);
        let bytes = payload.pack_with(&CodecConfig::default()).unwrap();
        assert_eq!(bytes, vec![3, 0, b'i', b'd', b'x', 2, 0, 0, 0, 1, 2]);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({ "index": "696478", "data": "0102" })
        );
    }

    #[test]
    fn empty_index_is_rejected() {
        let payload = IndexationPayload::new(Vec::new(), vec![1]);
        assert!(matches!(
            payload.pack_with(&CodecConfig::default()),
            Err(Error::InvalidLength { length: 0, .. })
        ));
        let bytes = payload.pack_with(&CodecConfig::default().with_verify(false)).unwrap();
        assert_eq!(&bytes[..2], &[0, 0]);
        assert!(matches!(
            IndexationPayload::unpack_with(&bytes, &CodecConfig::default()),
            Err(Error::InvalidLength { length: 0, .. })
        ));
    }
}
