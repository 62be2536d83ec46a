// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Protocol parameters that the codec and the syntactic checks depend on.

#![allow(missing_docs)]

use packable::{
    error::{UnpackError, UnpackErrorExt},
    packer::Packer,
    unpacker::Unpacker,
    Packable,
};
use serde::{Deserialize, Serialize};

use crate::types::{
    codec::{LengthPrefix, Verify},
    error::Error,
    util::{blake2b256, stringify},
};

/// Parameters relevant to byte cost calculations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Packable)]
#[serde(rename_all = "camelCase")]
#[packable(unpack_error = Error)]
pub struct RentStructure {
    pub v_byte_cost: u32,
    pub v_byte_factor_data: u8,
    pub v_byte_factor_key: u8,
}

impl RentStructure {
    /// The size of an output id, weighted with the key factor.
    pub const OUTPUT_ID_SIZE: u64 = 34;
    /// The size of the block id, milestone index and milestone timestamp stored next to every output.
    pub const OUTPUT_METADATA_SIZE: u64 = 32 + 4 + 4;

    /// The storage deposit required for an object of `packed_len` bytes.
    pub fn cost(&self, packed_len: usize) -> u64 {
        let weight = self.v_byte_factor_key as u64 * Self::OUTPUT_ID_SIZE
            + self.v_byte_factor_data as u64 * (Self::OUTPUT_METADATA_SIZE + packed_len as u64);
        self.v_byte_cost as u64 * weight
    }
}

impl Default for RentStructure {
    fn default() -> Self {
        Self {
            v_byte_cost: 100,
            v_byte_factor_data: 1,
            v_byte_factor_key: 10,
        }
    }
}

/// Protocol parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolParameters {
    pub version: u8,
    pub network_name: String,
    pub bech32_hrp: String,
    pub min_pow_score: u32,
    pub rent_structure: RentStructure,
    #[serde(with = "stringify")]
    pub token_supply: u64,
}

impl ProtocolParameters {
    /// The network id: the first eight bytes of the BLAKE2b-256 hash of the network name, read as little-endian.
    pub fn network_id(&self) -> u64 {
        network_id_from_str(&self.network_name)
    }
}

/// Derives a network id from a network name.
pub fn network_id_from_str(network_name: &str) -> u64 {
    let hash = blake2b256(network_name.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash[..8]);
    u64::from_le_bytes(bytes)
}

impl Default for ProtocolParameters {
    fn default() -> Self {
        Self {
            version: 2,
            network_name: "testnet".to_owned(),
            bech32_hrp: "rms".to_owned(),
            min_pow_score: 1500,
            rent_structure: RentStructure::default(),
            token_supply: 1_813_620_509_061_365,
        }
    }
}

impl Packable for ProtocolParameters {
    type UnpackError = Error;

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        self.version.pack(packer)?;
        LengthPrefix::U8.pack_bytes(self.network_name.as_bytes(), packer)?;
        LengthPrefix::U8.pack_bytes(self.bech32_hrp.as_bytes(), packer)?;
        self.min_pow_score.pack(packer)?;
        self.rent_structure.pack(packer)?;
        self.token_supply.pack(packer)
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(
        unpacker: &mut U,
    ) -> Result<Self, UnpackError<Self::UnpackError, U::Error>> {
        let version = u8::unpack::<_, VERIFY>(unpacker).coerce()?;
        let network_name = unpack_string::<_, VERIFY>(unpacker, "network name")?;
        let bech32_hrp = unpack_string::<_, VERIFY>(unpacker, "bech32 hrp")?;
        Ok(Self {
            version,
            network_name,
            bech32_hrp,
            min_pow_score: u32::unpack::<_, VERIFY>(unpacker).coerce()?,
            rent_structure: RentStructure::unpack::<_, VERIFY>(unpacker)?,
            token_supply: u64::unpack::<_, VERIFY>(unpacker).coerce()?,
        })
    }
}

impl Verify for ProtocolParameters {
    fn verify_syntax<const VERIFY: bool>(&self, _: &ProtocolParameters) -> Result<(), Error> {
        LengthPrefix::U8.check("network name", self.network_name.len())?;
        LengthPrefix::U8.check("bech32 hrp", self.bech32_hrp.len())
    }
}

fn unpack_string<U: Unpacker, const VERIFY: bool>(
    unpacker: &mut U,
    field: &'static str,
) -> Result<String, UnpackError<Error, U::Error>> {
    let bytes = LengthPrefix::U8.unpack_bytes::<_, VERIFY>(unpacker)?;
    String::from_utf8(bytes.into_vec()).map_err(|_| UnpackError::Packable(Error::InvalidString { field }))
}

#[cfg(test)]
mod test {
    use packable::PackableExt;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::types::codec::{CodecConfig, CodecExt};

    #[test]
    fn test_protocol_parameters_json() {
        let parameters = ProtocolParameters::default();
        let json = serde_json::to_value(&parameters).unwrap();
        assert_eq!(json["networkName"], "testnet");
        assert_eq!(json["tokenSupply"], "1813620509061365");
        assert_eq!(json["rentStructure"]["vByteCost"], 100);
        assert_eq!(serde_json::from_value::<ProtocolParameters>(json).unwrap(), parameters);
    }

    #[test]
    fn test_protocol_parameters_binary() {
        let config = CodecConfig::default();
        let parameters = ProtocolParameters {
            network_name: "alphanet-7".to_owned(),
            ..Default::default()
        };
        let bytes = parameters.pack_with(&config).unwrap();
        assert_eq!(ProtocolParameters::unpack_with(&bytes, &config).unwrap(), parameters);
    }

    #[test]
    fn long_network_name_is_rejected() {
        let parameters = ProtocolParameters {
            network_name: "n".repeat(256),
            ..Default::default()
        };
        assert!(matches!(
            parameters.pack_with(&CodecConfig::default().with_verify(false)),
            Err(Error::InvalidLength { length: 256, .. })
        ));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let mut bytes = 2u8.pack_to_vec();
        bytes.extend([1, 0xff]);
        assert!(matches!(
            ProtocolParameters::unpack_with(&bytes, &CodecConfig::default()),
            Err(Error::InvalidString { field: "network name" })
        ));
    }

    #[test]
    fn network_id_depends_on_name() {
        assert_eq!(network_id_from_str("testnet"), network_id_from_str("testnet"));
        assert_ne!(network_id_from_str("testnet"), network_id_from_str("mainnet"));
    }

    #[test]
    fn rent_cost() {
        let rent = RentStructure {
            v_byte_cost: 2,
            v_byte_factor_data: 1,
            v_byte_factor_key: 10,
        };
        assert_eq!(rent.cost(60), 2 * (10 * 34 + 100));
    }
}
