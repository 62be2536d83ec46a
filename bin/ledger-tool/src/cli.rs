// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use clap::{Parser, Subcommand, ValueEnum};
use serde::{de::DeserializeOwned, Serialize};
use stardust_ledger::types::{
    block::{output::FoundryOutput, Address, Output, TransactionEssence, TransactionPayload, Unlock},
    codec::{CodecConfig, CodecExt},
};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::{ConfigError, LedgerToolConfig};

#[derive(Error, Debug)]
pub enum ToolError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid hex input: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("invalid json input: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Ledger(#[from] stardust_ledger::Error),
}

/// Converts Stardust ledger objects between their binary and JSON representations.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct ClArgs {
    /// The location of the configuration file.
    #[clap(short, long, env = "CONFIG_PATH")]
    pub config: Option<String>,
    /// The network name, which determines the network id.
    #[clap(long = "protocol.network-name", env = "NETWORK_NAME")]
    pub network_name: Option<String>,
    /// The total supply of base tokens.
    #[clap(long = "protocol.token-supply", env = "TOKEN_SUPPLY")]
    pub token_supply: Option<u64>,
    /// Skip the syntactic rules while encoding and decoding.
    #[clap(long)]
    pub no_verify: bool,
    /// Subcommands.
    #[clap(subcommand)]
    pub subcommand: Subcommands,
}

impl ClArgs {
    /// Get a config file with CLI args applied.
    pub fn get_config(&self) -> Result<LedgerToolConfig, ConfigError> {
        let mut config = self
            .config
            .as_ref()
            .map(LedgerToolConfig::from_file)
            .transpose()?
            .unwrap_or_default();

        if let Some(network_name) = &self.network_name {
            config.protocol.network_name = network_name.clone();
        }
        if let Some(token_supply) = self.token_supply {
            config.protocol.token_supply = token_supply;
        }
        if self.no_verify {
            config.verify = false;
        }

        Ok(config)
    }

    /// Runs the subcommand and returns what it prints.
    #[instrument(skip_all, err, level = "debug")]
    pub fn process_subcommand(&self, config: &LedgerToolConfig) -> Result<String, ToolError> {
        let codec_config = config.codec_config();
        debug!(network_id = config.protocol.network_id(), verify = config.verify);
        match &self.subcommand {
            Subcommands::Decode { kind, hex } => {
                let bytes = hex::decode(hex.trim_start_matches("0x"))?;
                match kind {
                    ObjectKind::Output => decode::<Output>(&bytes, &codec_config),
                    ObjectKind::Address => decode::<Address>(&bytes, &codec_config),
                    ObjectKind::Unlock => decode::<Unlock>(&bytes, &codec_config),
                    ObjectKind::Transaction => decode::<TransactionPayload>(&bytes, &codec_config),
                    ObjectKind::Essence => decode::<TransactionEssence>(&bytes, &codec_config),
                }
            }
            Subcommands::Encode { kind, json } => match kind {
                ObjectKind::Output => encode::<Output>(json, &codec_config),
                ObjectKind::Address => encode::<Address>(json, &codec_config),
                ObjectKind::Unlock => encode::<Unlock>(json, &codec_config),
                ObjectKind::Transaction => encode::<TransactionPayload>(json, &codec_config),
                ObjectKind::Essence => encode::<TransactionEssence>(json, &codec_config),
            },
            Subcommands::FoundryId { json } => {
                let foundry = serde_json::from_str::<FoundryOutput>(json)?;
                Ok(serde_json::to_string_pretty(&serde_json::json!({
                    "foundryId": foundry.foundry_id().to_string(),
                    "nativeTokenId": foundry.native_token_id().to_string(),
                }))?)
            }
            Subcommands::Protocol => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "networkId": config.protocol.network_id().to_string(),
                "parameters": config.protocol,
            }))?),
        }
    }
}

fn decode<T: CodecExt + Serialize>(bytes: &[u8], config: &CodecConfig) -> Result<String, ToolError> {
    let value = T::unpack_with(bytes, config)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

fn encode<T: CodecExt + DeserializeOwned>(json: &str, config: &CodecConfig) -> Result<String, ToolError> {
    let value = serde_json::from_str::<T>(json)?;
    Ok(prefix_hex::encode(value.pack_with(config)?))
}

#[derive(Debug, Subcommand)]
pub enum Subcommands {
    /// Decode a hex encoded object and print it as JSON.
    Decode {
        #[clap(value_enum)]
        kind: ObjectKind,
        hex: String,
    },
    /// Encode a JSON object and print its hex encoded bytes.
    Encode {
        #[clap(value_enum)]
        kind: ObjectKind,
        json: String,
    },
    /// Print the foundry id and native token id of a JSON foundry output.
    FoundryId { json: String },
    /// Print the effective protocol parameters.
    Protocol,
}

/// The objects the tool converts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ObjectKind {
    Output,
    Address,
    Unlock,
    Transaction,
    Essence,
}
