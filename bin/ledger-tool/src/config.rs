// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use stardust_ledger::types::{codec::CodecConfig, protocol::ProtocolParameters};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config at '{0}': {1}")]
    FileRead(String, std::io::Error),
    #[error("toml deserialization failed: {0}")]
    TomlDeserialization(toml::de::Error),
}

/// Configuration of the ledger tool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerToolConfig {
    pub protocol: ProtocolParameters,
    /// Whether the syntactic rules are checked while encoding and decoding.
    pub verify: bool,
}

impl Default for LedgerToolConfig {
    fn default() -> Self {
        Self {
            protocol: ProtocolParameters::default(),
            verify: true,
        }
    }
}

impl LedgerToolConfig {
    /// Reads the config from the file located at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        fs::read_to_string(&path)
            .map_err(|e| ConfigError::FileRead(path.as_ref().display().to_string(), e))
            .and_then(|contents| toml::from_str::<Self>(&contents).map_err(ConfigError::TomlDeserialization))
    }

    /// The codec configuration for every encode and decode of this run.
    pub fn codec_config(&self) -> CodecConfig {
        CodecConfig::new(self.protocol.clone()).with_verify(self.verify)
    }
}
