// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::sync::{PoisonError, RwLock};

use lazy_static::lazy_static;
use tracing::debug;

use crate::types::protocol::ProtocolParameters;

/// The context every encode and decode runs in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodecConfig {
    /// The parameters the syntactic rules are checked against.
    pub protocol_parameters: ProtocolParameters,
    /// Whether syntactic checks run by default.
    pub verify: bool,
}

impl CodecConfig {
    /// Creates a configuration that verifies against `protocol_parameters`.
    pub fn new(protocol_parameters: ProtocolParameters) -> Self {
        Self {
            protocol_parameters,
            verify: true,
        }
    }

    /// Enables or disables the syntactic rules.
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::new(ProtocolParameters::default())
    }
}

lazy_static! {
    static ref DEFAULT_CONFIG: RwLock<CodecConfig> = RwLock::new(CodecConfig::default());
}

/// Runs `f` while holding a read lock on the default configuration. Swapping waits until `f` returns.
pub(crate) fn with_default_config<R>(f: impl FnOnce(&CodecConfig) -> R) -> R {
    let config = DEFAULT_CONFIG.read().unwrap_or_else(PoisonError::into_inner);
    f(&config)
}

/// A copy of the current default configuration.
pub fn default_config() -> CodecConfig {
    with_default_config(CodecConfig::clone)
}

/// Replaces the default configuration and returns the previous one.
pub fn swap_default_config(config: CodecConfig) -> CodecConfig {
    let mut guard = DEFAULT_CONFIG.write().unwrap_or_else(PoisonError::into_inner);
    debug!(
        network_name = %config.protocol_parameters.network_name,
        token_supply = config.protocol_parameters.token_supply,
        "Swapping default codec configuration"
    );
    std::mem::replace(&mut *guard, config)
}
