// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use ed25519_dalek::{Keypair, PublicKey, SecretKey, Signer};
use thiserror::Error;

use crate::types::block::address::{Address, Ed25519Address};

/// What a signer hands back for a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureMaterial {
    /// The signature bytes.
    pub signature: Vec<u8>,
    /// The public key, for schemes that reveal it next to the signature.
    pub public_key: Option<Vec<u8>>,
}

/// Produces signatures on behalf of the owners of addresses.
pub trait AddressSigner {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Signs `message` with the key behind `address`.
    fn sign(&self, address: &Address, message: &[u8]) -> Result<SignatureMaterial, Self::Error>;
}

#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum SignerError {
    #[error("no key known for address {0}")]
    UnknownAddress(Ed25519Address),
    #[error("address type {0} is not backed by an ed25519 key")]
    UnsupportedAddress(u8),
    #[error("invalid ed25519 secret key")]
    InvalidSecretKey,
}

/// Signs with Ed25519 keys held in memory.
///
/// Restricted Ed25519 and implicit account creation addresses are served by the key of the Ed25519 address they
/// wrap.
#[derive(Default)]
pub struct InMemoryAddressSigner {
    keys: HashMap<Ed25519Address, Keypair>,
}

impl InMemoryAddressSigner {
    /// Creates a signer without keys.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a secret key and returns the address it owns.
    pub fn add_secret_key(&mut self, secret_key: &[u8; 32]) -> Result<Ed25519Address, SignerError> {
        let secret = SecretKey::from_bytes(secret_key).map_err(|_| SignerError::InvalidSecretKey)?;
        let public = PublicKey::from(&secret);
        let address = Ed25519Address::from_public_key(public.as_bytes());
        self.keys.insert(address, Keypair { secret, public });
        Ok(address)
    }

    /// The number of keys held.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl AddressSigner for InMemoryAddressSigner {
    type Error = SignerError;

    fn sign(&self, address: &Address, message: &[u8]) -> Result<SignatureMaterial, Self::Error> {
        let key_hash = address
            .ed25519_key_hash()
            .ok_or_else(|| SignerError::UnsupportedAddress(address.kind()))?;
        let keypair = self
            .keys
            .get(key_hash)
            .ok_or(SignerError::UnknownAddress(*key_hash))?;
        Ok(SignatureMaterial {
            signature: keypair.sign(message).to_bytes().to_vec(),
            public_key: Some(keypair.public.to_bytes().to_vec()),
        })
    }
}
