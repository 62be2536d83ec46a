// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use packable::PackableExt;
use tracing::{debug, instrument, trace};

use super::{AddressSigner, SignatureMaterial, TransactionEssence, TransactionPayload};
use crate::types::{
    block::{
        address::Address,
        payload::IndexationPayload,
        signature::{Ed25519Signature, Signature},
        unlock::{Unlock, Unlocks},
        Input, Output,
    },
    codec::{CodecConfig, CodecExt},
    error::Error,
};

/// Sorts `items` by their encoding. Items with equal encodings keep their relative order.
pub(crate) fn canonical_order<T: PackableExt>(items: Vec<T>) -> Vec<T> {
    let mut keyed = items.into_iter().map(|item| (item.pack_to_vec(), item)).collect::<Vec<_>>();
    keyed.sort_by(|(a, _), (b, _)| a.cmp(b));
    keyed.into_iter().map(|(_, item)| item).collect()
}

/// Accumulates the parts of an unsigned transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionBuilder {
    network_id: u64,
    inputs: Vec<Input>,
    outputs: Vec<Output>,
    payload: Option<IndexationPayload>,
}

impl TransactionBuilder {
    /// Starts an empty transaction for the network with the given id.
    pub fn new(network_id: u64) -> Self {
        Self {
            network_id,
            ..Default::default()
        }
    }

    /// Adds an input.
    #[must_use]
    pub fn add_input(mut self, input: impl Into<Input>) -> Self {
        self.inputs.push(input.into());
        self
    }

    /// Adds an output.
    #[must_use]
    pub fn add_output(mut self, output: impl Into<Output>) -> Self {
        self.outputs.push(output.into());
        self
    }

    /// Sets the indexation payload, replacing any previous one.
    #[must_use]
    pub fn add_indexation_payload(mut self, payload: IndexationPayload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// The inputs in the order they were added or canonicalized.
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    #[allow(missing_docs)]
    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// Sorts inputs and outputs into the lexical order of their encodings.
    pub fn canonicalize(self) -> Self {
        Self {
            network_id: self.network_id,
            inputs: canonical_order(self.inputs),
            outputs: canonical_order(self.outputs),
            payload: self.payload,
        }
    }

    /// Canonicalizes the transaction and turns it into an essence. Nothing is validated yet.
    pub fn finish(self) -> TransactionEssence {
        let canonical = self.canonicalize();
        TransactionEssence {
            network_id: canonical.network_id,
            inputs: canonical.inputs.into_boxed_slice(),
            outputs: canonical.outputs.into_boxed_slice(),
            payload: canonical.payload.map(Into::into),
        }
    }
}

/// Builds a signed [`TransactionPayload`], producing one signature per distinct owner address.
///
/// Building consumes the builder.
#[derive(Clone, Debug, Default)]
pub struct SignedTransactionBuilder {
    transaction: TransactionBuilder,
    owners: HashMap<Input, Address>,
}

impl SignedTransactionBuilder {
    /// Starts an empty transaction for the network with the given id.
    pub fn new(network_id: u64) -> Self {
        Self {
            transaction: TransactionBuilder::new(network_id),
            owners: HashMap::new(),
        }
    }

    /// Adds an input that has to be unlocked by a signature of `owner`.
    #[must_use]
    pub fn add_input(mut self, input: impl Into<Input>, owner: impl Into<Address>) -> Self {
        let input = input.into();
        self.owners.insert(input, owner.into());
        self.transaction = self.transaction.add_input(input);
        self
    }

    /// Adds an output.
    #[must_use]
    pub fn add_output(mut self, output: impl Into<Output>) -> Self {
        self.transaction = self.transaction.add_output(output);
        self
    }

    /// Sets the indexation payload, replacing any previous one.
    #[must_use]
    pub fn add_indexation_payload(mut self, payload: IndexationPayload) -> Self {
        self.transaction = self.transaction.add_indexation_payload(payload);
        self
    }

    /// Canonicalizes the transaction, signs its encoding once per owner address and assembles the payload.
    ///
    /// The essence is encoded with all syntactic checks enabled; any failure aborts the build before the signer is
    /// called.
    #[instrument(skip_all, err, level = "trace")]
    pub fn build<S: AddressSigner>(self, signer: &S, config: &CodecConfig) -> Result<TransactionPayload, Error> {
        let essence = self.transaction.finish();
        let message = essence.pack_with(&config.clone().with_verify(true))?;

        let mut signature_positions = HashMap::<Address, u16>::new();
        let mut unlocks = Vec::with_capacity(essence.inputs.len());
        for (index, input) in essence.inputs.iter().enumerate() {
            let owner = self.owners.get(input).ok_or(Error::MissingInputOwner {
                output_id: *input.output_id(),
            })?;
            if let Some(&reference) = signature_positions.get(owner) {
                trace!(index, reference, "reusing signature unlock");
                unlocks.push(Unlock::reference(reference));
                continue;
            }

            let signature = sign_for(signer, owner, &message)?;
            let position = u16::try_from(index).map_err(|_| Error::InvalidCollectionCardinality {
                kind: TransactionEssence::INPUT_RULES.kind,
                count: essence.inputs.len(),
                min: TransactionEssence::INPUT_RULES.min,
                max: TransactionEssence::INPUT_RULES.max,
            })?;
            signature_positions.insert(*owner, position);
            unlocks.push(Unlock::signature(signature));
        }

        Ok(TransactionPayload::new(essence, Unlocks::new(unlocks)))
    }
}

fn sign_for<S: AddressSigner>(signer: &S, owner: &Address, message: &[u8]) -> Result<Signature, Error> {
    // Only addresses backed by an Ed25519 key have a signing strategy.
    if owner.ed25519_key_hash().is_none() {
        return Err(Error::UnimplementedSigningScheme { kind: owner.kind() });
    }
    debug!(address_kind = owner.kind(), "requesting signature");
    let SignatureMaterial { signature, public_key } = signer
        .sign(owner, message)
        .map_err(|e| Error::Signer(Box::new(e)))?;
    let public_key = public_key.ok_or(Error::MissingPublicKey { kind: owner.kind() })?;
    Ok(Signature::Ed25519(Ed25519Signature::new(
        fixed_length("ed25519 public key", &public_key)?,
        fixed_length("ed25519 signature", &signature)?,
    )))
}

fn fixed_length<const N: usize>(kind: &'static str, bytes: &[u8]) -> Result<[u8; N], Error> {
    <[u8; N]>::try_from(bytes).map_err(|_| Error::InvalidLength {
        kind,
        length: bytes.len(),
        min: N,
        max: N,
    })
}
