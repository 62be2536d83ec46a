// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use packable::PackableExt;
use tracing::{instrument, trace};

use super::NativeTokenSum;
use crate::types::{
    block::{
        output::{ChainId, ChainTransition, Output, OutputId, TreasuryOutput, UnlockCondition, UnlockConditions},
        payload::{TransactionId, TransactionPayload},
        signature::Signature,
        unlock::{IndexUnlock, Unlock},
        Address,
    },
    error::Error,
};

fn created_output_id(transaction_id: TransactionId, index: usize) -> Result<OutputId, Error> {
    let index = u16::try_from(index).map_err(|_| Error::OutputIndexOverflow { index })?;
    Ok(OutputId::new(transaction_id, index))
}

/// The outputs a transaction consumes and creates, indexed for the state transition checks.
#[derive(Clone, Debug)]
#[allow(missing_docs)]
pub struct WorkingSet<'a> {
    pub transaction: &'a TransactionPayload,
    pub transaction_id: TransactionId,
    /// The consumed outputs, in the order of the inputs.
    pub consumed: Vec<(OutputId, Output)>,
    pub input_chains: HashMap<ChainId, Output>,
    pub output_chains: HashMap<ChainId, Output>,
    pub in_native_token_sums: NativeTokenSum,
    pub out_native_token_sums: NativeTokenSum,
}

impl<'a> WorkingSet<'a> {
    /// Collects the working set. `consumed` holds the outputs referenced by the inputs, in input order.
    pub fn new(transaction: &'a TransactionPayload, consumed: Vec<(OutputId, Output)>) -> Result<Self, Error> {
        let inputs = &transaction.essence.inputs;
        if consumed.len() != inputs.len() {
            return Err(Error::ConsumedOutputMismatch {
                index: consumed.len().min(inputs.len()),
            });
        }
        if let Some(index) = inputs
            .iter()
            .zip(&consumed)
            .position(|(input, (output_id, _))| input.output_id() != output_id)
        {
            return Err(Error::ConsumedOutputMismatch { index });
        }

        let transaction_id = transaction.id();

        let mut input_chains = HashMap::new();
        let mut in_native_token_sums = NativeTokenSum::default();
        for (output_id, output) in &consumed {
            if let Some(chain_id) = output.chain_id(output_id) {
                input_chains.insert(chain_id, output.clone());
            }
            if let Some(native_tokens) = output.native_tokens() {
                in_native_token_sums.add_all(native_tokens)?;
            }
        }

        let mut output_chains = HashMap::new();
        let mut out_native_token_sums = NativeTokenSum::default();
        for (index, output) in transaction.essence.outputs.iter().enumerate() {
            if let Some(chain_id) = output.chain_id(&created_output_id(transaction_id, index)?) {
                output_chains.insert(chain_id, output.clone());
            }
            if let Some(native_tokens) = output.native_tokens() {
                out_native_token_sums.add_all(native_tokens)?;
            }
        }

        Ok(Self {
            transaction,
            transaction_id,
            consumed,
            input_chains,
            output_chains,
            in_native_token_sums,
            out_native_token_sums,
        })
    }

    /// The outputs created by the transaction, in order.
    pub fn transaction_outputs(&self) -> &[Output] {
        &self.transaction.essence.outputs
    }

    /// The address that has to unlock the consumed output at `index`.
    ///
    /// An alias is unlocked by its state controller when its state index moves on and by its governor otherwise,
    /// destruction included. A foundry is unlocked by its controlling alias.
    pub fn unlocking_address(&self, index: usize) -> Result<Address, Error> {
        let (output_id, output) = self
            .consumed
            .get(index)
            .ok_or(Error::ConsumedOutputMismatch { index })?;
        let address_condition = |conditions: &UnlockConditions| {
            conditions
                .address()
                .map(|condition| condition.address)
                .ok_or(Error::MissingMandatoryElementType {
                    kind: "unlock condition",
                    discriminant: UnlockCondition::ADDRESS_KIND,
                })
        };
        match output {
            Output::Simple(output) => Ok(output.address),
            Output::Basic(output) => address_condition(&output.unlock_conditions),
            Output::Nft(output) => address_condition(&output.unlock_conditions),
            Output::Alias(output) => match self.output_chains.get(&output.chain_id(output_id)) {
                Some(Output::Alias(next)) if next.state_index != output.state_index => {
                    Ok(output.state_controller_address_unlock_condition.address)
                }
                _ => Ok(output.governor_address_unlock_condition.address),
            },
            Output::Foundry(output) => Ok(Address::Alias(*output.alias_address())),
            Output::Treasury(_) => Err(Error::UnsupportedTypeDiscriminant {
                kind: "consumed output",
                discriminant: TreasuryOutput::KIND as u32,
            }),
        }
    }
}

/// The context in which the state transitions of a transaction are validated.
#[derive(Clone, Debug)]
pub struct SemanticValidationContext<'a> {
    /// The indexed inputs and outputs of the transaction.
    pub working_set: WorkingSet<'a>,
}

impl<'a> SemanticValidationContext<'a> {
    /// Creates the context from a transaction and the outputs its inputs consume.
    pub fn new(transaction: &'a TransactionPayload, consumed: Vec<(OutputId, Output)>) -> Result<Self, Error> {
        Ok(Self {
            working_set: WorkingSet::new(transaction, consumed)?,
        })
    }

    /// Checks that base tokens balance, that every input is unlocked by its owner and runs the state transition of
    /// every chain the transaction touches.
    #[instrument(skip_all, err, level = "trace")]
    pub fn validate(&self) -> Result<(), Error> {
        let working_set = &self.working_set;

        let input = working_set
            .consumed
            .iter()
            .map(|(_, output)| output.amount() as u128)
            .sum::<u128>();
        let output = working_set
            .transaction_outputs()
            .iter()
            .map(|output| output.amount() as u128)
            .sum::<u128>();
        if input != output {
            return Err(Error::AmountMismatch { input, output });
        }

        self.validate_unlocks()?;

        for (output_id, current) in &working_set.consumed {
            let chain_id = match current.chain_id(output_id) {
                Some(chain_id) => chain_id,
                None => continue,
            };
            let transition = match working_set.output_chains.get(&chain_id) {
                Some(next) => ChainTransition::StateChange { next },
                None => ChainTransition::Destroy,
            };
            current.transition(output_id, transition, self)?;
        }

        for (index, next) in working_set.transaction_outputs().iter().enumerate() {
            let output_id = created_output_id(working_set.transaction_id, index)?;
            match next.chain_id(&output_id) {
                Some(chain_id) if !working_set.input_chains.contains_key(&chain_id) => {
                    next.transition(&output_id, ChainTransition::Genesis, self)?;
                }
                _ => (),
            }
        }

        Ok(())
    }

    /// Checks every unlock against the owner of the input at the same index. Signatures have to be made by the
    /// owner over the essence, references have to point at an earlier signature of the same owner and alias or NFT
    /// unlocks at an earlier input that is the owning chain.
    fn validate_unlocks(&self) -> Result<(), Error> {
        let working_set = &self.working_set;
        let unlocks = &working_set.transaction.unlocks;
        if unlocks.len() != working_set.consumed.len() {
            return Err(Error::UnlockCountMismatch {
                inputs: working_set.consumed.len(),
                unlocks: unlocks.len(),
            });
        }
        let message = working_set.transaction.essence.pack_to_vec();

        for (index, unlock) in unlocks.iter().enumerate() {
            let owner = working_set.unlocking_address(index)?;
            let mismatch = || Error::UnlockOwnerMismatch { index, owner };
            match unlock {
                Unlock::Signature(unlock) => {
                    let Signature::Ed25519(signature) = &unlock.signature;
                    if owner.ed25519_key_hash() != Some(&signature.signer_address()) {
                        return Err(mismatch());
                    }
                    if !signature.is_valid_for(&message) {
                        return Err(Error::InvalidSignature { index });
                    }
                }
                Unlock::Reference(IndexUnlock { reference }) => {
                    let target = self.earlier_unlock(index, *reference)?;
                    match target {
                        Unlock::Signature(target) => {
                            let Signature::Ed25519(signature) = &target.signature;
                            if owner.ed25519_key_hash() != Some(&signature.signer_address()) {
                                return Err(mismatch());
                            }
                        }
                        _ => {
                            return Err(Error::InvalidUnlockReference {
                                index,
                                reference: *reference,
                            });
                        }
                    }
                }
                Unlock::Alias(IndexUnlock { reference }) => {
                    self.earlier_unlock(index, *reference)?;
                    let chain_id = self.consumed_chain_id(*reference);
                    match owner.as_alias() {
                        Some(address) if chain_id == Some(ChainId::Alias(address.alias_id)) => (),
                        _ => return Err(mismatch()),
                    }
                }
                Unlock::Nft(IndexUnlock { reference }) => {
                    self.earlier_unlock(index, *reference)?;
                    let chain_id = self.consumed_chain_id(*reference);
                    match owner.as_nft() {
                        Some(address) if chain_id == Some(ChainId::Nft(address.nft_id)) => (),
                        _ => return Err(mismatch()),
                    }
                }
            }
            trace!(index, kind = unlock.kind(), "input unlocked");
        }

        Ok(())
    }

    fn earlier_unlock(&self, index: usize, reference: u16) -> Result<&Unlock, Error> {
        let unlocks = &self.working_set.transaction.unlocks;
        match unlocks.get(reference as usize) {
            Some(unlock) if (reference as usize) < index => Ok(unlock),
            _ => Err(Error::InvalidUnlockReference { index, reference }),
        }
    }

    fn consumed_chain_id(&self, index: u16) -> Option<ChainId> {
        self.working_set
            .consumed
            .get(index as usize)
            .and_then(|(output_id, output)| output.chain_id(output_id))
    }
}

#[cfg(all(test, feature = "rand"))]
mod test {
    use pretty_assertions::assert_eq;
    use primitive_types::U256;

    use super::*;
    use crate::types::block::{
        address::{AliasAddress, NftAddress},
        output::{
            AliasId, AliasOutput, BasicOutput, FoundryOutput, GovernorAddressUnlockCondition, NativeToken,
            NativeTokens, NftOutput, SimpleOutput, StateControllerAddressUnlockCondition,
        },
        payload::{
            transaction::{AddressSigner, InMemoryAddressSigner},
            TransactionEssence,
        },
        signature::Ed25519Signature,
        unlock::Unlocks,
        Input,
    };

    fn keys() -> (InMemoryAddressSigner, [Address; 2]) {
        let mut signer = InMemoryAddressSigner::new();
        let first = signer.add_secret_key(&[1; 32]).unwrap();
        let second = signer.add_secret_key(&[2; 32]).unwrap();
        (signer, [first.into(), second.into()])
    }

    fn sign(signer: &InMemoryAddressSigner, owner: &Address, message: &[u8]) -> Signature {
        let material = signer.sign(owner, message).unwrap();
        Signature::Ed25519(Ed25519Signature::new(
            material.public_key.unwrap().try_into().unwrap(),
            material.signature.try_into().unwrap(),
        ))
    }

    fn unsigned(consumed: &[(OutputId, Output)], outputs: Vec<Output>) -> TransactionPayload {
        TransactionPayload::new(
            TransactionEssence {
                network_id: 0,
                inputs: consumed.iter().map(|(output_id, _)| Input::from(*output_id)).collect(),
                outputs: outputs.into_boxed_slice(),
                payload: None,
            },
            Unlocks::new(Vec::new()),
        )
    }

    fn with_unlocks(transaction: TransactionPayload, unlocks: Vec<Unlock>) -> TransactionPayload {
        TransactionPayload::new(transaction.essence, Unlocks::new(unlocks))
    }

    /// Unlocks every input the way its owner requires: one signature per key, references for repeated keys and
    /// chain unlocks for outputs owned by a consumed alias or NFT.
    fn transaction(consumed: &[(OutputId, Output)], outputs: Vec<Output>) -> TransactionPayload {
        let transaction = unsigned(consumed, outputs);
        let unlocks = unlock_all(&transaction, consumed);
        with_unlocks(transaction, unlocks)
    }

    fn unlock_all(transaction: &TransactionPayload, consumed: &[(OutputId, Output)]) -> Vec<Unlock> {
        let (signer, _) = keys();
        let message = transaction.essence.pack_to_vec();
        let working_set = WorkingSet::new(transaction, consumed.to_vec()).unwrap();
        let chain_position = |chain_id: ChainId| {
            consumed
                .iter()
                .position(|(output_id, output)| output.chain_id(output_id) == Some(chain_id))
                .expect("owning chain is consumed") as u16
        };

        let mut signed = HashMap::new();
        let mut unlocks = Vec::new();
        for index in 0..consumed.len() {
            let owner = working_set.unlocking_address(index).unwrap();
            let unlock = if let Some(address) = owner.as_alias() {
                Unlock::Alias(IndexUnlock {
                    reference: chain_position(ChainId::Alias(address.alias_id)),
                })
            } else if let Some(address) = owner.as_nft() {
                Unlock::Nft(IndexUnlock {
                    reference: chain_position(ChainId::Nft(address.nft_id)),
                })
            } else if let Some(&reference) = signed.get(&owner) {
                Unlock::reference(reference)
            } else {
                signed.insert(owner, index as u16);
                Unlock::signature(sign(&signer, &owner, &message))
            };
            unlocks.push(unlock);
        }
        unlocks
    }

    fn validate(consumed: Vec<(OutputId, Output)>, outputs: Vec<Output>) -> Result<(), Error> {
        let transaction = transaction(&consumed, outputs);
        SemanticValidationContext::new(&transaction, consumed)?.validate()
    }

    /// An alias template controlled by the first key and governed by the second.
    fn template() -> AliasOutput {
        let (_, [controller, governor]) = keys();
        AliasOutput {
            state_controller_address_unlock_condition: StateControllerAddressUnlockCondition { address: controller },
            governor_address_unlock_condition: GovernorAddressUnlockCondition { address: governor },
            ..AliasOutput::rand()
        }
    }

    fn alias(template: &AliasOutput, amount: u64, state_index: u32, foundry_counter: u32) -> AliasOutput {
        AliasOutput {
            amount,
            native_tokens: NativeTokens::default(),
            state_index,
            foundry_counter,
            ..template.clone()
        }
    }

    fn simple(address: Address, amount: u64) -> Output {
        Output::Simple(SimpleOutput { address, amount })
    }

    /// A freshly minted foundry that holds its whole circulating supply.
    fn foundry(alias_id: AliasId, serial_number: u32) -> FoundryOutput {
        let mut foundry = FoundryOutput::rand_for_alias(AliasAddress::new(alias_id), serial_number);
        foundry.amount = 1_000_000;
        foundry.circulating_supply = U256::from(100u64);
        foundry.maximum_supply = U256::from(1000u64);
        foundry.native_tokens = NativeTokens::new(vec![NativeToken::new(
            foundry.native_token_id(),
            foundry.circulating_supply,
        )]);
        foundry
    }

    fn mint(serials: &[u32]) -> Result<(), Error> {
        let template = template();
        let count = serials.len() as u32;
        let consumed = vec![(
            OutputId::rand(),
            Output::Alias(alias(&template, 1_000_000 * (count as u64 + 1), 4, 0)),
        )];
        let mut outputs = vec![Output::Alias(alias(&template, 1_000_000, 5, count))];
        outputs.extend(
            serials
                .iter()
                .map(|serial| Output::Foundry(foundry(template.alias_id, *serial))),
        );
        validate(consumed, outputs)
    }

    #[test]
    fn foundries_minted_in_order() {
        mint(&[1, 2, 3]).unwrap();
    }

    #[test]
    fn foundries_minted_out_of_order() {
        assert!(matches!(
            mint(&[3, 1, 2]),
            Err(Error::SerialNumberOutOfOrder { index: 1, .. })
        ));
    }

    #[test]
    fn foundry_serial_beyond_counter() {
        let template = template();
        let consumed = vec![(OutputId::rand(), Output::Alias(alias(&template, 2_000_000, 0, 0)))];
        let outputs = vec![
            Output::Alias(alias(&template, 1_000_000, 1, 1)),
            Output::Foundry(foundry(template.alias_id, 2)),
        ];
        assert!(matches!(
            validate(consumed, outputs),
            Err(Error::SerialNumberOutOfRange { .. })
        ));
    }

    #[test]
    fn foundry_serial_equal_to_previous_counter() {
        let template = template();
        let consumed = vec![(OutputId::rand(), Output::Alias(alias(&template, 2_000_000, 0, 2)))];
        let outputs = vec![
            Output::Alias(alias(&template, 1_000_000, 1, 3)),
            Output::Foundry(foundry(template.alias_id, 2)),
        ];
        assert!(matches!(
            validate(consumed, outputs),
            Err(Error::SerialNumberOutOfRange {
                serial_number: 2,
                start: 2,
                end: 3,
                ..
            })
        ));
    }

    #[test]
    fn foundry_genesis_mints_its_circulating_supply() {
        let template = template();
        let mut minted = foundry(template.alias_id, 1);
        minted.native_tokens = NativeTokens::new(vec![NativeToken::new(minted.native_token_id(), U256::from(99u64))]);
        let consumed = vec![(OutputId::rand(), Output::Alias(alias(&template, 2_000_000, 0, 0)))];
        let outputs = vec![
            Output::Alias(alias(&template, 1_000_000, 1, 1)),
            Output::Foundry(minted),
        ];
        assert!(matches!(
            validate(consumed, outputs),
            Err(Error::NativeTokenSupplyMismatch { .. })
        ));
    }

    #[test]
    fn foundry_without_alias_transition() {
        let template = template();
        let consumed = vec![(OutputId::rand(), Output::Alias(alias(&template, 2_000_000, 0, 0)))];
        let outputs = vec![
            Output::Foundry(foundry(template.alias_id, 1)),
            simple(Address::rand_ed25519(), 1_000_000),
        ];
        assert!(matches!(
            validate(consumed, outputs),
            Err(Error::MissingTransitioningChainOutput { side: "output", .. })
        ));
    }

    /// Consumes an alias and one of its foundries with a circulating supply of 100, none of it held by the foundry.
    fn foundry_inputs(template: &AliasOutput) -> (Vec<(OutputId, Output)>, FoundryOutput) {
        let mut current = foundry(template.alias_id, 1);
        current.native_tokens = NativeTokens::default();
        let consumed = vec![
            (OutputId::rand(), Output::Alias(alias(template, 1_000_000, 3, 1))),
            (OutputId::rand(), Output::Foundry(current.clone())),
        ];
        (consumed, current)
    }

    fn change_supply(update: impl FnOnce(&mut FoundryOutput)) -> Result<(), Error> {
        let template = template();
        let (consumed, current) = foundry_inputs(&template);
        let mut next = current;
        update(&mut next);
        let outputs = vec![
            Output::Alias(alias(&template, 1_000_000, 4, 1)),
            Output::Foundry(next),
        ];
        validate(consumed, outputs)
    }

    #[test]
    fn foundry_mints_more_tokens() {
        change_supply(|next| {
            next.circulating_supply = U256::from(150u64);
            next.native_tokens = NativeTokens::new(vec![NativeToken::new(next.native_token_id(), U256::from(50u64))]);
        })
        .unwrap();
    }

    #[test]
    fn foundry_supply_without_tokens() {
        assert!(matches!(
            change_supply(|next| next.circulating_supply = U256::from(150u64)),
            Err(Error::NativeTokenSupplyMismatch { .. })
        ));
    }

    #[test]
    fn foundry_maximum_supply_is_immutable() {
        assert!(matches!(
            change_supply(|next| next.maximum_supply = U256::from(2000u64)),
            Err(Error::ImmutableFieldMutated {
                field: "maximum supply"
            })
        ));
    }

    fn destroy_foundry(held: u64) -> Result<(), Error> {
        let template = template();
        let (mut consumed, mut current) = foundry_inputs(&template);
        if held > 0 {
            current.native_tokens =
                NativeTokens::new(vec![NativeToken::new(current.native_token_id(), U256::from(held))]);
            consumed[1].1 = Output::Foundry(current.clone());
        }
        let outputs = vec![
            Output::Alias(alias(&template, 1_000_000, 4, 1)),
            simple(Address::rand_ed25519(), current.amount),
        ];
        validate(consumed, outputs)
    }

    #[test]
    fn destroyed_foundry_burns_its_supply() {
        destroy_foundry(100).unwrap();
    }

    #[test]
    fn destroyed_foundry_without_burning() {
        assert!(matches!(
            destroy_foundry(0),
            Err(Error::NativeTokenSupplyMismatch { .. })
        ));
    }

    #[test]
    fn foundry_cannot_become_another_output() {
        let template = template();
        let (consumed, current) = foundry_inputs(&template);
        let next = simple(Address::rand_ed25519(), current.amount);
        let transaction = transaction(&consumed, vec![next.clone()]);
        let context = SemanticValidationContext::new(&transaction, consumed.clone()).unwrap();
        assert!(matches!(
            Output::Foundry(current).transition(
                &consumed[1].0,
                ChainTransition::StateChange { next: &next },
                &context
            ),
            Err(Error::InvalidChainStateTransition { .. })
        ));
    }

    #[test]
    fn alias_genesis_error_names_the_new_alias() {
        let (_, [owner, _]) = keys();
        let consumed = vec![(OutputId::rand(), simple(owner, 2_000_000))];
        let created = AliasOutput {
            alias_id: AliasId::null(),
            ..alias(&template(), 2_000_000, 1, 0)
        };
        let transaction = transaction(&consumed, vec![Output::Alias(created)]);
        let expected = ChainId::Alias(AliasId::from_output_id(&OutputId::new(transaction.id(), 0)));
        let context = SemanticValidationContext::new(&transaction, consumed).unwrap();
        match context.validate() {
            Err(Error::InvalidChainStateTransition { chain_id, .. }) => assert_eq!(chain_id, expected),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn base_tokens_must_balance() {
        let template = template();
        let consumed = vec![(OutputId::rand(), Output::Alias(alias(&template, 2_000_000, 0, 0)))];
        assert!(matches!(
            validate(consumed, vec![Output::Alias(alias(&template, 1_999_999, 0, 0))]),
            Err(Error::AmountMismatch {
                input: 2_000_000,
                output: 1_999_999
            })
        ));
    }

    #[test]
    fn consumed_outputs_follow_inputs() {
        let consumed = vec![(OutputId::rand(), Output::rand_simple())];
        let transaction = unsigned(&consumed, vec![Output::rand_simple()]);
        let foreign = vec![(OutputId::rand(), consumed[0].1.clone())];
        assert!(matches!(
            WorkingSet::new(&transaction, foreign),
            Err(Error::ConsumedOutputMismatch { index: 0 })
        ));
        assert!(matches!(
            WorkingSet::new(&transaction, Vec::new()),
            Err(Error::ConsumedOutputMismatch { index: 0 })
        ));
    }

    #[test]
    fn output_index_beyond_u16_is_rejected() {
        let consumed = vec![(OutputId::rand(), Output::rand_simple())];
        let outputs = vec![Output::rand_simple(); u16::MAX as usize + 2];
        let transaction = unsigned(&consumed, outputs);
        assert!(matches!(
            WorkingSet::new(&transaction, consumed),
            Err(Error::OutputIndexOverflow { index: 65_536 })
        ));
    }

    fn two_owners() -> (InMemoryAddressSigner, [Address; 2], TransactionPayload, Vec<(OutputId, Output)>) {
        let (signer, owners) = keys();
        let consumed = vec![
            (OutputId::rand(), simple(owners[0], 1_000_000)),
            (OutputId::rand(), simple(owners[1], 1_000_000)),
        ];
        let transaction = unsigned(&consumed, vec![simple(owners[0], 2_000_000)]);
        (signer, owners, transaction, consumed)
    }

    #[test]
    fn properly_signed_inputs_unlock() {
        let (signer, owners, transaction, consumed) = two_owners();
        let message = transaction.essence.pack_to_vec();
        let unlocks = owners
            .iter()
            .map(|owner| Unlock::signature(sign(&signer, owner, &message)))
            .collect();
        let transaction = with_unlocks(transaction, unlocks);
        SemanticValidationContext::new(&transaction, consumed)
            .unwrap()
            .validate()
            .unwrap();
    }

    #[test]
    fn reference_to_another_owner_is_rejected() {
        let (signer, owners, transaction, consumed) = two_owners();
        let message = transaction.essence.pack_to_vec();
        let unlocks = vec![Unlock::signature(sign(&signer, &owners[0], &message)), Unlock::reference(0)];
        let transaction = with_unlocks(transaction, unlocks);
        let context = SemanticValidationContext::new(&transaction, consumed).unwrap();
        match context.validate() {
            Err(Error::UnlockOwnerMismatch { index: 1, owner }) => assert_eq!(owner, owners[1]),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn signature_of_another_key_is_rejected() {
        let (signer, owners, transaction, consumed) = two_owners();
        let message = transaction.essence.pack_to_vec();
        let unlocks = vec![
            Unlock::signature(sign(&signer, &owners[1], &message)),
            Unlock::signature(sign(&signer, &owners[0], &message)),
        ];
        let transaction = with_unlocks(transaction, unlocks);
        let context = SemanticValidationContext::new(&transaction, consumed).unwrap();
        assert!(matches!(
            context.validate(),
            Err(Error::UnlockOwnerMismatch { index: 0, .. })
        ));
    }

    #[test]
    fn forged_signature_is_rejected() {
        let (signer, owners, transaction, consumed) = two_owners();
        let message = transaction.essence.pack_to_vec();
        let unlocks = vec![
            Unlock::signature(sign(&signer, &owners[0], b"another essence")),
            Unlock::signature(sign(&signer, &owners[1], &message)),
        ];
        let transaction = with_unlocks(transaction, unlocks);
        let context = SemanticValidationContext::new(&transaction, consumed).unwrap();
        assert!(matches!(context.validate(), Err(Error::InvalidSignature { index: 0 })));
    }

    #[test]
    fn governance_transition_needs_the_governor() {
        let (signer, [controller, governor]) = keys();
        let template = template();
        let consumed = vec![(OutputId::rand(), Output::Alias(alias(&template, 1_000_000, 2, 0)))];
        let transaction = unsigned(&consumed, vec![Output::Alias(alias(&template, 1_000_000, 2, 0))]);
        let message = transaction.essence.pack_to_vec();
        let transaction = with_unlocks(
            transaction,
            vec![Unlock::signature(sign(&signer, &controller, &message))],
        );
        let context = SemanticValidationContext::new(&transaction, consumed.clone()).unwrap();
        match context.validate() {
            Err(Error::UnlockOwnerMismatch { index: 0, owner }) => assert_eq!(owner, governor),
            other => panic!("unexpected result {other:?}"),
        }

        validate(consumed, vec![Output::Alias(alias(&template, 1_000_000, 2, 0))]).unwrap();
    }

    #[test]
    fn nft_owned_output_needs_the_nft_unlock() {
        let (_, [owner, _]) = keys();
        let nft = NftOutput {
            native_tokens: NativeTokens::default(),
            unlock_conditions: UnlockConditions::new(vec![UnlockCondition::address(owner)]),
            ..NftOutput::rand()
        };
        let nft_id = nft.nft_id;
        let basic = BasicOutput {
            native_tokens: NativeTokens::default(),
            unlock_conditions: UnlockConditions::new(vec![UnlockCondition::address(NftAddress::new(nft_id))]),
            ..BasicOutput::rand()
        };
        let total = nft.amount + basic.amount;
        let consumed = vec![
            (OutputId::rand(), Output::Nft(nft)),
            (OutputId::rand(), Output::Basic(basic)),
        ];
        let outputs = vec![simple(owner, total)];
        validate(consumed.clone(), outputs.clone()).unwrap();

        let signed = transaction(&consumed, outputs);
        let mut unlocks = signed.unlocks.to_vec();
        assert_eq!(unlocks[1], Unlock::Nft(IndexUnlock { reference: 0 }));
        unlocks[1] = Unlock::Alias(IndexUnlock { reference: 0 });
        let transaction = with_unlocks(signed, unlocks);
        let context = SemanticValidationContext::new(&transaction, consumed).unwrap();
        assert!(matches!(
            context.validate(),
            Err(Error::UnlockOwnerMismatch { index: 1, .. })
        ));
    }
}
