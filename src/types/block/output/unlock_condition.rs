// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use packable::{error::UnpackError, packer::Packer, unpacker::Unpacker, Packable};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use crate::types::{
    block::address::{Address, AliasAddress},
    codec::CollectionRules,
    error::Error,
    util::{from_json_value, json_kind_u8, Tagged},
};

/// Defines the address that owns an output.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Packable)]
#[packable(unpack_error = Error)]
pub struct AddressUnlockCondition {
    /// The owner.
    pub address: Address,
}

/// Requires the consuming transaction to return `amount` to `return_address`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Packable)]
#[packable(unpack_error = Error)]
#[serde(rename_all = "camelCase")]
pub struct StorageDepositReturnUnlockCondition {
    /// Receives the returned deposit.
    pub return_address: Address,
    /// The amount that has to be returned.
    #[serde(with = "crate::types::util::stringify")]
    pub amount: u64,
}

/// Locks an output until a milestone index or a unix time is reached. Zero disables a criterion.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Packable)]
#[packable(unpack_error = Error)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct TimelockUnlockCondition {
    pub milestone_index: u32,
    pub unix_time: u32,
}

/// Hands an output over to `return_address` once a milestone index or a unix time is reached.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Packable)]
#[packable(unpack_error = Error)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct ExpirationUnlockCondition {
    pub return_address: Address,
    pub milestone_index: u32,
    pub unix_time: u32,
}

/// Defines the state controller of an alias.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Packable)]
#[packable(unpack_error = Error)]
pub struct StateControllerAddressUnlockCondition {
    /// Controls the state of the alias.
    pub address: Address,
}

/// Defines the governor of an alias.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Packable)]
#[packable(unpack_error = Error)]
pub struct GovernorAddressUnlockCondition {
    /// Governs the alias.
    pub address: Address,
}

/// Binds a foundry to the alias that controls it. The address can never change.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImmutableAliasAddressUnlockCondition {
    /// The controlling alias.
    #[serde(with = "alias_address")]
    pub address: AliasAddress,
}

fn unsupported_immutable_alias_address(discriminant: u8) -> Error {
    Error::UnsupportedTypeDiscriminant {
        kind: "immutable alias address",
        discriminant: discriminant as u32,
    }
}

// Written as a full address, only the alias kind may be read back.
impl Packable for ImmutableAliasAddressUnlockCondition {
    type UnpackError = Error;

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        Address::Alias(self.address).pack(packer)
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(
        unpacker: &mut U,
    ) -> Result<Self, UnpackError<Self::UnpackError, U::Error>> {
        match Address::unpack::<_, VERIFY>(unpacker)? {
            Address::Alias(address) => Ok(Self { address }),
            other => Err(UnpackError::Packable(unsupported_immutable_alias_address(other.kind()))),
        }
    }
}

/// The alias address is written as a full [`Address`] so that the JSON and binary shapes agree.
mod alias_address {
    use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

    use super::*;

    pub fn serialize<S: Serializer>(address: &AliasAddress, serializer: S) -> Result<S::Ok, S::Error> {
        Address::Alias(*address).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AliasAddress, D::Error> {
        match Address::deserialize(deserializer)? {
            Address::Alias(address) => Ok(address),
            other => Err(D::Error::custom(unsupported_immutable_alias_address(other.kind()))),
        }
    }
}

fn unsupported_unlock_condition_kind(discriminant: u8) -> Error {
    Error::UnsupportedTypeDiscriminant {
        kind: "unlock condition",
        discriminant: discriminant as u32,
    }
}

/// The different [`UnlockCondition`] variants.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Packable)]
#[packable(unpack_error = Error)]
#[packable(tag_type = u8, with_error = unsupported_unlock_condition_kind)]
#[allow(missing_docs)]
pub enum UnlockCondition {
    #[packable(tag = UnlockCondition::ADDRESS_KIND)]
    Address(AddressUnlockCondition),
    #[packable(tag = UnlockCondition::STORAGE_DEPOSIT_RETURN_KIND)]
    StorageDepositReturn(StorageDepositReturnUnlockCondition),
    #[packable(tag = UnlockCondition::TIMELOCK_KIND)]
    Timelock(TimelockUnlockCondition),
    #[packable(tag = UnlockCondition::EXPIRATION_KIND)]
    Expiration(ExpirationUnlockCondition),
    #[packable(tag = UnlockCondition::STATE_CONTROLLER_ADDRESS_KIND)]
    StateControllerAddress(StateControllerAddressUnlockCondition),
    #[packable(tag = UnlockCondition::GOVERNOR_ADDRESS_KIND)]
    GovernorAddress(GovernorAddressUnlockCondition),
    #[packable(tag = UnlockCondition::IMMUTABLE_ALIAS_ADDRESS_KIND)]
    ImmutableAliasAddress(ImmutableAliasAddressUnlockCondition),
}

#[allow(missing_docs)]
impl UnlockCondition {
    pub const ADDRESS_KIND: u8 = 0;
    pub const STORAGE_DEPOSIT_RETURN_KIND: u8 = 1;
    pub const TIMELOCK_KIND: u8 = 2;
    pub const EXPIRATION_KIND: u8 = 3;
    pub const STATE_CONTROLLER_ADDRESS_KIND: u8 = 4;
    pub const GOVERNOR_ADDRESS_KIND: u8 = 5;
    pub const IMMUTABLE_ALIAS_ADDRESS_KIND: u8 = 6;

    pub fn kind(&self) -> u8 {
        match self {
            Self::Address(_) => Self::ADDRESS_KIND,
            Self::StorageDepositReturn(_) => Self::STORAGE_DEPOSIT_RETURN_KIND,
            Self::Timelock(_) => Self::TIMELOCK_KIND,
            Self::Expiration(_) => Self::EXPIRATION_KIND,
            Self::StateControllerAddress(_) => Self::STATE_CONTROLLER_ADDRESS_KIND,
            Self::GovernorAddress(_) => Self::GOVERNOR_ADDRESS_KIND,
            Self::ImmutableAliasAddress(_) => Self::IMMUTABLE_ALIAS_ADDRESS_KIND,
        }
    }

    pub fn address(address: impl Into<Address>) -> Self {
        Self::Address(AddressUnlockCondition {
            address: address.into(),
        })
    }
}

impl Serialize for UnlockCondition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kind = self.kind();
        match self {
            Self::Address(c) => Tagged::new(kind, c).serialize(serializer),
            Self::StorageDepositReturn(c) => Tagged::new(kind, c).serialize(serializer),
            Self::Timelock(c) => Tagged::new(kind, c).serialize(serializer),
            Self::Expiration(c) => Tagged::new(kind, c).serialize(serializer),
            Self::StateControllerAddress(c) => Tagged::new(kind, c).serialize(serializer),
            Self::GovernorAddress(c) => Tagged::new(kind, c).serialize(serializer),
            Self::ImmutableAliasAddress(c) => Tagged::new(kind, c).serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for UnlockCondition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match json_kind_u8::<D::Error>("unlock condition", &value)? {
            Self::ADDRESS_KIND => Self::Address(from_json_value(value)?),
            Self::STORAGE_DEPOSIT_RETURN_KIND => Self::StorageDepositReturn(from_json_value(value)?),
            Self::TIMELOCK_KIND => Self::Timelock(from_json_value(value)?),
            Self::EXPIRATION_KIND => Self::Expiration(from_json_value(value)?),
            Self::STATE_CONTROLLER_ADDRESS_KIND => Self::StateControllerAddress(from_json_value(value)?),
            Self::GOVERNOR_ADDRESS_KIND => Self::GovernorAddress(from_json_value(value)?),
            Self::IMMUTABLE_ALIAS_ADDRESS_KIND => Self::ImmutableAliasAddress(from_json_value(value)?),
            discriminant => return Err(D::Error::custom(unsupported_unlock_condition_kind(discriminant))),
        })
    }
}

/// A set of unlock conditions. Which kinds are allowed depends on the output carrying them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnlockConditions(Box<[UnlockCondition]>);

#[allow(missing_docs)]
impl UnlockConditions {
    pub fn new(conditions: impl Into<Box<[UnlockCondition]>>) -> Self {
        Self(conditions.into())
    }

    /// Sorts the conditions into their canonical order.
    pub fn sorted(conditions: impl IntoIterator<Item = UnlockCondition>) -> Self {
        let mut conditions = conditions.into_iter().collect::<Vec<_>>();
        conditions.sort_by_key(UnlockCondition::kind);
        Self(conditions.into_boxed_slice())
    }

    /// Writes the conditions. They have to be checked with [`UnlockConditions::verify_with`] beforehand.
    pub fn pack_with_rules<P: Packer>(&self, packer: &mut P, rules: &CollectionRules) -> Result<(), P::Error> {
        rules.pack(&self.0, packer)
    }

    /// Reads conditions that satisfy `rules`.
    pub fn unpack_with_rules<U: Unpacker, const VERIFY: bool>(
        unpacker: &mut U,
        rules: &CollectionRules,
    ) -> Result<Self, UnpackError<Error, U::Error>> {
        rules.unpack::<_, _, VERIFY>(unpacker).map(Self)
    }

    /// Checks the conditions against `rules`.
    pub fn verify_with<const VERIFY: bool>(&self, rules: &CollectionRules) -> Result<(), Error> {
        rules.verify_with::<_, VERIFY>(&self.0)
    }

    /// Checks the kinds against the allowed ones.
    pub fn check_types(&self, rules: &CollectionRules) -> Result<(), Error> {
        rules.check_types(self.0.iter().map(UnlockCondition::kind))
    }

    pub fn address(&self) -> Option<&AddressUnlockCondition> {
        self.0.iter().find_map(|condition| match condition {
            UnlockCondition::Address(c) => Some(c),
            _ => None,
        })
    }

    pub fn storage_deposit_return(&self) -> Option<&StorageDepositReturnUnlockCondition> {
        self.0.iter().find_map(|condition| match condition {
            UnlockCondition::StorageDepositReturn(c) => Some(c),
            _ => None,
        })
    }

    pub fn timelock(&self) -> Option<&TimelockUnlockCondition> {
        self.0.iter().find_map(|condition| match condition {
            UnlockCondition::Timelock(c) => Some(c),
            _ => None,
        })
    }

    pub fn expiration(&self) -> Option<&ExpirationUnlockCondition> {
        self.0.iter().find_map(|condition| match condition {
            UnlockCondition::Expiration(c) => Some(c),
            _ => None,
        })
    }

    pub fn state_controller_address(&self) -> Option<&StateControllerAddressUnlockCondition> {
        self.0.iter().find_map(|condition| match condition {
            UnlockCondition::StateControllerAddress(c) => Some(c),
            _ => None,
        })
    }

    pub fn governor_address(&self) -> Option<&GovernorAddressUnlockCondition> {
        self.0.iter().find_map(|condition| match condition {
            UnlockCondition::GovernorAddress(c) => Some(c),
            _ => None,
        })
    }

    pub fn immutable_alias_address(&self) -> Option<&ImmutableAliasAddressUnlockCondition> {
        self.0.iter().find_map(|condition| match condition {
            UnlockCondition::ImmutableAliasAddress(c) => Some(c),
            _ => None,
        })
    }

    /// The conditions that are always present on the outputs using these rules. Fails if one is missing or if
    /// there are more conditions than the mandatory ones.
    pub(crate) fn require_exactly(&self, rules: &CollectionRules) -> Result<(), Error> {
        if self.0.len() != rules.must_occur.len() {
            return Err(Error::InvalidCollectionCardinality {
                kind: rules.kind,
                count: self.0.len(),
                min: rules.must_occur.len(),
                max: rules.must_occur.len(),
            });
        }
        for discriminant in rules.must_occur {
            if !self.0.iter().any(|c| c.kind() == *discriminant) {
                return Err(Error::MissingMandatoryElementType {
                    kind: rules.kind,
                    discriminant: *discriminant,
                });
            }
        }
        Ok(())
    }
}

impl std::ops::Deref for UnlockConditions {
    type Target = [UnlockCondition];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(feature = "rand")]
mod rand {
    use super::*;
    use crate::types::rand::{rand_number, rand_number_range};

    impl UnlockCondition {
        /// Generates a random address [`UnlockCondition`].
        pub fn rand_address() -> Self {
            Self::address(Address::rand_ed25519())
        }

        /// Generates a random storage deposit return [`UnlockCondition`].
        pub fn rand_storage_deposit_return() -> Self {
            Self::StorageDepositReturn(StorageDepositReturnUnlockCondition {
                return_address: Address::rand_ed25519(),
                amount: rand_number_range(1..1_000_000),
            })
        }

        /// Generates a random timelock [`UnlockCondition`].
        pub fn rand_timelock() -> Self {
            Self::Timelock(TimelockUnlockCondition {
                milestone_index: rand_number(),
                unix_time: rand_number(),
            })
        }

        /// Generates a random expiration [`UnlockCondition`].
        pub fn rand_expiration() -> Self {
            Self::Expiration(ExpirationUnlockCondition {
                return_address: Address::rand_ed25519(),
                milestone_index: rand_number(),
                unix_time: rand_number(),
            })
        }

        /// Generates a random state controller address [`UnlockCondition`].
        pub fn rand_state_controller_address() -> Self {
            Self::StateControllerAddress(StateControllerAddressUnlockCondition {
                address: Address::rand_ed25519(),
            })
        }

        /// Generates a random governor address [`UnlockCondition`].
        pub fn rand_governor_address() -> Self {
            Self::GovernorAddress(GovernorAddressUnlockCondition {
                address: Address::rand_ed25519(),
            })
        }

        /// Generates a random immutable alias address [`UnlockCondition`].
        pub fn rand_immutable_alias_address() -> Self {
            Self::ImmutableAliasAddress(ImmutableAliasAddressUnlockCondition {
                address: AliasAddress::rand(),
            })
        }
    }

    impl UnlockConditions {
        /// Generates random conditions for outputs owned by an address: the address condition and any subset of
        /// the optional ones.
        pub fn rand_with_address() -> Self {
            let mut conditions = vec![UnlockCondition::rand_address()];
            if rand_number::<bool>() {
                conditions.push(UnlockCondition::rand_storage_deposit_return());
            }
            if rand_number::<bool>() {
                conditions.push(UnlockCondition::rand_timelock());
            }
            if rand_number::<bool>() {
                conditions.push(UnlockCondition::rand_expiration());
            }
            Self::sorted(conditions)
        }
    }
}

#[cfg(all(test, feature = "rand"))]
mod test {
    use packable::PackableExt;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::types::codec::LengthPrefix;

    fn all_conditions() -> [UnlockCondition; 7] {
        [
            UnlockCondition::rand_address(),
            UnlockCondition::rand_storage_deposit_return(),
            UnlockCondition::rand_timelock(),
            UnlockCondition::rand_expiration(),
            UnlockCondition::rand_state_controller_address(),
            UnlockCondition::rand_governor_address(),
            UnlockCondition::rand_immutable_alias_address(),
        ]
    }

    #[test]
    fn test_unlock_condition_binary() {
        for condition in all_conditions() {
            let bytes = condition.pack_to_vec();
            assert_eq!(bytes[0], condition.kind());
            assert_eq!(UnlockCondition::unpack_verified(&bytes).unwrap(), condition);
        }
    }

    #[test]
    fn test_unlock_condition_json() {
        for condition in all_conditions() {
            let json = serde_json::to_value(&condition).unwrap();
            assert_eq!(json["type"], condition.kind());
            assert_eq!(serde_json::from_value::<UnlockCondition>(json).unwrap(), condition);
        }
    }

    #[test]
    fn immutable_alias_address_requires_alias() {
        let mut bytes = vec![UnlockCondition::IMMUTABLE_ALIAS_ADDRESS_KIND];
        bytes.extend(Address::rand_ed25519().pack_to_vec());
        assert!(matches!(
            UnlockCondition::unpack_verified(&bytes).map_err(Error::from),
            Err(Error::UnsupportedTypeDiscriminant { discriminant: 0, .. })
        ));

        let json = serde_json::json!({
            "type": 6,
            "address": serde_json::to_value(Address::rand_nft()).unwrap(),
        });
        assert!(serde_json::from_value::<UnlockCondition>(json).is_err());
    }

    #[test]
    fn condition_rules_run_when_unpacking() {
        const RULES: CollectionRules = CollectionRules::new("unlock condition", LengthPrefix::U8, 1, 4)
            .allowed_types(&[UnlockCondition::ADDRESS_KIND, UnlockCondition::TIMELOCK_KIND])
            .must_occur(&[UnlockCondition::ADDRESS_KIND])
            .lexical_order()
            .unique_types();

        let unsorted = UnlockConditions::new(vec![UnlockCondition::rand_timelock(), UnlockCondition::rand_address()]);
        let mut bytes = Vec::new();
        unsorted.pack_with_rules(&mut bytes, &RULES).unwrap();

        let mut unpacker = packable::unpacker::SliceUnpacker::new(&bytes);
        assert!(matches!(
            UnlockConditions::unpack_with_rules::<_, true>(&mut unpacker, &RULES),
            Err(UnpackError::Packable(Error::NonCanonicalOrdering { index: 1, .. }))
        ));
        let mut unpacker = packable::unpacker::SliceUnpacker::new(&bytes);
        assert_eq!(
            UnlockConditions::unpack_with_rules::<_, false>(&mut unpacker, &RULES).unwrap(),
            unsorted
        );
        assert!(unsorted.verify_with::<false>(&RULES).is_ok());
        assert!(UnlockConditions::sorted(unsorted.iter().copied())
            .verify_with::<true>(&RULES)
            .is_ok());
    }
}
