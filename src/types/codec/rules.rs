// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;

use packable::{error::UnpackError, packer::Packer, unpacker::Unpacker, Packable, PackableExt};

use super::LengthPrefix;
use crate::types::error::Error;

/// Declarative constraints on a collection of encoded elements.
///
/// The type of an element is the first byte of its encoding. Lexical order compares the full encodings.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CollectionRules {
    /// Names the elements in errors.
    pub kind: &'static str,
    /// The width of the element count.
    pub prefix: LengthPrefix,
    /// The least number of elements.
    pub min: usize,
    /// The largest number of elements.
    pub max: usize,
    /// Restricts which element types may appear. `None` means any type the family can decode.
    pub allowed_types: Option<&'static [u8]>,
    /// Types that have to be present.
    pub must_occur: &'static [u8],
    /// Elements have to be sorted by their encoding.
    pub lexical_order: bool,
    /// No two elements may have the same encoding.
    pub no_duplicates: bool,
    /// Every type may occur at most once.
    pub unique_types: bool,
}

impl CollectionRules {
    /// Rules that only bound the cardinality.
    pub const fn new(kind: &'static str, prefix: LengthPrefix, min: usize, max: usize) -> Self {
        Self {
            kind,
            prefix,
            min,
            max,
            allowed_types: None,
            must_occur: &[],
            lexical_order: false,
            no_duplicates: false,
            unique_types: false,
        }
    }

    /// Restricts the element types.
    pub const fn allowed_types(mut self, types: &'static [u8]) -> Self {
        self.allowed_types = Some(types);
        self
    }

    /// Requires the given types to be present.
    pub const fn must_occur(mut self, types: &'static [u8]) -> Self {
        self.must_occur = types;
        self
    }

    /// Requires the elements to be sorted by their encoding.
    pub const fn lexical_order(mut self) -> Self {
        self.lexical_order = true;
        self
    }

    /// Forbids repeated elements.
    pub const fn no_duplicates(mut self) -> Self {
        self.no_duplicates = true;
        self
    }

    /// Allows every type at most once.
    pub const fn unique_types(mut self) -> Self {
        self.unique_types = true;
        self
    }

    /// Checks a single discriminant against the allowed types.
    pub fn check_type(&self, discriminant: u8) -> Result<(), Error> {
        match self.allowed_types {
            Some(types) if !types.contains(&discriminant) => Err(Error::UnsupportedTypeDiscriminant {
                kind: self.kind,
                discriminant: discriminant as u32,
            }),
            _ => Ok(()),
        }
    }

    /// Checks every discriminant against the allowed types.
    pub fn check_types(&self, discriminants: impl IntoIterator<Item = u8>) -> Result<(), Error> {
        discriminants.into_iter().try_for_each(|d| self.check_type(d))
    }

    /// Checks the element count against the bounds.
    pub fn check_cardinality(&self, count: usize) -> Result<(), Error> {
        if count < self.min || count > self.max {
            return Err(Error::InvalidCollectionCardinality {
                kind: self.kind,
                count,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    /// Runs every rule against the encoded elements.
    pub fn validate<B: AsRef<[u8]>>(&self, encoded: &[B]) -> Result<(), Error> {
        self.check_cardinality(encoded.len())?;

        let mut seen_types = HashSet::new();
        for (index, element) in encoded.iter().map(AsRef::as_ref).enumerate() {
            let discriminant = element.first().copied();
            if let Some(discriminant) = discriminant {
                self.check_type(discriminant)?;
                if self.unique_types && !seen_types.insert(discriminant) {
                    return Err(Error::DuplicateElementType {
                        kind: self.kind,
                        discriminant,
                    });
                }
            }
            if index == 0 {
                continue;
            }
            let previous = encoded[index - 1].as_ref();
            if self.lexical_order {
                match previous.cmp(element) {
                    std::cmp::Ordering::Less => (),
                    std::cmp::Ordering::Equal => return Err(Error::DuplicateElement { kind: self.kind, index }),
                    std::cmp::Ordering::Greater => {
                        return Err(Error::NonCanonicalOrdering { kind: self.kind, index });
                    }
                }
            }
        }

        if self.no_duplicates && !self.lexical_order {
            let mut seen = HashSet::new();
            for (index, element) in encoded.iter().map(AsRef::as_ref).enumerate() {
                if !seen.insert(element) {
                    return Err(Error::DuplicateElement { kind: self.kind, index });
                }
            }
        }

        if !self.must_occur.is_empty() {
            let present = encoded
                .iter()
                .filter_map(|e| e.as_ref().first().copied())
                .collect::<HashSet<_>>();
            if let Some(&discriminant) = self.must_occur.iter().find(|d| !present.contains(d)) {
                return Err(Error::MissingMandatoryElementType {
                    kind: self.kind,
                    discriminant,
                });
            }
        }

        Ok(())
    }
}

impl CollectionRules {
    /// Writes the element count followed by the elements. The count has to be checked with
    /// [`CollectionRules::verify_with`] beforehand.
    pub fn pack<T: Packable, P: Packer>(&self, elements: &[T], packer: &mut P) -> Result<(), P::Error> {
        self.prefix.pack_length(elements.len(), packer)?;
        elements.iter().try_for_each(|element| element.pack(packer))
    }

    /// Reads a collection. With `VERIFY` the cardinality is checked before any element is read.
    pub fn unpack<T, U, const VERIFY: bool>(&self, unpacker: &mut U) -> Result<Box<[T]>, UnpackError<Error, U::Error>>
    where
        T: Packable<UnpackError = Error>,
        U: Unpacker,
    {
        let count = self.prefix.unpack_length::<_, VERIFY>(unpacker)?;
        if VERIFY {
            self.check_cardinality(count).map_err(UnpackError::Packable)?;
        }
        let elements = (0..count)
            .map(|_| T::unpack::<_, VERIFY>(unpacker))
            .collect::<Result<Box<[T]>, _>>()?;
        self.verify_with::<_, VERIFY>(&elements)
            .map_err(UnpackError::Packable)?;
        Ok(elements)
    }

    /// Checks `elements` against the rules. Without `VERIFY` only the allowed types and the prefix bound are
    /// checked.
    pub fn verify_with<T: Packable, const VERIFY: bool>(&self, elements: &[T]) -> Result<(), Error> {
        let encoded = elements.iter().map(PackableExt::pack_to_vec).collect::<Vec<_>>();
        if VERIFY {
            self.validate(&encoded)
        } else {
            if encoded.len() > self.prefix.max() {
                return Err(Error::InvalidCollectionCardinality {
                    kind: self.kind,
                    count: encoded.len(),
                    min: 0,
                    max: self.prefix.max(),
                });
            }
            self.check_types(encoded.iter().filter_map(|bytes| bytes.first().copied()))
        }
    }
}

#[cfg(test)]
mod test {
    use packable::unpacker::SliceUnpacker;

    use super::*;

    const RULES: CollectionRules = CollectionRules::new("element", LengthPrefix::U8, 1, 3)
        .allowed_types(&[0, 1, 2])
        .must_occur(&[0])
        .lexical_order()
        .no_duplicates()
        .unique_types();

    #[test]
    fn accepts_sorted_elements() {
        assert!(RULES.validate(&[vec![0u8, 9], vec![1, 0], vec![2]]).is_ok());
    }

    #[test]
    fn rejects_cardinality() {
        assert!(matches!(
            RULES.validate::<Vec<u8>>(&[]),
            Err(Error::InvalidCollectionCardinality { count: 0, .. })
        ));
        assert!(matches!(
            RULES.validate(&[vec![0u8], vec![1], vec![2], vec![3]]),
            Err(Error::InvalidCollectionCardinality { count: 4, .. })
        ));
    }

    #[test]
    fn rejects_unsorted_elements() {
        assert!(matches!(
            RULES.validate(&[vec![1u8], vec![0]]),
            Err(Error::NonCanonicalOrdering { index: 1, .. })
        ));
    }

    #[test]
    fn rejects_duplicate_types() {
        assert!(matches!(
            RULES.validate(&[vec![0u8, 1], vec![0, 2]]),
            Err(Error::DuplicateElementType { discriminant: 0, .. })
        ));
    }

    #[test]
    fn rejects_duplicates_without_order() {
        let rules = CollectionRules::new("element", LengthPrefix::U8, 0, 4).no_duplicates();
        assert!(matches!(
            rules.validate(&[vec![3u8], vec![1], vec![3]]),
            Err(Error::DuplicateElement { index: 2, .. })
        ));
    }

    #[test]
    fn rejects_missing_mandatory_type() {
        assert!(matches!(
            RULES.validate(&[vec![1u8], vec![2]]),
            Err(Error::MissingMandatoryElementType { discriminant: 0, .. })
        ));
    }

    #[test]
    fn rejects_disallowed_type() {
        assert!(matches!(
            RULES.validate(&[vec![0u8], vec![7]]),
            Err(Error::UnsupportedTypeDiscriminant { discriminant: 7, .. })
        ));
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Packable)]
    #[packable(unpack_error = Error)]
    struct Element {
        kind: u8,
        value: u8,
    }

    fn elements(pairs: &[(u8, u8)]) -> Vec<Element> {
        pairs.iter().map(|&(kind, value)| Element { kind, value }).collect()
    }

    #[test]
    fn collection_round_trip() {
        let elements = elements(&[(0, 9), (1, 0), (2, 4)]);
        let mut bytes = Vec::new();
        RULES.pack(&elements, &mut bytes).unwrap();
        assert_eq!(bytes, vec![3, 0, 9, 1, 0, 2, 4]);

        let mut unpacker = SliceUnpacker::new(&bytes);
        let unpacked = RULES.unpack::<Element, _, true>(&mut unpacker).unwrap();
        assert_eq!(&*unpacked, elements.as_slice());
    }

    #[test]
    fn unsorted_collection_fails_only_when_verified() {
        let elements = elements(&[(1, 0), (0, 1)]);
        let mut bytes = Vec::new();
        RULES.pack(&elements, &mut bytes).unwrap();

        let mut unpacker = SliceUnpacker::new(&bytes);
        assert!(matches!(
            RULES.unpack::<Element, _, true>(&mut unpacker),
            Err(UnpackError::Packable(Error::NonCanonicalOrdering { index: 1, .. }))
        ));
        let mut unpacker = SliceUnpacker::new(&bytes);
        assert!(RULES.unpack::<Element, _, false>(&mut unpacker).is_ok());
    }

    #[test]
    fn cardinality_is_checked_before_elements() {
        let mut unpacker = SliceUnpacker::new(&[9u8]);
        assert!(matches!(
            RULES.unpack::<Element, _, true>(&mut unpacker),
            Err(UnpackError::Packable(Error::InvalidCollectionCardinality { count: 9, .. }))
        ));
    }

    #[test]
    fn disallowed_type_fails_even_unverified() {
        let elements = elements(&[(0, 0), (7, 0)]);
        assert!(RULES.verify_with::<_, false>(&elements[..1]).is_ok());
        assert!(matches!(
            RULES.verify_with::<_, false>(&elements),
            Err(Error::UnsupportedTypeDiscriminant { discriminant: 7, .. })
        ));
    }
}
