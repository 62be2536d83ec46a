// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Random value helpers backing the `rand()` generators of the ledger types.

use std::ops::Range;

use rand::{
    distributions::{uniform::SampleUniform, Distribution, Standard},
    Rng,
};

/// Generates a random number.
pub fn rand_number<T>() -> T
where
    Standard: Distribution<T>,
{
    rand::random()
}

/// Generates a random number within a range.
pub fn rand_number_range<T: SampleUniform + PartialOrd>(range: Range<T>) -> T {
    rand::thread_rng().gen_range(range)
}

/// Generates a random boolean.
pub fn rand_bool() -> bool {
    rand::random()
}

/// Generates a random byte array.
pub fn rand_bytes_array<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    rand::thread_rng().fill(&mut bytes[..]);
    bytes
}

/// Generates a random byte vector of the given length.
pub fn rand_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill(&mut bytes[..]);
    bytes
}
