// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Randomness source for algorithm rotation.

use rand::rngs::OsRng;
use rand::seq::SliceRandom;

use crate::types::Algorithm;

/// Chooses the next algorithm during a rotation.
pub trait AlgorithmPicker {
    /// Pick one of `candidates`, or `None` if the slice is empty.
    fn pick(&mut self, candidates: &[Algorithm]) -> Option<Algorithm>;
}

/// Uniform choice backed by the operating system CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandomPicker;

impl AlgorithmPicker for OsRandomPicker {
    fn pick(&mut self, candidates: &[Algorithm]) -> Option<Algorithm> {
        candidates.choose(&mut OsRng).copied()
    }
}
