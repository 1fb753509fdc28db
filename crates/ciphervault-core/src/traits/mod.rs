// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits at the seams of the vault.
//!
//! Cipher backends and the rotation randomness source are both injected,
//! so tests can substitute deterministic implementations.

pub mod cipher;
pub mod picker;

pub use cipher::CipherBackend;
pub use picker::{AlgorithmPicker, OsRandomPicker};
