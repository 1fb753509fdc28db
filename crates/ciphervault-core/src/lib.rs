// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for CipherVault.
//!
//! This crate provides the error taxonomy, the shared algorithm and key
//! types, and the capability traits that the vault crate plugs its cipher
//! backends and rotation randomness into.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CipherVaultError;
pub use traits::{AlgorithmPicker, CipherBackend, OsRandomPicker};
pub use types::{Algorithm, KEY_LEN, MIN_KDF_ITERATIONS, SecretKey};
