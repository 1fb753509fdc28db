// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase-sealed keystore for CipherVault.
//!
//! A master key derived from the passphrase (PBKDF2-HMAC-SHA256 over a
//! persisted salt) encrypts the whole keystore document at rest. Each
//! registered user holds an independent 32-byte key used with whichever
//! algorithm is currently active; rotation changes the algorithm, never the
//! keys.

pub mod audit;
pub mod cipher;
pub mod crypto;
pub mod document;
pub mod envelope;
pub mod kdf;
pub mod keys;
pub mod persist;
pub mod prompt;
pub mod registry;
pub mod rotation;
pub mod vault;

pub use audit::{AuditLog, DEFAULT_TAIL_LINES};
pub use cipher::{CipherDispatcher, Ciphertext};
pub use document::{KeystoreDocument, KeystoreSummary};
pub use envelope::UnlockOrigin;
pub use prompt::{get_passphrase, prompt_secret};
pub use rotation::RotationOutcome;
pub use vault::Vault;
