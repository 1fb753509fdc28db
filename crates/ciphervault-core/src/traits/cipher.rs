// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authenticated-encryption backend trait.

use crate::error::CipherVaultError;
use crate::types::{Algorithm, SecretKey};

/// A text-in, text-out authenticated cipher keyed by a 32-byte [`SecretKey`].
///
/// Implementations must be non-deterministic (fresh nonce per call) and must
/// fail closed: tampered input or a wrong key yields
/// [`CipherVaultError::AuthenticationFailure`], never partial plaintext.
pub trait CipherBackend: Send + Sync {
    /// The identifier this backend is dispatched under.
    fn algorithm(&self) -> Algorithm;

    /// Encrypt `plaintext` and return a text-safe ciphertext.
    fn encrypt(&self, key: &SecretKey, plaintext: &[u8]) -> Result<String, CipherVaultError>;

    /// Decrypt a ciphertext previously produced by [`CipherBackend::encrypt`].
    fn decrypt(&self, key: &SecretKey, ciphertext: &str) -> Result<Vec<u8>, CipherVaultError>;
}
