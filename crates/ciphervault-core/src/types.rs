// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the vault, configuration, and CLI crates.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CipherVaultError;

/// Length in bytes of every symmetric key handled by the vault.
pub const KEY_LEN: usize = 32;

/// Lowest PBKDF2 iteration count a vault may be created or opened with.
pub const MIN_KDF_ITERATIONS: u32 = 100_000;

/// Authenticated-encryption algorithms a keystore can select as `current_algo`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
pub enum Algorithm {
    /// Self-contained AES-256-GCM token with an embedded creation time.
    #[strum(serialize = "aes256-gcm")]
    #[serde(rename = "aes256-gcm")]
    Aes256Gcm,
    /// ChaCha20-Poly1305 with a random 96-bit nonce prefix.
    #[strum(serialize = "chacha20-poly1305")]
    #[serde(rename = "chacha20-poly1305")]
    ChaCha20Poly1305,
}

impl Algorithm {
    /// Parse an identifier, reporting unknown names as [`CipherVaultError::UnknownAlgorithm`].
    pub fn parse(id: &str) -> Result<Self, CipherVaultError> {
        Self::from_str(id).map_err(|_| CipherVaultError::UnknownAlgorithm(id.to_string()))
    }
}

/// A 32-byte symmetric key that is zeroed when dropped.
///
/// Debug output never shows key material.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; KEY_LEN]);

impl SecretKey {
    /// Copy key material out of a fixed-size buffer.
    pub fn from_bytes(bytes: &[u8; KEY_LEN]) -> Self {
        Self(*bytes)
    }

    /// Copy key material out of a slice; `None` unless it is exactly [`KEY_LEN`] bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let array: &[u8; KEY_LEN] = bytes.try_into().ok()?;
        Some(Self::from_bytes(array))
    }

    /// Borrow the raw key bytes.
    pub fn expose(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        // Constant time over the full length.
        self.0
            .iter()
            .zip(other.0.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl Eq for SecretKey {}
