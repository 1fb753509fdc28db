// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for CipherVault.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Algorithm;

/// The primary error type used across the vault, configuration, and CLI crates.
#[derive(Debug, Error)]
pub enum CipherVaultError {
    /// Configuration errors (invalid TOML, out-of-range values).
    #[error("configuration error: {0}")]
    Config(String),

    /// The keystore envelope failed authentication under the derived master key.
    ///
    /// Fatal to the session. Never reinterpreted as an empty vault.
    #[error("master passphrase does not match the stored keystore")]
    WrongPassphrase,

    /// The keystore file exists but is not a readable envelope.
    #[error("keystore envelope is unreadable: {0}")]
    CorruptVault(String),

    /// The envelope carries a format version this build does not understand.
    #[error("unsupported keystore envelope version {version}")]
    UnsupportedEnvelope { version: u32 },

    /// The envelope authenticated, but its payload is not a keystore document.
    #[error("keystore document is corrupted: {0}")]
    CorruptKeystore(String),

    /// An algorithm identifier that is not supported by this build or configuration.
    #[error("unknown algorithm `{0}`")]
    UnknownAlgorithm(String),

    /// Ciphertext that cannot be decoded into the expected layout.
    #[error("invalid ciphertext: {0}")]
    InvalidCiphertext(String),

    /// Ciphertext decoded, but failed authentication (wrong key or tampering).
    #[error("{algorithm} decryption failed: invalid token or wrong key")]
    AuthenticationFailure { algorithm: Algorithm },

    /// No user or no usable key record for the named user.
    #[error("no key for user `{0}`")]
    MissingKeyOrUser(String),

    /// Rejected caller input (empty username, empty token, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Filesystem errors while reading or writing vault files.
    #[error("storage error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failures inside the cryptographic primitives (RNG, key construction).
    #[error("crypto error: {0}")]
    Crypto(String),
}

impl CipherVaultError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }
}
