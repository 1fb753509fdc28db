// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for CipherVault.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::{Path, PathBuf};

use ciphervault_core::Algorithm;
use serde::{Deserialize, Serialize};

/// File name of the encrypted keystore envelope inside `data_dir`.
pub const KEYSTORE_FILE: &str = "keystore.json";

/// File name of the persisted KDF salt inside `data_dir`.
pub const SALT_FILE: &str = "salt.bin";

/// File name of the KDF parameters pinned when the vault is created.
pub const KDF_PARAMS_FILE: &str = "kdf.json";

/// File name of the append-only audit log inside `data_dir`.
pub const AUDIT_FILE: &str = "audit.log";

/// Top-level CipherVault configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CipherVaultConfig {
    /// Keystore location, key derivation, and algorithm settings.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Diagnostic logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Vault storage and cryptography configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Directory holding the keystore, salt, audit log, and ciphertext files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// PBKDF2-HMAC-SHA256 iteration count for a new vault. An existing
    /// vault keeps the count it was created with.
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Supported algorithms, in preference order. The first entry is the
    /// initial `current_algo` of a new keystore.
    #[serde(default = "default_algorithms")]
    pub algorithms: Vec<Algorithm>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            kdf_iterations: default_kdf_iterations(),
            algorithms: default_algorithms(),
        }
    }
}

impl VaultConfig {
    /// A configuration rooted at `data_dir` with default cryptographic settings.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Resolve the on-disk file layout for this configuration.
    pub fn paths(&self) -> VaultPaths {
        VaultPaths::new(&self.data_dir)
    }

    /// The algorithm a fresh keystore starts with.
    pub fn initial_algorithm(&self) -> Algorithm {
        self.algorithms
            .first()
            .copied()
            .unwrap_or(Algorithm::Aes256Gcm)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("ciphervault"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

fn default_kdf_iterations() -> u32 {
    200_000
}

fn default_algorithms() -> Vec<Algorithm> {
    vec![Algorithm::Aes256Gcm, Algorithm::ChaCha20Poly1305]
}

/// Diagnostic logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Every file the vault reads or writes, derived from one data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultPaths {
    data_dir: PathBuf,
}

impl VaultPaths {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn keystore(&self) -> PathBuf {
        self.data_dir.join(KEYSTORE_FILE)
    }

    pub fn salt(&self) -> PathBuf {
        self.data_dir.join(SALT_FILE)
    }

    pub fn kdf_params(&self) -> PathBuf {
        self.data_dir.join(KDF_PARAMS_FILE)
    }

    pub fn audit_log(&self) -> PathBuf {
        self.data_dir.join(AUDIT_FILE)
    }

    /// Per-user file holding the most recent ciphertext artifact.
    pub fn last_cipher(&self, username: &str) -> PathBuf {
        self.data_dir.join(format!("{username}_last_cipher.txt"))
    }
}
