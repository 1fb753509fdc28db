// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PBKDF2-HMAC-SHA256 master key derivation from a passphrase.
//!
//! The salt and the iteration count are generated once, stored in plaintext
//! beside the keystore, and never rotated. Deriving with a different salt or
//! count produces a different master key, which then fails to open the
//! existing envelope.

use std::io;
use std::num::NonZeroU32;
use std::path::Path;

use ciphervault_core::{CipherVaultError, KEY_LEN, MIN_KDF_ITERATIONS, SecretKey};
use ring::pbkdf2;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::crypto::fill_random;
use crate::persist::{JsonError, atomic_write, save_json_atomic, try_load_json};

/// Length of the persisted KDF salt.
pub const SALT_LEN: usize = 16;

/// Identifier recorded in the parameters file.
pub const KDF_ALGORITHM: &str = "pbkdf2-hmac-sha256";

/// Key derivation parameters fixed when the vault is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    pub algorithm: String,
    pub iterations: u32,
}

impl KdfParams {
    /// Parameters for a new vault. Counts below [`MIN_KDF_ITERATIONS`] are
    /// rejected.
    pub fn new(iterations: u32) -> Result<Self, CipherVaultError> {
        let params = Self {
            algorithm: KDF_ALGORITHM.to_string(),
            iterations,
        };
        params.check().map_err(CipherVaultError::Config)?;
        Ok(params)
    }

    fn check(&self) -> Result<(), String> {
        if self.algorithm != KDF_ALGORITHM {
            return Err(format!("unsupported KDF `{}`", self.algorithm));
        }
        if self.iterations < MIN_KDF_ITERATIONS {
            return Err(format!(
                "kdf_iterations must be at least {MIN_KDF_ITERATIONS}, got {}",
                self.iterations
            ));
        }
        Ok(())
    }
}

/// Derive a 32-byte key from `passphrase` and `salt`.
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Result<Zeroizing<[u8; KEY_LEN]>, CipherVaultError> {
    let iterations = NonZeroU32::new(iterations).ok_or_else(|| {
        CipherVaultError::Config("kdf_iterations must be greater than zero".to_string())
    })?;

    let mut output = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        salt,
        passphrase,
        output.as_mut(),
    );
    Ok(output)
}

/// Generate a random salt.
pub fn generate_salt() -> Result<[u8; SALT_LEN], CipherVaultError> {
    let mut salt = [0u8; SALT_LEN];
    fill_random(&mut salt)?;
    Ok(salt)
}

/// Read the salt at `path`, creating and persisting a fresh one if absent.
///
/// A salt file of the wrong length is an error; replacing it would silently
/// change the master key.
pub fn ensure_salt(path: &Path) -> Result<[u8; SALT_LEN], CipherVaultError> {
    match std::fs::read(path) {
        Ok(bytes) => bytes.as_slice().try_into().map_err(|_| {
            CipherVaultError::CorruptVault(format!(
                "salt file {} holds {} bytes, expected {SALT_LEN}",
                path.display(),
                bytes.len()
            ))
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let salt = generate_salt()?;
            atomic_write(path, &salt).map_err(|e| CipherVaultError::storage(path, e))?;
            info!(path = %path.display(), "generated new KDF salt");
            Ok(salt)
        }
        Err(e) => Err(CipherVaultError::storage(path, e)),
    }
}

/// Read the parameters at `path`, pinning `requested` if none exist yet.
///
/// Stored parameters always win over `requested`. A file that cannot be
/// parsed or that falls below the floor is an error, never replaced.
pub fn ensure_params(path: &Path, requested: u32) -> Result<KdfParams, CipherVaultError> {
    match try_load_json::<KdfParams>(path) {
        Ok(Some(params)) => {
            params.check().map_err(|reason| {
                CipherVaultError::CorruptVault(format!(
                    "KDF parameters in {}: {reason}",
                    path.display()
                ))
            })?;
            if params.iterations != requested {
                warn!(
                    stored = params.iterations,
                    configured = requested,
                    "using the KDF iteration count the vault was created with"
                );
            }
            Ok(params)
        }
        Ok(None) => {
            let params = KdfParams::new(requested)?;
            save_json_atomic(path, &params).map_err(|e| match e {
                JsonError::Io(e) => CipherVaultError::storage(path, e),
                JsonError::Parse(e) => CipherVaultError::CorruptVault(e.to_string()),
            })?;
            info!(path = %path.display(), iterations = requested, "pinned KDF parameters");
            Ok(params)
        }
        Err(JsonError::Io(e)) => Err(CipherVaultError::storage(path, e)),
        Err(JsonError::Parse(e)) => Err(CipherVaultError::CorruptVault(format!(
            "KDF parameters in {} are unreadable: {e}",
            path.display()
        ))),
    }
}

/// Derive the session master key from `passphrase`, the salt at `salt_path`,
/// and the pinned `params`.
pub fn derive_master_key(
    passphrase: &SecretString,
    salt_path: &Path,
    params: &KdfParams,
) -> Result<SecretKey, CipherVaultError> {
    params.check().map_err(CipherVaultError::Config)?;
    let salt = ensure_salt(salt_path)?;
    let key = derive_key(
        passphrase.expose_secret().as_bytes(),
        &salt,
        params.iterations,
    )?;
    Ok(SecretKey::from_bytes(&key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // Below the vault floor; fine for the raw primitive.
    const ITERATIONS: u32 = 1_000;

    #[test]
    fn derive_key_is_deterministic() {
        let salt = [1u8; SALT_LEN];
        let a = derive_key(b"correct-horse", &salt, ITERATIONS).unwrap();
        let b = derive_key(b"correct-horse", &salt, ITERATIONS).unwrap();
        assert_eq!(*a, *b);
    }

    #[test]
    fn different_salt_or_passphrase_changes_output() {
        let a = derive_key(b"pass", &[1u8; SALT_LEN], ITERATIONS).unwrap();
        let b = derive_key(b"pass", &[2u8; SALT_LEN], ITERATIONS).unwrap();
        let c = derive_key(b"other", &[1u8; SALT_LEN], ITERATIONS).unwrap();
        assert_ne!(*a, *b);
        assert_ne!(*a, *c);
    }

    #[test]
    fn matches_known_pbkdf2_sha256_vector() {
        // RFC 7914 section 11: P="passwd", S="salt", c=1, dkLen=64 (first 32 bytes).
        let key = derive_key(b"passwd", b"salt", 1).unwrap();
        assert_eq!(
            hex::encode(*key),
            "55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc"
        );
    }

    #[test]
    fn zero_iterations_is_rejected() {
        assert!(matches!(
            derive_key(b"x", b"salt", 0),
            Err(CipherVaultError::Config(_))
        ));
    }

    #[test]
    fn salt_is_created_once_and_reused() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("salt.bin");

        let first = ensure_salt(&path).unwrap();
        let second = ensure_salt(&path).unwrap();
        assert_eq!(first, second);
        assert_eq!(std::fs::read(&path).unwrap(), first.to_vec());
    }

    #[test]
    fn truncated_salt_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("salt.bin");
        std::fs::write(&path, [0u8; 5]).unwrap();

        assert!(matches!(
            ensure_salt(&path),
            Err(CipherVaultError::CorruptVault(_))
        ));
        // Never silently replaced.
        assert_eq!(std::fs::read(&path).unwrap().len(), 5);
    }

    #[test]
    fn master_key_depends_on_persisted_salt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("salt.bin");
        let pass = SecretString::from("correct-horse".to_string());
        let params = KdfParams::new(MIN_KDF_ITERATIONS).unwrap();

        let a = derive_master_key(&pass, &path, &params).unwrap();
        let b = derive_master_key(&pass, &path, &params).unwrap();
        assert_eq!(a, b);

        std::fs::remove_file(&path).unwrap();
        let c = derive_master_key(&pass, &path, &params).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn params_below_floor_are_rejected() {
        assert!(matches!(
            KdfParams::new(ITERATIONS),
            Err(CipherVaultError::Config(_))
        ));

        let dir = tempdir().unwrap();
        let weak = KdfParams {
            algorithm: KDF_ALGORITHM.to_string(),
            iterations: ITERATIONS,
        };
        let pass = SecretString::from("pw".to_string());
        assert!(matches!(
            derive_master_key(&pass, &dir.path().join("salt.bin"), &weak),
            Err(CipherVaultError::Config(_))
        ));
        assert!(!dir.path().join("salt.bin").exists());
    }

    #[test]
    fn params_are_pinned_on_first_use() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kdf.json");

        let first = ensure_params(&path, MIN_KDF_ITERATIONS).unwrap();
        assert_eq!(first.iterations, MIN_KDF_ITERATIONS);

        let second = ensure_params(&path, MIN_KDF_ITERATIONS * 3).unwrap();
        assert_eq!(second, first);
        let stored: KdfParams = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(stored, first);
    }

    #[test]
    fn tampered_params_are_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kdf.json");

        std::fs::write(&path, r#"{"algorithm":"pbkdf2-hmac-sha256","iterations":10}"#).unwrap();
        assert!(matches!(
            ensure_params(&path, MIN_KDF_ITERATIONS),
            Err(CipherVaultError::CorruptVault(_))
        ));

        std::fs::write(&path, "{ truncated").unwrap();
        assert!(matches!(
            ensure_params(&path, MIN_KDF_ITERATIONS),
            Err(CipherVaultError::CorruptVault(_))
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ truncated");
    }

    #[test]
    fn config_below_floor_creates_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kdf.json");
        assert!(matches!(
            ensure_params(&path, ITERATIONS),
            Err(CipherVaultError::Config(_))
        ));
        assert!(!path.exists());
    }
}
