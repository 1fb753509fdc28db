// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault session: unlock, register, authenticate, encrypt, decrypt, rotate,
//! export, and summarize.
//!
//! The session holds the master key and the decrypted keystore document in
//! memory. Every mutation is applied to a copy of the document, sealed and
//! written to disk, and only then swapped in; a failed write leaves the
//! session exactly as it was.

use std::collections::BTreeMap;
use std::io;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ciphervault_config::model::{VaultConfig, VaultPaths};
use ciphervault_core::{Algorithm, AlgorithmPicker, CipherVaultError, OsRandomPicker, SecretKey};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use crate::audit::AuditLog;
use crate::cipher::{CipherDispatcher, Ciphertext};
use crate::document::{KeystoreDocument, KeystoreSummary};
use crate::envelope::{self, UnlockOrigin};
use crate::kdf;
use crate::keys;
use crate::persist::atomic_write;
use crate::registry;
use crate::rotation::{self, RotationOutcome};

/// An unlocked vault.
///
/// Debug output omits the master key and per-user keys.
pub struct Vault {
    paths: VaultPaths,
    /// Derived from the passphrase at unlock; never written anywhere.
    master_key: SecretKey,
    document: KeystoreDocument,
    /// Decoded per-user keys, built once at unlock and on registration.
    keys: BTreeMap<String, SecretKey>,
    ciphers: CipherDispatcher,
    picker: Box<dyn AlgorithmPicker>,
    audit: AuditLog,
    origin: UnlockOrigin,
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("data_dir", &self.paths.data_dir())
            .field("master_key", &"[REDACTED]")
            .field("users", &self.keys.keys().collect::<Vec<_>>())
            .field("current_algo", &self.document.current_algo)
            .field("origin", &self.origin)
            .finish()
    }
}

impl Vault {
    /// Whether a keystore file exists under `config.data_dir`.
    pub fn exists(config: &VaultConfig) -> bool {
        config.paths().keystore().exists()
    }

    /// Unlock (or initialize) the vault at `config.data_dir`.
    ///
    /// Rotation picks uniformly at random among the other configured
    /// algorithms.
    pub fn unlock(passphrase: &SecretString, config: &VaultConfig) -> Result<Self, CipherVaultError> {
        Self::unlock_with_picker(passphrase, config, Box::new(OsRandomPicker))
    }

    /// Unlock with a caller-supplied rotation picker.
    pub fn unlock_with_picker(
        passphrase: &SecretString,
        config: &VaultConfig,
        picker: Box<dyn AlgorithmPicker>,
    ) -> Result<Self, CipherVaultError> {
        if passphrase.expose_secret().is_empty() {
            return Err(CipherVaultError::InvalidInput(
                "passphrase is required".to_string(),
            ));
        }
        if config.algorithms.is_empty() {
            return Err(CipherVaultError::Config(
                "at least one algorithm must be configured".to_string(),
            ));
        }

        let paths = config.paths();
        std::fs::create_dir_all(paths.data_dir())
            .map_err(|e| CipherVaultError::storage(paths.data_dir(), e))?;

        let kdf_params = kdf::ensure_params(&paths.kdf_params(), config.kdf_iterations)?;
        let master_key = kdf::derive_master_key(passphrase, &paths.salt(), &kdf_params)?;
        let (document, origin) = envelope::load_keystore(
            &paths.keystore(),
            &master_key,
            config.initial_algorithm(),
        )?;

        let user_keys = document
            .users
            .keys()
            .filter_map(|name| keys::get_raw_key(&document, name).map(|key| (name.clone(), key)))
            .collect();

        let vault = Self {
            audit: AuditLog::new(paths.audit_log()),
            ciphers: CipherDispatcher::new(&config.algorithms),
            paths,
            master_key,
            document,
            keys: user_keys,
            picker,
            origin,
        };

        if vault.origin == UnlockOrigin::Initialized {
            envelope::save_keystore(&vault.paths.keystore(), &vault.document, &vault.master_key)?;
            vault.audit.record("INIT keystore");
            info!(data_dir = %vault.paths.data_dir().display(), "keystore initialized");
        } else {
            info!(
                data_dir = %vault.paths.data_dir().display(),
                users = vault.document.users.len(),
                current_algo = %vault.document.current_algo,
                "vault unlocked"
            );
        }

        Ok(vault)
    }

    /// Seal `next`, write it, and make it the session's document.
    fn commit(&mut self, next: KeystoreDocument) -> Result<(), CipherVaultError> {
        envelope::save_keystore(&self.paths.keystore(), &next, &self.master_key)?;
        self.document = next;
        Ok(())
    }

    /// Register `username` with a fingerprint token.
    ///
    /// Re-registering replaces the token but keeps the user's key.
    pub fn register(
        &mut self,
        username: &str,
        token: &SecretString,
    ) -> Result<(), CipherVaultError> {
        let mut next = self.document.clone();
        let result = registry::register_user(&mut next, username, token)
            .and_then(|registered| self.commit(next).map(|()| registered));

        match result {
            Ok((key, created)) => {
                self.keys.insert(username.to_string(), key);
                self.audit.record(&format!("REGISTER user={username}"));
                info!(user = %username, new_key = created, "user registered");
                Ok(())
            }
            Err(e) => {
                self.audit
                    .record(&format!("REGISTER failed user={username} err={e}"));
                warn!(user = %username, error = %e, "registration failed");
                Err(e)
            }
        }
    }

    /// The user whose fingerprint token matches, if any.
    pub fn authenticate(&self, token: &SecretString) -> Option<String> {
        match registry::authenticate(&self.document, token) {
            Some(name) => {
                self.audit.record(&format!("AUTH success user={name}"));
                debug!(user = %name, "authentication succeeded");
                Some(name)
            }
            None => {
                self.audit.record("AUTH failed");
                warn!("authentication failed");
                None
            }
        }
    }

    /// The cached key of `username`. Malformed names are rejected first.
    fn user_key(&self, username: &str) -> Result<&SecretKey, CipherVaultError> {
        registry::validate_username(username)?;
        self.keys
            .get(username)
            .ok_or_else(|| CipherVaultError::MissingKeyOrUser(username.to_string()))
    }

    /// Encrypt `plaintext` for `username` under the current algorithm.
    ///
    /// The result is also written to the user's last-ciphertext file.
    pub fn encrypt(&self, username: &str, plaintext: &str) -> Result<Ciphertext, CipherVaultError> {
        let result = self.user_key(username).and_then(|key| {
            let ciphertext = self
                .ciphers
                .encrypt(&self.document.current_algo, key, plaintext)?;
            let path = self.paths.last_cipher(username);
            atomic_write(&path, ciphertext.to_string().as_bytes())
                .map_err(|e| CipherVaultError::storage(&path, e))?;
            Ok(ciphertext)
        });

        match &result {
            Ok(ciphertext) => {
                let algo = ciphertext
                    .algorithm
                    .map(|a| a.to_string())
                    .unwrap_or_default();
                self.audit
                    .record(&format!("ENCRYPT success user={username} algo={algo}"));
                debug!(user = %username, algo = %algo, "encrypted");
            }
            Err(e) => {
                self.audit
                    .record(&format!("ENCRYPT error user={username} err={e}"));
                warn!(user = %username, error = %e, "encryption failed");
            }
        }
        result
    }

    /// Decrypt `ciphertext` for `username`.
    ///
    /// With no ciphertext (or a blank one) the user's last-ciphertext file is
    /// used. Tagged ciphertexts use their recorded algorithm; untagged ones
    /// use the current algorithm.
    pub fn decrypt(
        &self,
        username: &str,
        ciphertext: Option<&str>,
    ) -> Result<String, CipherVaultError> {
        let result = self.try_decrypt(username, ciphertext);

        match &result {
            Ok((_, algorithm)) => {
                self.audit
                    .record(&format!("DECRYPT success user={username} algo={algorithm}"));
                debug!(user = %username, algo = %algorithm, "decrypted");
            }
            Err(
                e @ (CipherVaultError::AuthenticationFailure { .. }
                | CipherVaultError::InvalidCiphertext(_)),
            ) => {
                self.audit
                    .record(&format!("DECRYPT failure user={username} reason=InvalidToken"));
                warn!(user = %username, error = %e, "decryption rejected");
            }
            Err(e) => {
                self.audit
                    .record(&format!("DECRYPT error user={username} err={e}"));
                warn!(user = %username, error = %e, "decryption failed");
            }
        }
        result.map(|(plaintext, _)| plaintext)
    }

    fn try_decrypt(
        &self,
        username: &str,
        ciphertext: Option<&str>,
    ) -> Result<(String, Algorithm), CipherVaultError> {
        let key = self.user_key(username)?;
        let input = match ciphertext.map(str::trim).filter(|s| !s.is_empty()) {
            Some(input) => input.to_string(),
            None => self.last_ciphertext(username)?,
        };
        let ciphertext: Ciphertext = input.parse()?;
        let algorithm = self
            .ciphers
            .algorithm_for(&self.document.current_algo, &ciphertext)?;
        let plaintext = self
            .ciphers
            .decrypt(&self.document.current_algo, key, &ciphertext)?;
        Ok((plaintext, algorithm))
    }

    /// Contents of the user's last-ciphertext file.
    pub fn last_ciphertext(&self, username: &str) -> Result<String, CipherVaultError> {
        registry::validate_username(username)?;
        let path = self.paths.last_cipher(username);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(content.trim().to_string()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(CipherVaultError::InvalidInput(
                format!("no ciphertext available for `{username}`"),
            )),
            Err(e) => Err(CipherVaultError::storage(&path, e)),
        }
    }

    /// Switch to another configured algorithm and persist the change.
    pub fn rotate(&mut self) -> Result<RotationOutcome, CipherVaultError> {
        let mut next = self.document.clone();
        let supported = self.ciphers.supported();
        let outcome = rotation::rotate_algorithm(&mut next, &supported, self.picker.as_mut())
            .and_then(|outcome| match outcome {
                RotationOutcome::Rotated(_) => self.commit(next).map(|()| outcome),
                RotationOutcome::NoAlternative { .. } => Ok(outcome),
            });
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                self.audit.record(&format!("ROTATE failed err={e}"));
                warn!(error = %e, "rotation failed");
                return Err(e);
            }
        };

        match &outcome {
            RotationOutcome::Rotated(event) => {
                self.audit
                    .record(&format!("ROTATE from={} to={}", event.from, event.to));
                info!(from = %event.from, to = %event.to, "algorithm rotated");
            }
            RotationOutcome::NoAlternative { current } => {
                info!(current = %current, "no alternative algorithm to rotate to");
            }
        }
        Ok(outcome)
    }

    /// Base64 of `username`'s raw key. Read-only apart from the audit entry.
    pub fn export_key(&self, username: &str) -> Result<SecretString, CipherVaultError> {
        match self.user_key(username) {
            Ok(key) => {
                let encoded = SecretString::from(STANDARD.encode(key.expose()));
                self.audit.record(&format!("EXPORT_KEY user={username}"));
                info!(user = %username, "key exported");
                Ok(encoded)
            }
            Err(e) => {
                self.audit
                    .record(&format!("EXPORT_KEY failed user={username} err={e}"));
                warn!(user = %username, error = %e, "key export failed");
                Err(e)
            }
        }
    }

    /// Users, current algorithm, and rotation history. Never key material.
    pub fn summary(&self) -> KeystoreSummary {
        KeystoreSummary::from(&self.document)
    }

    pub fn current_algorithm(&self) -> &str {
        &self.document.current_algo
    }

    pub fn document(&self) -> &KeystoreDocument {
        &self.document
    }

    pub fn origin(&self) -> &UnlockOrigin {
        &self.origin
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    pub fn paths(&self) -> &VaultPaths {
        &self.paths
    }
}
