// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The keystore envelope: `{"v": 1, "payload": "<token>"}`.
//!
//! The payload is an AES-256-GCM token over the compact JSON of the
//! [`KeystoreDocument`], keyed by the master key. The document never touches
//! disk in plaintext.
//!
//! Failure causes stay distinct:
//! - no file: a fresh document ([`UnlockOrigin::Initialized`])
//! - file that is not an envelope, or a payload that is not a token:
//!   [`CipherVaultError::CorruptVault`], which [`load_keystore`] turns into a
//!   fresh document ([`UnlockOrigin::Reset`])
//! - unknown version: [`CipherVaultError::UnsupportedEnvelope`]
//! - authentication failure: [`CipherVaultError::WrongPassphrase`]
//! - authenticated payload that is not a document:
//!   [`CipherVaultError::CorruptKeystore`]

use std::path::Path;

use ciphervault_core::{Algorithm, CipherBackend, CipherVaultError, SecretKey};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::cipher::TokenCipher;
use crate::document::KeystoreDocument;
use crate::persist::{self, JsonError};

/// The only envelope format this build reads or writes.
pub const ENVELOPE_VERSION: u32 = 1;

/// On-disk container for the encrypted keystore document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub v: u32,
    pub payload: String,
}

/// How the session's keystore document came to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockOrigin {
    /// Decrypted from an existing envelope.
    Loaded,
    /// No keystore file existed.
    Initialized,
    /// The keystore file was unreadable and a fresh document was substituted.
    /// The file is left as is until the next mutation overwrites it.
    Reset { reason: String },
}

/// Seal `doc` under `master_key`.
pub fn encrypt_keystore(
    doc: &KeystoreDocument,
    master_key: &SecretKey,
) -> Result<Envelope, CipherVaultError> {
    let plaintext = Zeroizing::new(serde_json::to_vec(doc).map_err(|e| {
        CipherVaultError::CorruptKeystore(format!("failed to serialize keystore: {e}"))
    })?);
    let payload = TokenCipher.encrypt(master_key, &plaintext)?;
    Ok(Envelope {
        v: ENVELOPE_VERSION,
        payload,
    })
}

/// Open `envelope` with `master_key`.
pub fn decrypt_envelope(
    envelope: &Envelope,
    master_key: &SecretKey,
) -> Result<KeystoreDocument, CipherVaultError> {
    if envelope.v != ENVELOPE_VERSION {
        return Err(CipherVaultError::UnsupportedEnvelope {
            version: envelope.v,
        });
    }

    let plaintext = match TokenCipher.decrypt(master_key, &envelope.payload) {
        Ok(plaintext) => Zeroizing::new(plaintext),
        Err(CipherVaultError::AuthenticationFailure { .. }) => {
            return Err(CipherVaultError::WrongPassphrase);
        }
        Err(CipherVaultError::InvalidCiphertext(detail)) => {
            return Err(CipherVaultError::CorruptVault(format!(
                "envelope payload: {detail}"
            )));
        }
        Err(e) => return Err(e),
    };

    serde_json::from_slice(&plaintext)
        .map_err(|e| CipherVaultError::CorruptKeystore(e.to_string()))
}

/// Read the envelope at `path`; `Ok(None)` if the file does not exist.
pub fn read_envelope(path: &Path) -> Result<Option<Envelope>, CipherVaultError> {
    match persist::try_load_json::<Envelope>(path) {
        Ok(envelope) => Ok(envelope),
        Err(JsonError::Parse(e)) => Err(CipherVaultError::CorruptVault(format!(
            "{} is not a keystore envelope: {e}",
            path.display()
        ))),
        Err(JsonError::Io(e)) => Err(CipherVaultError::storage(path, e)),
    }
}

/// Encrypt `doc` and atomically replace the keystore file at `path`.
pub fn save_keystore(
    path: &Path,
    doc: &KeystoreDocument,
    master_key: &SecretKey,
) -> Result<(), CipherVaultError> {
    let envelope = encrypt_keystore(doc, master_key)?;
    persist::save_json_atomic(path, &envelope).map_err(|e| match e {
        JsonError::Io(source) => CipherVaultError::storage(path, source),
        JsonError::Parse(e) => CipherVaultError::CorruptKeystore(e.to_string()),
    })?;
    debug!(path = %path.display(), "keystore saved");
    Ok(())
}

/// Load and decrypt the keystore at `path`.
///
/// A missing or unreadable file yields a fresh document whose active
/// algorithm is `initial`. A wrong master key is always an error.
pub fn load_keystore(
    path: &Path,
    master_key: &SecretKey,
    initial: Algorithm,
) -> Result<(KeystoreDocument, UnlockOrigin), CipherVaultError> {
    let opened = read_envelope(path).and_then(|envelope| {
        envelope
            .map(|envelope| decrypt_envelope(&envelope, master_key))
            .transpose()
    });

    match opened {
        Ok(Some(doc)) => Ok((doc, UnlockOrigin::Loaded)),
        Ok(None) => Ok((KeystoreDocument::new(initial), UnlockOrigin::Initialized)),
        Err(CipherVaultError::CorruptVault(reason)) => {
            warn!(
                path = %path.display(),
                reason = %reason,
                "keystore unreadable, starting from an empty document"
            );
            Ok((KeystoreDocument::new(initial), UnlockOrigin::Reset { reason }))
        }
        Err(e) => Err(e),
    }
}
