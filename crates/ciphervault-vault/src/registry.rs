// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User registration and fingerprint-token authentication.
//!
//! Only the SHA-256 of a fingerprint token is stored. Authentication hashes
//! the presented token and looks for an exact match.

use ciphervault_core::{CipherVaultError, SecretKey};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

use crate::document::{KeystoreDocument, UserRecord};
use crate::keys;
use crate::persist::now_iso;

/// Hex SHA-256 of a fingerprint token.
pub fn hash_fingerprint(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Usernames become part of file names, so path syntax is refused.
pub fn validate_username(username: &str) -> Result<(), CipherVaultError> {
    if username.is_empty() {
        return Err(CipherVaultError::InvalidInput(
            "username is required".to_string(),
        ));
    }
    if username == "." || username == ".." {
        return Err(CipherVaultError::InvalidInput(format!(
            "`{username}` is not a valid username"
        )));
    }
    if username
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || c == '/' || c == '\\')
    {
        return Err(CipherVaultError::InvalidInput(
            "username must not contain whitespace, control characters, or path separators"
                .to_string(),
        ));
    }
    Ok(())
}

/// Register (or re-register) `username` with a fingerprint token.
///
/// Re-registration replaces the stored hash and creation time but keeps an
/// existing key. Returns the user's key and whether it was newly issued.
pub fn register_user(
    doc: &mut KeystoreDocument,
    username: &str,
    token: &SecretString,
) -> Result<(SecretKey, bool), CipherVaultError> {
    validate_username(username)?;
    let token = token.expose_secret();
    if token.is_empty() {
        return Err(CipherVaultError::InvalidInput(
            "fingerprint token is required".to_string(),
        ));
    }

    doc.users.insert(
        username.to_string(),
        UserRecord {
            fp_hash: hash_fingerprint(token),
            created: now_iso(),
        },
    );
    keys::ensure_key(doc, username)
}

/// The first user (in name order) whose stored hash matches `token`.
pub fn authenticate(doc: &KeystoreDocument, token: &SecretString) -> Option<String> {
    let token = token.expose_secret();
    if token.is_empty() {
        return None;
    }
    let fp_hash = hash_fingerprint(token);
    doc.users
        .iter()
        .find(|(_, record)| record.fp_hash == fp_hash)
        .map(|(name, _)| name.clone())
}
