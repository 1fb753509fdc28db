// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user key issuance and lookup.
//!
//! Keys are generated once per user and never regenerated; only the
//! algorithm they are used with rotates.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ciphervault_core::{CipherVaultError, SecretKey};
use zeroize::Zeroizing;

use crate::crypto::generate_random_key;
use crate::document::{KeyRecord, KeystoreDocument};
use crate::persist::now_iso;

/// Encode a key for storage in the document.
pub fn encode_key(key: &SecretKey) -> String {
    STANDARD.encode(key.expose())
}

/// Decode a stored key; `None` if it is not valid base64 of exactly 32 bytes.
pub fn decode_key(encoded: &str) -> Option<SecretKey> {
    let bytes = Zeroizing::new(STANDARD.decode(encoded).ok()?);
    SecretKey::from_slice(&bytes)
}

/// The raw key for `username`, or `None` if the record is missing or malformed.
pub fn get_raw_key(doc: &KeystoreDocument, username: &str) -> Option<SecretKey> {
    doc.keys
        .get(username)
        .and_then(|record| decode_key(&record.enc_key))
}

/// Make sure `username` has a usable key, issuing one if needed.
///
/// An existing, decodable key is kept. A malformed record is replaced but
/// keeps its algorithm history. Returns the key now on record.
pub fn ensure_key(
    doc: &mut KeystoreDocument,
    username: &str,
) -> Result<(SecretKey, bool), CipherVaultError> {
    if let Some(key) = get_raw_key(doc, username) {
        return Ok((key, false));
    }

    let key = generate_random_key()?;
    let algo_history = doc
        .keys
        .remove(username)
        .map(|old| old.algo_history)
        .unwrap_or_default();
    doc.keys.insert(
        username.to_string(),
        KeyRecord {
            enc_key: encode_key(&key),
            algo_history,
            created: now_iso(),
        },
    );
    Ok((key, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ciphervault_core::{Algorithm, KEY_LEN};

    fn doc() -> KeystoreDocument {
        KeystoreDocument::new(Algorithm::Aes256Gcm)
    }

    #[test]
    fn issued_key_is_stored_and_decodable() {
        let mut doc = doc();
        let (key, created) = ensure_key(&mut doc, "alice").unwrap();

        assert!(created);
        assert_eq!(get_raw_key(&doc, "alice").unwrap(), key);
        assert!(doc.keys["alice"].algo_history.is_empty());
    }

    #[test]
    fn existing_key_is_preserved() {
        let mut doc = doc();
        let (first, _) = ensure_key(&mut doc, "alice").unwrap();
        let (second, created) = ensure_key(&mut doc, "alice").unwrap();

        assert!(!created);
        assert_eq!(first, second);
    }

    #[test]
    fn malformed_key_is_absent_then_replaced() {
        let mut doc = doc();
        doc.keys.insert(
            "bob".into(),
            KeyRecord {
                enc_key: "%%%".into(),
                algo_history: vec!["chacha20-poly1305".into()],
                created: "then".into(),
            },
        );
        assert!(get_raw_key(&doc, "bob").is_none());

        let (_, created) = ensure_key(&mut doc, "bob").unwrap();
        assert!(created);
        assert_eq!(doc.keys["bob"].algo_history, vec!["chacha20-poly1305"]);
    }

    #[test]
    fn wrong_length_key_is_absent() {
        assert!(decode_key(&STANDARD.encode([0u8; 16])).is_none());
        assert!(decode_key(&STANDARD.encode([0u8; KEY_LEN])).is_some());
    }

    #[test]
    fn unknown_user_has_no_key() {
        assert!(get_raw_key(&doc(), "nobody").is_none());
    }
}
