// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The keystore document: the single source of truth sealed inside the envelope.

use std::collections::BTreeMap;

use ciphervault_core::Algorithm;
use serde::{Deserialize, Serialize};

/// Decrypted keystore contents.
///
/// `users` and `keys` always hold the same set of usernames; both records
/// are created together and nothing deletes either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystoreDocument {
    #[serde(default)]
    pub users: BTreeMap<String, UserRecord>,

    #[serde(default)]
    pub keys: BTreeMap<String, KeyRecord>,

    /// Identifier of the algorithm used for new encryptions.
    pub current_algo: String,

    /// Append-only record of algorithm rotations, oldest first.
    #[serde(default)]
    pub rotation_history: Vec<RotationEvent>,
}

impl KeystoreDocument {
    /// An empty keystore whose active algorithm is `initial`.
    pub fn new(initial: Algorithm) -> Self {
        Self {
            users: BTreeMap::new(),
            keys: BTreeMap::new(),
            current_algo: initial.to_string(),
            rotation_history: Vec::new(),
        }
    }
}

/// Registration metadata for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Hex SHA-256 of the fingerprint token.
    pub fp_hash: String,
    pub created: String,
}

/// A user's symmetric key, base64-encoded.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    pub enc_key: String,
    /// Algorithms this key was used under before each rotation, oldest first.
    #[serde(default)]
    pub algo_history: Vec<String>,
    pub created: String,
}

impl std::fmt::Debug for KeyRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRecord")
            .field("enc_key", &"[REDACTED]")
            .field("algo_history", &self.algo_history)
            .field("created", &self.created)
            .finish()
    }
}

/// One algorithm transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationEvent {
    pub when: String,
    pub from: String,
    pub to: String,
}

/// User listing without key material, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeystoreSummary {
    pub users: BTreeMap<String, UserSummary>,
    pub current_algo: String,
    pub rotation_history: Vec<RotationEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub created: String,
}

impl From<&KeystoreDocument> for KeystoreSummary {
    fn from(doc: &KeystoreDocument) -> Self {
        Self {
            users: doc
                .users
                .iter()
                .map(|(name, record)| {
                    (
                        name.clone(),
                        UserSummary {
                            created: record.created.clone(),
                        },
                    )
                })
                .collect(),
            current_algo: doc.current_algo.clone(),
            rotation_history: doc.rotation_history.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_optional_sections_default() {
        let doc: KeystoreDocument =
            serde_json::from_str(r#"{"current_algo": "aes256-gcm"}"#).unwrap();
        assert!(doc.users.is_empty());
        assert!(doc.keys.is_empty());
        assert!(doc.rotation_history.is_empty());
    }

    #[test]
    fn summary_omits_key_material() {
        let mut doc = KeystoreDocument::new(Algorithm::Aes256Gcm);
        doc.users.insert(
            "alice".into(),
            UserRecord {
                fp_hash: "ab".repeat(32),
                created: "2026-01-01T00:00:00.000000Z".into(),
            },
        );
        doc.keys.insert(
            "alice".into(),
            KeyRecord {
                enc_key: "c2VjcmV0LWtleS1tYXRlcmlhbA==".into(),
                algo_history: Vec::new(),
                created: "2026-01-01T00:00:00.000000Z".into(),
            },
        );

        let json = serde_json::to_string(&KeystoreSummary::from(&doc)).unwrap();
        assert!(json.contains("alice"));
        assert!(!json.contains("c2VjcmV0"));
        assert!(!json.contains("fp_hash"));
    }

    #[test]
    fn key_record_debug_is_redacted() {
        let record = KeyRecord {
            enc_key: "c2VjcmV0".into(),
            algo_history: vec!["aes256-gcm".into()],
            created: "now".into(),
        };
        assert!(!format!("{record:?}").contains("c2VjcmV0"));
    }
}
