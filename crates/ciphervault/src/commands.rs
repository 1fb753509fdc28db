// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot subcommand implementations and their output formatting.
//!
//! The interactive shell reuses the same functions, so both surfaces print
//! identical messages.

use std::io::{self, BufRead};

use ciphervault_config::model::VaultConfig;
use ciphervault_core::CipherVaultError;
use ciphervault_vault::{
    AuditLog, KeystoreSummary, RotationOutcome, UnlockOrigin, Vault, get_passphrase, prompt_secret,
};
use secrecy::{ExposeSecret, SecretString};

/// Prompt for the master passphrase and unlock the vault.
pub fn open_vault(config: &VaultConfig) -> Result<Vault, CipherVaultError> {
    let passphrase = get_passphrase()?;
    let vault = Vault::unlock(&passphrase, config)?;
    if let Some(notice) = describe_origin(vault.origin()) {
        eprintln!("{notice}");
    }
    Ok(vault)
}

/// A user-facing note about how the keystore was opened, if noteworthy.
pub fn describe_origin(origin: &UnlockOrigin) -> Option<String> {
    match origin {
        UnlockOrigin::Loaded => None,
        UnlockOrigin::Initialized => Some("Initialized a new keystore.".to_string()),
        UnlockOrigin::Reset { reason } => Some(format!(
            "Keystore was unreadable ({reason}); starting from an empty keystore. \
             The file will be replaced on the next change."
        )),
    }
}

/// Prompt for a fingerprint token and resolve it to a registered user.
pub fn authenticate(vault: &Vault) -> Result<String, CipherVaultError> {
    let token = prompt_secret("Fingerprint token")?;
    vault.authenticate(&token).ok_or_else(|| {
        CipherVaultError::InvalidInput("fingerprint token not recognized".to_string())
    })
}

/// Read one line of text from stdin, without the trailing newline.
pub fn read_line() -> Result<String, CipherVaultError> {
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| CipherVaultError::InvalidInput(format!("failed to read input: {e}")))?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub fn register(
    vault: &mut Vault,
    username: &str,
    token: &SecretString,
) -> Result<String, CipherVaultError> {
    vault.register(username, token)?;
    Ok(format!("Registered user {username}."))
}

pub fn encrypt(vault: &Vault, username: &str, plaintext: &str) -> Result<String, CipherVaultError> {
    let ciphertext = vault.encrypt(username, plaintext)?;
    Ok(ciphertext.to_string())
}

pub fn decrypt(
    vault: &Vault,
    username: &str,
    ciphertext: Option<&str>,
) -> Result<String, CipherVaultError> {
    vault.decrypt(username, ciphertext)
}

pub fn rotate(vault: &mut Vault) -> Result<String, CipherVaultError> {
    Ok(render_rotation(&vault.rotate()?))
}

pub fn render_rotation(outcome: &RotationOutcome) -> String {
    match outcome {
        RotationOutcome::Rotated(event) => {
            format!("Rotated algorithm: {} -> {}", event.from, event.to)
        }
        RotationOutcome::NoAlternative { current } => {
            format!("No alternative algorithm available; staying on {current}.")
        }
    }
}

pub fn render_summary(summary: &KeystoreSummary) -> Result<String, CipherVaultError> {
    serde_json::to_string_pretty(summary)
        .map_err(|e| CipherVaultError::CorruptKeystore(format!("failed to render summary: {e}")))
}

pub fn export_key(vault: &Vault, username: &str) -> Result<String, CipherVaultError> {
    let key = vault.export_key(username)?;
    Ok(format!("Key for {username} (base64): {}", key.expose_secret()))
}

/// The last `lines` audit entries, or a note if nothing was logged yet.
pub fn audit(config: &VaultConfig, lines: usize) -> Result<String, CipherVaultError> {
    let log = AuditLog::new(config.paths().audit_log());
    let entries = log.tail(lines)?;
    if entries.is_empty() {
        return Ok("No audit log yet.".to_string());
    }
    Ok(entries.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ciphervault_core::{Algorithm, MIN_KDF_ITERATIONS};
    use ciphervault_vault::document::RotationEvent;
    use std::path::Path;
    use tempfile::tempdir;

    fn config(dir: &Path) -> VaultConfig {
        VaultConfig {
            data_dir: dir.to_path_buf(),
            kdf_iterations: MIN_KDF_ITERATIONS,
            algorithms: vec![Algorithm::Aes256Gcm, Algorithm::ChaCha20Poly1305],
        }
    }

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[test]
    fn origin_notices() {
        assert_eq!(describe_origin(&UnlockOrigin::Loaded), None);
        assert!(describe_origin(&UnlockOrigin::Initialized).is_some());
        let reset = describe_origin(&UnlockOrigin::Reset {
            reason: "bad json".into(),
        })
        .unwrap();
        assert!(reset.contains("bad json"));
    }

    #[test]
    fn rotation_messages() {
        let rotated = RotationOutcome::Rotated(RotationEvent {
            when: "now".into(),
            from: "aes256-gcm".into(),
            to: "chacha20-poly1305".into(),
        });
        assert_eq!(
            render_rotation(&rotated),
            "Rotated algorithm: aes256-gcm -> chacha20-poly1305"
        );
        let none = RotationOutcome::NoAlternative {
            current: Algorithm::Aes256Gcm,
        };
        assert!(render_rotation(&none).contains("staying on aes256-gcm"));
    }

    #[test]
    fn command_flow_against_real_vault() {
        let dir = tempdir().unwrap();
        let cfg = config(dir.path());
        let mut vault = Vault::unlock(&secret("pw"), &cfg).unwrap();

        assert_eq!(
            register(&mut vault, "alice", &secret("tok")).unwrap(),
            "Registered user alice."
        );
        let ct = encrypt(&vault, "alice", "hello world").unwrap();
        assert!(ct.starts_with("aes256-gcm:"));
        assert_eq!(decrypt(&vault, "alice", Some(&ct)).unwrap(), "hello world");

        let summary = render_summary(&vault.summary()).unwrap();
        assert!(summary.contains("\"alice\""));
        assert!(!summary.contains(&vault.document().keys["alice"].enc_key));

        let exported = export_key(&vault, "alice").unwrap();
        assert!(exported.starts_with("Key for alice (base64): "));

        let log = audit(&cfg, 2).unwrap();
        assert_eq!(log.lines().count(), 2);
        assert!(log.ends_with("EXPORT_KEY user=alice"));
    }

    #[test]
    fn audit_without_log() {
        let dir = tempdir().unwrap();
        assert_eq!(audit(&config(dir.path()), 10).unwrap(), "No audit log yet.");
    }
}
