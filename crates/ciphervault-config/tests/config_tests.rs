// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the CipherVault configuration system.

use std::path::PathBuf;

use ciphervault_config::diagnostic::ConfigError;
use ciphervault_config::{
    load_and_validate_path, load_and_validate_str, load_config, load_config_from_str,
};
use ciphervault_core::Algorithm;

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes() {
    let toml = r#"
[vault]
data_dir = "/tmp/ciphervault-test"
kdf_iterations = 250000
algorithms = ["chacha20-poly1305", "aes256-gcm"]

[log]
level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.vault.data_dir, PathBuf::from("/tmp/ciphervault-test"));
    assert_eq!(config.vault.kdf_iterations, 250_000);
    assert_eq!(
        config.vault.algorithms,
        vec![Algorithm::ChaCha20Poly1305, Algorithm::Aes256Gcm]
    );
    assert_eq!(config.vault.initial_algorithm(), Algorithm::ChaCha20Poly1305);
    assert_eq!(config.log.level, "debug");
}

/// Empty input falls back to compiled defaults.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_and_validate_str("").expect("defaults are valid");
    assert_eq!(config.vault.kdf_iterations, 200_000);
    assert_eq!(config.log.level, "info");
}

/// Unknown keys are rejected with a suggestion.
#[test]
fn unknown_field_in_vault_suggests_correction() {
    let toml = r#"
[vault]
kdf_iteratons = 300000
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "kdf_iteratons");
            assert_eq!(suggestion.as_deref(), Some("kdf_iterations"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// Unsupported algorithm names fail deserialization, never silently default.
#[test]
fn unknown_algorithm_is_rejected() {
    let toml = r#"
[vault]
algorithms = ["aes256-gcm", "rot13"]
"#;

    let errors = load_and_validate_str(toml).expect_err("rot13 is not supported");
    let rendered = errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n");
    assert!(rendered.contains("rot13"), "got: {rendered}");
}

/// KDF cost below the floor is a validation error.
#[test]
fn weak_kdf_iterations_fail_validation() {
    let toml = r#"
[vault]
kdf_iterations = 1000
"#;

    let errors = load_and_validate_str(toml).expect_err("too few iterations");
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
    assert!(errors[0].to_string().contains("kdf_iterations"));
}

/// An explicit config file is honoured and validated.
#[test]
fn explicit_path_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(
        &path,
        "[vault]\ndata_dir = \"/srv/vault\"\nalgorithms = [\"chacha20-poly1305\"]\n",
    )
    .unwrap();

    let config = load_and_validate_path(&path).expect("valid file");
    assert_eq!(config.vault.data_dir, PathBuf::from("/srv/vault"));
    assert_eq!(config.vault.algorithms, vec![Algorithm::ChaCha20Poly1305]);
}

/// Environment variables override file values; unrelated variables are ignored.
#[test]
fn env_overrides_local_file() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("ciphervault.toml", "[vault]\nkdf_iterations = 150000\n")?;
        jail.set_env("CIPHERVAULT_VAULT_KDF_ITERATIONS", "300000");
        jail.set_env("CIPHERVAULT_LOG_LEVEL", "warn");
        jail.set_env("CIPHERVAULT_PASSPHRASE", "not-config");

        let config = load_config().expect("env overrides should load");
        assert_eq!(config.vault.kdf_iterations, 300_000);
        assert_eq!(config.log.level, "warn");
        Ok(())
    });
}
