// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes: KDF cost floors, a usable algorithm list, non-empty paths.

use std::collections::HashSet;

pub use ciphervault_core::MIN_KDF_ITERATIONS;

use crate::diagnostic::ConfigError;
use crate::model::CipherVaultConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure rather than stopping at the first.
pub fn validate_config(config: &CipherVaultConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let vault = &config.vault;

    if vault.data_dir.as_os_str().is_empty() {
        errors.push(ConfigError::Validation {
            message: "vault.data_dir must not be empty".to_string(),
        });
    }

    if vault.kdf_iterations < MIN_KDF_ITERATIONS {
        errors.push(ConfigError::Validation {
            message: format!(
                "vault.kdf_iterations must be at least {MIN_KDF_ITERATIONS}, got {}",
                vault.kdf_iterations
            ),
        });
    }

    if vault.algorithms.is_empty() {
        errors.push(ConfigError::Validation {
            message: "vault.algorithms must list at least one algorithm".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for algorithm in &vault.algorithms {
        if !seen.insert(algorithm) {
            errors.push(ConfigError::Validation {
                message: format!("duplicate algorithm `{algorithm}` in vault.algorithms"),
            });
        }
    }

    if !LOG_LEVELS.contains(&config.log.level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` must be one of: {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ciphervault_core::Algorithm;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&CipherVaultConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = CipherVaultConfig::default();
        config.vault.kdf_iterations = 10;
        config.vault.algorithms = vec![Algorithm::Aes256Gcm, Algorithm::Aes256Gcm];
        config.log.level = "loud".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn kdf_floor_applies_to_parsed_files() {
        let config: CipherVaultConfig = toml::from_str(
            r#"
[vault]
kdf_iterations = 99999
algorithms = ["chacha20-poly1305"]
"#,
        )
        .unwrap();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains(&MIN_KDF_ITERATIONS.to_string()));
    }

    #[test]
    fn rejects_empty_algorithm_list() {
        let mut config = CipherVaultConfig::default();
        config.vault.algorithms.clear();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("at least one algorithm"));
    }
}
