// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret acquisition via TTY prompt or the CIPHERVAULT_PASSPHRASE environment variable.

use ciphervault_core::CipherVaultError;
use secrecy::SecretString;

/// The environment variable name for providing the master passphrase.
pub const PASSPHRASE_ENV_VAR: &str = "CIPHERVAULT_PASSPHRASE";

/// Get the master passphrase from the environment or an interactive prompt.
///
/// Priority:
/// 1. `CIPHERVAULT_PASSPHRASE` environment variable (for scripts and CI)
/// 2. Interactive TTY prompt via `rpassword`
pub fn get_passphrase() -> Result<SecretString, CipherVaultError> {
    if let Ok(value) = std::env::var(PASSPHRASE_ENV_VAR)
        && !value.is_empty()
    {
        return Ok(SecretString::from(value));
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return prompt_secret("Master passphrase");
    }

    Err(CipherVaultError::InvalidInput(format!(
        "no passphrase provided. Set {PASSPHRASE_ENV_VAR} or run interactively."
    )))
}

/// Read a secret (passphrase or fingerprint token) from the terminal without echo.
pub fn prompt_secret(label: &str) -> Result<SecretString, CipherVaultError> {
    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Err(CipherVaultError::InvalidInput(format!(
            "{label} must be entered on a terminal"
        )));
    }

    eprint!("{label}: ");
    let value = rpassword::read_password()
        .map_err(|e| CipherVaultError::InvalidInput(format!("failed to read {label}: {e}")))?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(CipherVaultError::InvalidInput(format!(
            "empty {label} not allowed"
        )));
    }
    Ok(SecretString::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;

    #[test]
    #[serial]
    fn get_passphrase_from_env_var() {
        // SAFETY: test-only env mutation, serialized.
        unsafe { std::env::set_var(PASSPHRASE_ENV_VAR, "correct-horse") };
        let result = get_passphrase();
        unsafe { std::env::remove_var(PASSPHRASE_ENV_VAR) };

        assert_eq!(result.unwrap().expose_secret(), "correct-horse");
    }

    #[test]
    #[serial]
    fn empty_env_var_is_ignored() {
        unsafe { std::env::set_var(PASSPHRASE_ENV_VAR, "") };
        // Under the test harness stdin is not a terminal.
        let result = get_passphrase();
        unsafe { std::env::remove_var(PASSPHRASE_ENV_VAR) };

        if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
            assert!(result.is_err());
        }
    }

    #[test]
    fn prompt_requires_terminal() {
        if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
            assert!(matches!(
                prompt_secret("Fingerprint token"),
                Err(CipherVaultError::InvalidInput(_))
            ));
        }
    }
}
