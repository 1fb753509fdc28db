// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./ciphervault.toml` > `~/.config/ciphervault/ciphervault.toml`
//! > `/etc/ciphervault/ciphervault.toml` with environment variable overrides
//! via the `CIPHERVAULT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::CipherVaultConfig;

/// Config sections that environment variables may target.
const ENV_SECTIONS: &[&str] = &["vault", "log"];

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/ciphervault/ciphervault.toml";

/// Local configuration file, relative to the working directory.
pub const LOCAL_CONFIG_PATH: &str = "ciphervault.toml";

/// User configuration file under the XDG config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ciphervault/ciphervault.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/ciphervault/ciphervault.toml`
/// 3. `~/.config/ciphervault/ciphervault.toml`
/// 4. `./ciphervault.toml`
/// 5. `CIPHERVAULT_*` environment variables
pub fn load_config() -> Result<CipherVaultConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env vars).
pub fn load_config_from_str(toml_content: &str) -> Result<CipherVaultConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CipherVaultConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CipherVaultConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CipherVaultConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for hierarchy loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(CipherVaultConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Environment provider mapping `CIPHERVAULT_<SECTION>_<KEY>` to `section.key`.
///
/// Only the first underscore after the section name is a separator, so
/// `CIPHERVAULT_VAULT_KDF_ITERATIONS` maps to `vault.kdf_iterations`.
/// Variables outside a known section (such as `CIPHERVAULT_PASSPHRASE`)
/// are not configuration and are skipped.
fn env_provider() -> Env {
    Env::prefixed("CIPHERVAULT_").filter_map(|key| {
        let key = key.as_str().to_ascii_lowercase();
        ENV_SECTIONS.iter().find_map(|section| {
            key.strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|field| format!("{section}.{field}").into())
        })
    })
}
