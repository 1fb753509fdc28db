// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Binary-level tests for the non-interactive subcommands.
//!
//! Each test writes its own config file pointing at a fresh data directory
//! and passes the passphrase through the environment.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn setup() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("ciphervault.toml");
    let data_dir = dir.path().join("data");
    std::fs::write(
        &config,
        format!(
            "[vault]\ndata_dir = '{}'\nkdf_iterations = 100000\n\n[log]\nlevel = \"warn\"\n",
            data_dir.display()
        ),
    )
    .unwrap();
    (dir, config)
}

fn run(config: &Path, passphrase: Option<&str>, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ciphervault"));
    cmd.arg("--config")
        .arg(config)
        .args(args)
        .env("NO_COLOR", "1")
        .env("CLICOLOR", "0")
        .env_remove("RUST_LOG")
        .env_remove("CIPHERVAULT_PASSPHRASE");
    if let Some(passphrase) = passphrase {
        cmd.env("CIPHERVAULT_PASSPHRASE", passphrase);
    }
    cmd.output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_init_creates_then_reports_existing_keystore() {
    let (_dir, config) = setup();

    let first = run(&config, Some("correct-horse"), &["init"]);
    assert!(first.status.success(), "{}", stderr(&first));
    assert!(stdout(&first).contains("Keystore created"));

    let second = run(&config, Some("correct-horse"), &["init"]);
    assert!(second.status.success());
    assert!(stdout(&second).contains("Keystore already exists"));
}

#[test]
fn test_wrong_passphrase_exits_with_error() {
    let (_dir, config) = setup();
    assert!(run(&config, Some("correct-horse"), &["init"]).status.success());

    let output = run(&config, Some("battery-staple"), &["show"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("error: master passphrase does not match"));
}

#[test]
fn test_show_rotate_and_audit() {
    let (_dir, config) = setup();

    let show = run(&config, Some("pw"), &["show"]);
    assert!(show.status.success(), "{}", stderr(&show));
    let summary: serde_json::Value = serde_json::from_str(&stdout(&show)).unwrap();
    assert_eq!(summary["current_algo"], "aes256-gcm");
    assert!(summary["users"].as_object().unwrap().is_empty());

    let rotate = run(&config, Some("pw"), &["rotate"]);
    assert!(rotate.status.success(), "{}", stderr(&rotate));
    assert!(stdout(&rotate).contains("aes256-gcm -> chacha20-poly1305"));

    let audit = run(&config, None, &["audit", "--lines", "1"]);
    assert!(audit.status.success());
    assert!(
        stdout(&audit)
            .trim_end()
            .ends_with("ROTATE from=aes256-gcm to=chacha20-poly1305")
    );
}

#[test]
fn test_export_unknown_user_fails() {
    let (_dir, config) = setup();
    let output = run(&config, Some("pw"), &["export-key", "ghost"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("no key for user `ghost`"));
}

#[test]
fn test_missing_passphrase_without_terminal_fails() {
    let (_dir, config) = setup();
    let output = run(&config, None, &["show"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("CIPHERVAULT_PASSPHRASE"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bad.toml");
    std::fs::write(&config, "[vault]\nkdf_iterations = 10\n").unwrap();

    let output = run(&config, Some("pw"), &["show"]);
    assert_eq!(output.status.code(), Some(1));
}
