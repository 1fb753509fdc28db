// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ciphervault shell` command implementation.
//!
//! Unlocks the vault once, then runs a numbered menu until the user exits.
//! Errors from a single action are printed and the menu continues.

use ciphervault_config::model::VaultConfig;
use ciphervault_core::CipherVaultError;
use ciphervault_vault::{DEFAULT_TAIL_LINES, Vault, prompt_secret};
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::commands;

/// A menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Register,
    Encrypt,
    Decrypt,
    Rotate,
    Show,
    Export,
    Audit,
    Exit,
}

const MENU: [(&str, MenuChoice, &str); 8] = [
    ("1", MenuChoice::Register, "Register user"),
    ("2", MenuChoice::Encrypt, "Encrypt text"),
    ("3", MenuChoice::Decrypt, "Decrypt text"),
    ("4", MenuChoice::Rotate, "Rotate algorithm"),
    ("5", MenuChoice::Show, "Show keystore (summary)"),
    ("6", MenuChoice::Export, "Export user key (admin)"),
    ("7", MenuChoice::Audit, "View audit log"),
    ("8", MenuChoice::Exit, "Exit"),
];

fn parse_choice(input: &str) -> Option<MenuChoice> {
    let input = input.trim();
    MENU.iter()
        .find(|(key, _, _)| *key == input)
        .map(|(_, choice, _)| *choice)
}

fn print_menu() {
    println!("\n{}", "Menu:".bold());
    for (key, _, label) in MENU {
        println!("{}) {label}", key.cyan());
    }
}

/// Read one visible line; `None` on Ctrl+C / Ctrl+D.
fn read_line(rl: &mut DefaultEditor, prompt: &str) -> Result<Option<String>, CipherVaultError> {
    match rl.readline(prompt) {
        Ok(line) => Ok(Some(line)),
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
        Err(e) => Err(CipherVaultError::InvalidInput(format!(
            "failed to read input: {e}"
        ))),
    }
}

/// Runs the interactive menu.
pub fn run_shell(config: &VaultConfig) -> Result<(), CipherVaultError> {
    println!("{}", "CipherVault - secure vault".bold().green());
    let mut vault = commands::open_vault(config)?;

    let mut rl = DefaultEditor::new().map_err(|e| {
        CipherVaultError::InvalidInput(format!("failed to initialize readline: {e}"))
    })?;

    loop {
        print_menu();
        let Some(line) = read_line(&mut rl, "Choice: ")? else {
            break;
        };
        let Some(choice) = parse_choice(&line) else {
            println!("{}", "Unknown option.".yellow());
            continue;
        };
        if choice == MenuChoice::Exit {
            break;
        }

        debug!(?choice, "menu action");
        match handle_choice(choice, &mut vault, config, &mut rl) {
            Ok(Some(output)) => println!("{output}"),
            Ok(None) => {}
            Err(e) => eprintln!("{}: {e}", "error".red()),
        }
    }

    println!("{}", "Exiting.".dimmed());
    Ok(())
}

fn handle_choice(
    choice: MenuChoice,
    vault: &mut Vault,
    config: &VaultConfig,
    rl: &mut DefaultEditor,
) -> Result<Option<String>, CipherVaultError> {
    match choice {
        MenuChoice::Register => {
            let Some(username) = read_line(rl, "Enter username: ")? else {
                return Ok(None);
            };
            let token = prompt_secret("Fingerprint token")?;
            commands::register(vault, username.trim(), &token).map(Some)
        }
        MenuChoice::Encrypt => {
            let user = commands::authenticate(vault)?;
            let Some(plaintext) = read_line(rl, "Enter text to encrypt: ")? else {
                return Ok(None);
            };
            let ciphertext = commands::encrypt(vault, &user, &plaintext)?;
            Ok(Some(format!(
                "Encrypted text saved for {user}:\n{ciphertext}"
            )))
        }
        MenuChoice::Decrypt => {
            let user = commands::authenticate(vault)?;
            let Some(input) =
                read_line(rl, "Paste ciphertext or leave blank to read last file: ")?
            else {
                return Ok(None);
            };
            let plaintext = commands::decrypt(vault, &user, Some(&input))?;
            Ok(Some(format!("Decrypted text:\n\n{plaintext}")))
        }
        MenuChoice::Rotate => commands::rotate(vault).map(Some),
        MenuChoice::Show => commands::render_summary(&vault.summary()).map(Some),
        MenuChoice::Export => {
            let Some(username) = read_line(rl, "Enter username to export key: ")? else {
                return Ok(None);
            };
            commands::export_key(vault, username.trim()).map(Some)
        }
        MenuChoice::Audit => commands::audit(config, DEFAULT_TAIL_LINES).map(Some),
        MenuChoice::Exit => Ok(None),
    }
}
