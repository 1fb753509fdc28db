// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CipherVault - a local secret vault.
//!
//! This is the binary entry point.

mod commands;
mod shell;

use std::path::PathBuf;

use ciphervault_config::CipherVaultConfig;
use ciphervault_core::CipherVaultError;
use ciphervault_vault::{DEFAULT_TAIL_LINES, prompt_secret};
use clap::{Parser, Subcommand};
use colored::Colorize;

/// CipherVault - passphrase-sealed keystore with per-user keys.
#[derive(Parser, Debug)]
#[command(name = "ciphervault", version, about, long_about = None)]
struct Cli {
    /// Use this config file instead of the standard search path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the keystore if it does not exist yet.
    Init,
    /// Register a user; the fingerprint token is prompted.
    Register {
        username: String,
    },
    /// Encrypt text for the authenticated user.
    Encrypt {
        /// Text to encrypt. Read from stdin when omitted.
        #[arg(long)]
        text: Option<String>,
    },
    /// Decrypt text for the authenticated user.
    Decrypt {
        /// Ciphertext to decrypt. Defaults to the user's last ciphertext.
        #[arg(long)]
        ciphertext: Option<String>,
    },
    /// Switch new encryptions to another configured algorithm.
    Rotate,
    /// Print users, current algorithm, and rotation history as JSON.
    Show,
    /// Print a user's raw key (admin).
    ExportKey {
        username: String,
    },
    /// Print the tail of the audit log.
    Audit {
        /// Number of lines to show.
        #[arg(long, default_value_t = DEFAULT_TAIL_LINES)]
        lines: usize,
    },
    /// Launch the interactive menu (default).
    Shell,
}

fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            ciphervault_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log.level);

    if let Err(e) = run(cli.command.unwrap_or(Commands::Shell), &config) {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

fn load_config(
    path: Option<&std::path::Path>,
) -> Result<CipherVaultConfig, Vec<ciphervault_config::ConfigError>> {
    match path {
        Some(path) => ciphervault_config::load_and_validate_path(path),
        None => ciphervault_config::load_and_validate(),
    }
}

fn run(command: Commands, config: &CipherVaultConfig) -> Result<(), CipherVaultError> {
    let vault_config = &config.vault;
    match command {
        Commands::Init => {
            let existed = ciphervault_vault::Vault::exists(vault_config);
            commands::open_vault(vault_config)?;
            if existed {
                println!(
                    "Keystore already exists at {}.",
                    vault_config.paths().keystore().display()
                );
            } else {
                println!(
                    "Keystore created at {}.",
                    vault_config.paths().keystore().display()
                );
            }
        }
        Commands::Register { username } => {
            let mut vault = commands::open_vault(vault_config)?;
            let token = prompt_secret("Fingerprint token")?;
            println!("{}", commands::register(&mut vault, &username, &token)?);
        }
        Commands::Encrypt { text } => {
            let vault = commands::open_vault(vault_config)?;
            let user = commands::authenticate(&vault)?;
            let plaintext = match text {
                Some(text) => text,
                None => {
                    eprint!("Enter text to encrypt: ");
                    commands::read_line()?
                }
            };
            println!("{}", commands::encrypt(&vault, &user, &plaintext)?);
        }
        Commands::Decrypt { ciphertext } => {
            let vault = commands::open_vault(vault_config)?;
            let user = commands::authenticate(&vault)?;
            println!(
                "{}",
                commands::decrypt(&vault, &user, ciphertext.as_deref())?
            );
        }
        Commands::Rotate => {
            let mut vault = commands::open_vault(vault_config)?;
            println!("{}", commands::rotate(&mut vault)?);
        }
        Commands::Show => {
            let vault = commands::open_vault(vault_config)?;
            println!("{}", commands::render_summary(&vault.summary())?);
        }
        Commands::ExportKey { username } => {
            let vault = commands::open_vault(vault_config)?;
            println!("{}", commands::export_key(&vault, &username)?);
        }
        Commands::Audit { lines } => {
            println!("{}", commands::audit(vault_config, lines)?);
        }
        Commands::Shell => shell::run_shell(vault_config)?,
    }
    Ok(())
}

/// Initialize the tracing subscriber with an env filter.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ciphervault={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
