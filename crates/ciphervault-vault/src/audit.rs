// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only audit log of security-relevant events.
//!
//! One UTF-8 line per event: `<RFC 3339 UTC timestamp> <TAG> key=value ...`.
//! The file is only ever opened in append mode. Tokens, passphrases, key
//! material, and plaintext never appear in an entry.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use ciphervault_core::CipherVaultError;
use tracing::warn;

use crate::persist::now_iso;

/// Number of lines the audit viewer shows by default.
pub const DEFAULT_TAIL_LINES: usize = 200;

/// Handle to the audit log file.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped line. Control characters in `entry` are
    /// escaped so one event is always one line.
    pub fn append(&self, entry: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{} {}", now_iso(), single_line(entry))
    }

    /// Append one line, reporting a failure as a warning instead of an error.
    ///
    /// Returns whether the entry was written so callers can surface the miss.
    pub fn record(&self, entry: &str) -> bool {
        match self.append(entry) {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "audit log append failed"
                );
                false
            }
        }
    }

    /// The last `n` lines of the log, oldest first. Empty if no log exists yet.
    pub fn tail(&self, n: usize) -> Result<Vec<String>, CipherVaultError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CipherVaultError::storage(&self.path, e)),
        };
        let lines: Vec<&str> = content.lines().collect();
        let start = lines.len().saturating_sub(n);
        Ok(lines[start..].iter().map(|l| l.to_string()).collect())
    }
}

fn single_line(entry: &str) -> String {
    entry
        .trim_end()
        .chars()
        .map(|c| {
            if c.is_control() {
                c.escape_default().to_string()
            } else {
                c.to_string()
            }
        })
        .collect()
}
