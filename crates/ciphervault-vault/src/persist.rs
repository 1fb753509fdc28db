// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Crash-safe file writes and JSON load/save helpers.
//!
//! Writes go to a temporary sibling file which is synced and then renamed
//! over the destination. The rename is the only step that makes new content
//! visible, so a reader sees either the old file or the new one in full.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a JSON file could not be loaded.
#[derive(Debug, Error)]
pub enum JsonError {
    #[error("read failed: {0}")]
    Io(#[from] io::Error),

    #[error("parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Current UTC time as RFC 3339 with microseconds and a `Z` suffix.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A write that has reached a temporary file but is not yet visible.
///
/// Dropping it without [`StagedWrite::commit`] removes the temporary file and
/// leaves the destination untouched.
#[derive(Debug)]
pub struct StagedWrite {
    temp_path: PathBuf,
    final_path: PathBuf,
    committed: bool,
}

impl StagedWrite {
    /// Write `data` to a synced temporary sibling of `path`.
    pub fn new(path: &Path, data: &[u8]) -> io::Result<Self> {
        let parent = parent_dir(path);
        fs::create_dir_all(parent)?;

        let file_name = path.file_name().and_then(|s| s.to_str()).unwrap_or("file");
        let temp_path = parent.join(format!(".{file_name}.tmp.{}", uuid::Uuid::new_v4()));

        let staged = Self {
            temp_path,
            final_path: path.to_path_buf(),
            committed: false,
        };

        let mut file = File::create(&staged.temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        Ok(staged)
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Atomically rename the temporary file over the destination.
    ///
    /// Once the rename succeeds the new content is in place, so a failure to
    /// sync the directory afterwards is logged rather than returned.
    pub fn commit(mut self) -> io::Result<()> {
        fs::rename(&self.temp_path, &self.final_path)?;
        self.committed = true;
        sync_parent(&self.final_path);
        Ok(())
    }
}

impl Drop for StagedWrite {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.temp_path);
        }
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Flush the directory entry of `path`, warning on failure.
fn sync_parent(path: &Path) {
    let dir = parent_dir(path);
    if let Err(e) = fsync_dir(dir) {
        warn!(dir = %dir.display(), error = %e, "directory sync after rename failed");
    }
}

#[cfg(unix)]
fn fsync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn fsync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

/// Replace the contents of `path` with `data` atomically.
pub fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    StagedWrite::new(path, data)?.commit()
}

/// Load JSON from `path`, distinguishing a missing file (`Ok(None)`) from
/// an unreadable or unparsable one.
pub fn try_load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, JsonError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_slice(&bytes)?))
}

/// Load JSON from `path`, yielding `T::default()` when the file is absent
/// or cannot be parsed.
pub fn load_json<T: DeserializeOwned + Default>(path: &Path) -> T {
    match try_load_json(path) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "falling back to default JSON value");
            T::default()
        }
    }
}

/// Serialize `value` as pretty JSON and write it atomically.
pub fn save_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), JsonError> {
    let data = serde_json::to_vec_pretty(value)?;
    atomic_write(path, &data)?;
    Ok(())
}
