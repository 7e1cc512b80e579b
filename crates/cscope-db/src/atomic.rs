//! Atomic JSON persistence
//!
//! Writes go to a temp file in the target's directory, are flushed and synced,
//! then renamed over the target. A temp file that is never committed is
//! removed on drop and the previous document stays in place.

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Read and parse a JSON file. Returns `None` if the file does not exist.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    let data = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(data))
}

/// Serialize `data` and atomically replace `path` with it
pub fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    stage_json(path, data)?.commit()
}

/// A fully written and synced temp file waiting to be renamed into place
pub struct StagedWrite {
    temp: NamedTempFile,
    target: PathBuf,
}

/// First phase of an atomic write: everything except the rename
pub fn stage_json<T: Serialize>(path: &Path, data: &T) -> Result<StagedWrite> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create directory {}", parent.display()))?;

    let serialized = serde_json::to_string_pretty(data).context("Failed to serialize data")?;

    let mut temp = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;
    temp.write_all(serialized.as_bytes())
        .and_then(|_| temp.write_all(b"\n"))
        .and_then(|_| temp.flush())
        .and_then(|_| temp.as_file().sync_all())
        .with_context(|| format!("Failed to write temp file {}", temp.path().display()))?;

    Ok(StagedWrite {
        temp,
        target: path.to_path_buf(),
    })
}

impl StagedWrite {
    /// Path of the pending temp file
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    /// Rename the temp file over the target
    pub fn commit(self) -> Result<()> {
        let target = self.target;
        self.temp
            .persist(&target)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to replace {}", target.display()))?;
        debug!("Atomically wrote {}", target.display());
        Ok(())
    }
}
