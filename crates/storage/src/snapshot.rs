// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic snapshot persistence for the job store.
//!
//! The whole materialized job map is written to a single JSON file on
//! every mutating store operation. Writes go to a temp file in the same
//! directory and are renamed into place, so a crash mid-write never
//! corrupts the file readers see; the previous snapshot is kept as a
//! single rotated `.bak` in case the new write itself is bad.

use crate::error::StorageError;
use cerise_core::{Job, JobId};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

fn bak_path(path: &Path) -> PathBuf {
    path.with_extension("bak")
}

fn tmp_path(path: &Path) -> PathBuf {
    path.with_extension("tmp")
}

/// Write `jobs` to `path`, rotating the previous contents of `path` into
/// a `.bak` sibling first. No-op-safe: on any failure the original file
/// at `path` is left untouched.
pub fn write_snapshot(path: &Path, jobs: &HashMap<JobId, Job>) -> Result<(), StorageError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }

    let tmp = tmp_path(path);
    let body = serde_json::to_vec_pretty(jobs)?;
    fs::write(&tmp, body)?;

    if path.exists() {
        fs::rename(path, bak_path(path))?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Load a previously written snapshot, falling back to the rotated
/// backup if the primary file is missing or unreadable, and to an empty
/// map if neither exists.
pub fn load_snapshot(path: &Path) -> Result<HashMap<JobId, Job>, StorageError> {
    match read_one(path) {
        Ok(Some(jobs)) => return Ok(jobs),
        Ok(None) => {}
        Err(err) => {
            tracing::warn!(error = %err, path = %path.display(), "primary snapshot unreadable, trying backup");
        }
    }

    match read_one(&bak_path(path)) {
        Ok(Some(jobs)) => Ok(jobs),
        Ok(None) => Ok(HashMap::new()),
        Err(err) => {
            tracing::warn!(error = %err, path = %path.display(), "backup snapshot unreadable, starting empty");
            Ok(HashMap::new())
        }
    }
}

fn read_one(path: &Path) -> Result<Option<HashMap<JobId, Job>>, StorageError> {
    if !path.exists() {
        return Ok(None);
    }
    let body = fs::read(path)?;
    let jobs = serde_json::from_slice(&body)?;
    Ok(Some(jobs))
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
