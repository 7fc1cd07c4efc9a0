// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pluggable file-transfer backends for the Remote File Manager.

pub mod local;
pub mod ssh;
pub mod webdav;

use crate::error::TransportError;
use async_trait::async_trait;

/// A remote filesystem surface the Remote File Manager stages jobs onto
/// and destages outputs from. One implementation per supported access
/// method (plain local directory, SFTP over SSH, WebDAV).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Create `path` and any missing parents.
    async fn create_dir(&self, path: &str) -> Result<(), TransportError>;

    /// Write `bytes` to `path`, creating or truncating it.
    async fn write_file(&self, path: &str, bytes: &[u8]) -> Result<(), TransportError>;

    /// Read the full contents of `path`.
    async fn read_file(&self, path: &str) -> Result<Vec<u8>, TransportError>;

    /// List the basenames of entries directly inside `path`.
    async fn list_dir(&self, path: &str) -> Result<Vec<String>, TransportError>;

    /// Recursively remove `path`, whether file or directory. Not an
    /// error if `path` is already absent.
    async fn remove_tree(&self, path: &str) -> Result<(), TransportError>;
}

impl std::fmt::Debug for dyn Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Transport")
    }
}
