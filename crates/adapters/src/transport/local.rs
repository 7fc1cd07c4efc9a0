// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `local` transport: stages jobs onto the same filesystem the
//! daemon runs on, useful when the job runner is also `local` (a forked
//! subprocess) rather than a genuinely remote resource.

use super::Transport;
use crate::error::TransportError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub struct LocalTransport {
    root: PathBuf,
}

impl LocalTransport {
    /// `root` is prepended to every relative path passed to the trait
    /// methods; absolute paths are used as-is.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalTransport { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn create_dir(&self, path: &str) -> Result<(), TransportError> {
        let path = self.resolve(path);
        tokio::fs::create_dir_all(path).await?;
        Ok(())
    }

    async fn write_file(&self, path: &str, bytes: &[u8]) -> Result<(), TransportError> {
        let path = self.resolve(path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    async fn read_file(&self, path: &str) -> Result<Vec<u8>, TransportError> {
        let path = self.resolve(path);
        tokio::fs::read(&path).await.map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                TransportError::NotFound(path.display().to_string())
            } else {
                TransportError::Io(err)
            }
        })
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<String>, TransportError> {
        let path = self.resolve(path);
        let mut entries = tokio::fs::read_dir(&path).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    async fn remove_tree(&self, path: &str) -> Result<(), TransportError> {
        let path = self.resolve(path);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => tokio::fs::remove_dir_all(&path).await?,
            Ok(_) => tokio::fs::remove_file(&path).await?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
