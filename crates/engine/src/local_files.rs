// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Local File Manager: resolves a job's workflow document and its
//! referenced input files, manages the per-job output directory, and
//! publishes produced outputs under it.
//!
//! Grounded method-for-method on
//! `original_source/simple_cwl_xenon_service/job_manager/local_files.py`,
//! reworked into a `Result`-returning API over [`cerise_storage::JobStore`]
//! rather than a property-accessor job object.

use crate::cwl::{FlatCwlBindings, WorkflowBindings};
use crate::error::LocalFileError;
use cerise_core::{Clock, FileDescriptor, JobId};
use cerise_storage::JobStore;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct LocalFileManager<C: Clock> {
    store: Arc<JobStore<C>>,
    base_dir: PathBuf,
    /// `store-location-client`: the externally visible base URL
    /// published outputs are reachable at.
    base_url: String,
    http: reqwest::Client,
    bindings: Arc<dyn WorkflowBindings>,
}

impl<C: Clock> LocalFileManager<C> {
    pub fn new(store: Arc<JobStore<C>>, base_dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self::with_bindings(store, base_dir, base_url, Arc::new(FlatCwlBindings))
    }

    pub fn with_bindings(
        store: Arc<JobStore<C>>,
        base_dir: impl Into<PathBuf>,
        base_url: impl Into<String>,
        bindings: Arc<dyn WorkflowBindings>,
    ) -> Self {
        LocalFileManager {
            store,
            base_dir: base_dir.into(),
            base_url: base_url.into(),
            http: reqwest::Client::new(),
            bindings,
        }
    }

    fn output_dir(&self, job_id: &JobId) -> PathBuf {
        self.base_dir.join("output").join(job_id.to_string())
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, LocalFileError> {
        if let Some(path) = url.strip_prefix("file://") {
            return tokio::fs::read(path).await.map_err(LocalFileError::Io);
        }
        if url.starts_with("http://") || url.starts_with("https://") {
            let response =
                self.http.get(url).send().await.map_err(|err| LocalFileError::Http(err.to_string()))?;
            if !response.status().is_success() {
                return Err(LocalFileError::Http(format!("GET {url}: {}", response.status())));
            }
            return Ok(response.bytes().await.map_err(|err| LocalFileError::Http(err.to_string()))?.to_vec());
        }
        Err(LocalFileError::UnsupportedScheme(url.to_string()))
    }

    /// Read `workflow` and `local_input`, load every referenced input
    /// file's bytes, and write `workflow_content` on success.
    pub async fn resolve_input(&self, job_id: &JobId) -> Result<Vec<FileDescriptor>, LocalFileError> {
        let job = self.store.get(job_id).ok_or_else(|| LocalFileError::UnknownJob(job_id.to_string()))?;

        let workflow_bytes = self.fetch_bytes(&job.workflow).await.map_err(|err| match err {
            LocalFileError::UnsupportedScheme(scheme) => LocalFileError::UnsupportedScheme(scheme),
            other => LocalFileError::InvalidWorkflow(other.to_string()),
        })?;

        let bindings = self.bindings.file_bindings(&job.local_input)?;

        let mut descriptors = Vec::with_capacity(bindings.len());
        for binding in &bindings {
            let bytes = self.fetch_bytes(&binding.location).await.map_err(|err| match err {
                LocalFileError::UnsupportedScheme(scheme) => LocalFileError::UnsupportedScheme(scheme),
                _ => LocalFileError::InputNotFound(binding.location.clone()),
            })?;
            descriptors.push(FileDescriptor::new(binding.name.clone(), binding.basename.clone(), bytes));
        }

        self.store.with_store(|jobs| {
            if let Some(job) = jobs.get_mut(job_id) {
                job.workflow_content = Some(workflow_bytes);
            }
        });

        tracing::debug!(job_id = %job_id, files = descriptors.len(), "resolved job input");
        Ok(descriptors)
    }

    /// Idempotent: create `<base>/output/<id>`.
    pub async fn create_output_dir(&self, job_id: &JobId) -> Result<(), LocalFileError> {
        tokio::fs::create_dir_all(self.output_dir(job_id)).await?;
        Ok(())
    }

    /// Idempotent: remove `<base>/output/<id>` and everything in it. A
    /// missing directory is not an error.
    pub async fn delete_output_dir(&self, job_id: &JobId) -> Result<(), LocalFileError> {
        match tokio::fs::remove_dir_all(self.output_dir(job_id)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Write each produced output under the job's output directory and
    /// rewrite `local_output` to reference it by external URL and
    /// absolute local path.
    ///
    /// `None` or an empty slice means "no outputs produced": the
    /// directory is left untouched and `local_output` is not
    /// overwritten, matching `test_publish_no_output` in the original's
    /// test suite.
    pub async fn publish_job_output(
        &self,
        job_id: &JobId,
        outputs: Option<&[FileDescriptor]>,
    ) -> Result<(), LocalFileError> {
        let Some(outputs) = outputs else { return Ok(()) };
        if outputs.is_empty() {
            return Ok(());
        }

        let job = self.store.get(job_id).ok_or_else(|| LocalFileError::UnknownJob(job_id.to_string()))?;
        let mut output = job.remote_output.clone().unwrap_or_else(|| Value::Object(Default::default()));

        let dir = self.output_dir(job_id);
        for descriptor in outputs {
            let file_path = dir.join(&descriptor.basename);
            write_atomic(&file_path, &descriptor.bytes).await?;

            let external_url = format!(
                "{}/output/{}/{}",
                self.base_url.trim_end_matches('/'),
                job_id,
                descriptor.basename
            );

            if let Value::Object(map) = &mut output {
                let entry = map.entry(descriptor.binding.clone()).or_insert_with(|| Value::Object(Default::default()));
                if let Value::Object(entry_map) = entry {
                    entry_map.insert("location".to_string(), Value::String(external_url));
                    entry_map.insert("path".to_string(), Value::String(file_path.display().to_string()));
                    entry_map.insert("basename".to_string(), Value::String(descriptor.basename.clone()));
                }
            }
        }

        self.store.with_store(|jobs| {
            if let Some(job) = jobs.get_mut(job_id) {
                job.local_output = Some(output);
            }
        });

        tracing::debug!(job_id = %job_id, files = outputs.len(), "published job output");
        Ok(())
    }
}

/// Write `bytes` to `path` via a temp file + rename so a reader never
/// observes a partial write; a failed write leaves no temp file behind
/// to collide with a retry.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), LocalFileError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("tmp-write");
    if let Err(err) = tokio::fs::write(&tmp, bytes).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(err.into());
    }
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
#[path = "local_files_tests.rs"]
mod tests;
