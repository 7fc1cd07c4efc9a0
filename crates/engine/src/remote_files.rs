// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Remote File Manager: stages a job's workflow and inputs onto the
//! remote work tree, destages its outputs, and mirrors the shared API
//! directory, all through an injected [`Transport`].
//!
//! Path/naming conventions (`jobs/<id>/work/NN_input_<basename>`, the
//! `api/` shared tree) are grounded on
//! `original_source/.../test_xenon_remote_files.py`.

use crate::error::RemoteFileError;
use cerise_adapters::{Transport, TransportError};
use cerise_core::{Clock, FileDescriptor, JobId};
use cerise_storage::JobStore;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

pub struct RemoteFileManager<C: Clock> {
    store: Arc<JobStore<C>>,
    transport: Arc<dyn Transport>,
    /// Absolute remote base path (`files.path`), used only to compute
    /// the `remote_*` path strings recorded on the job — every call
    /// into `transport` itself uses a path relative to its own root.
    remote_base: String,
}

impl<C: Clock> RemoteFileManager<C> {
    pub fn new(store: Arc<JobStore<C>>, transport: Arc<dyn Transport>, remote_base: impl Into<String>) -> Self {
        RemoteFileManager { store, transport, remote_base: remote_base.into() }
    }

    fn abs(&self, rel: &str) -> String {
        if self.remote_base.is_empty() {
            rel.to_string()
        } else {
            format!("{}/{}", self.remote_base.trim_end_matches('/'), rel)
        }
    }

    async fn try_read(&self, path: &str) -> Result<Vec<u8>, RemoteFileError> {
        match self.transport.read_file(path).await {
            Ok(bytes) => Ok(bytes),
            Err(TransportError::NotFound(_)) => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    /// Mirror `local_api_dir` onto the remote `api/` tree, preserving
    /// relative paths. Idempotent: re-running overwrites with the same
    /// content.
    pub async fn stage_api(&self, local_api_dir: &Path) -> Result<(), RemoteFileError> {
        let mut stack = vec![(local_api_dir.to_path_buf(), String::new())];
        while let Some((dir, rel)) = stack.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await.map_err(TransportError::Io)?;
            while let Some(entry) = entries.next_entry().await.map_err(TransportError::Io)? {
                let file_type = entry.file_type().await.map_err(TransportError::Io)?;
                let name = entry.file_name().to_string_lossy().into_owned();
                let child_rel = if rel.is_empty() { name } else { format!("{rel}/{name}") };
                if file_type.is_dir() {
                    stack.push((entry.path(), child_rel));
                } else {
                    let bytes = tokio::fs::read(entry.path()).await.map_err(TransportError::Io)?;
                    self.transport.write_file(&format!("api/{child_rel}"), &bytes).await?;
                }
            }
        }
        tracing::debug!(dir = %local_api_dir.display(), "staged shared api tree");
        Ok(())
    }

    /// Create `jobs/<id>/work/`, write the workflow document and every
    /// input file there with a deterministic `NN_input_<basename>`
    /// name (sequence number reflecting binding order), and write the
    /// rewritten input JSON with remote `location`s. Atomic from the
    /// caller's perspective: on failure the partial work directory is
    /// removed.
    pub async fn stage_job(&self, job_id: &JobId, input_files: &[FileDescriptor]) -> Result<(), RemoteFileError> {
        match self.stage_job_inner(job_id, input_files).await {
            Ok(()) => Ok(()),
            Err(err) => {
                let _ = self.transport.remove_tree(&format!("jobs/{job_id}")).await;
                Err(err)
            }
        }
    }

    async fn stage_job_inner(&self, job_id: &JobId, input_files: &[FileDescriptor]) -> Result<(), RemoteFileError> {
        let job = self.store.get(job_id).ok_or_else(|| RemoteFileError::UnknownJob(job_id.to_string()))?;
        let work_rel = format!("jobs/{job_id}/work");
        self.transport.create_dir(&work_rel).await?;

        let workflow_rel = format!("{work_rel}/workflow.cwl");
        let workflow_bytes = job.workflow_content.clone().unwrap_or_default();
        self.transport.write_file(&workflow_rel, &workflow_bytes).await?;

        let mut input_json = job.local_input.clone();
        for (index, descriptor) in input_files.iter().enumerate() {
            let remote_name = format!("{:02}_input_{}", index + 1, descriptor.basename);
            let file_rel = format!("{work_rel}/{remote_name}");
            self.transport.write_file(&file_rel, &descriptor.bytes).await?;

            if let Value::Object(fields) = &mut input_json {
                if let Some(Value::Object(entry)) = fields.get_mut(&descriptor.binding) {
                    entry.insert("location".to_string(), Value::String(self.abs(&file_rel)));
                }
            }
        }

        let input_rel = format!("{work_rel}/input.json");
        self.transport.write_file(&input_rel, serde_json::to_vec(&input_json)?.as_slice()).await?;

        let stdout_rel = format!("{work_rel}/stdout");
        let stderr_rel = format!("{work_rel}/stderr");

        self.store.with_store(|jobs| {
            if let Some(job) = jobs.get_mut(job_id) {
                job.remote_workdir_path = Some(self.abs(&work_rel));
                job.remote_workflow_path = Some(self.abs(&workflow_rel));
                job.remote_input_path = Some(self.abs(&input_rel));
                job.remote_stdout_path = Some(self.abs(&stdout_rel));
                job.remote_stderr_path = Some(self.abs(&stderr_rel));
            }
        });

        tracing::debug!(job_id = %job_id, files = input_files.len(), "staged job work directory");
        Ok(())
    }

    /// Read and parse the remote stdout dump as the workflow runner's
    /// JSON output description, then read each declared output file's
    /// bytes from the remote work directory. A declared file that
    /// can't be found is dropped (and logged), not an error.
    pub async fn destage_job_output(&self, job_id: &JobId) -> Result<Vec<FileDescriptor>, RemoteFileError> {
        let work_rel = format!("jobs/{job_id}/work");
        let stdout_bytes = self.transport.read_file(&format!("{work_rel}/stdout")).await?;
        let description: Value = serde_json::from_slice(&stdout_bytes)?;

        let mut outputs = Vec::new();
        let Value::Object(fields) = &description else {
            return Ok(outputs);
        };
        for (name, entry) in fields {
            let Value::Object(entry) = entry else { continue };
            let Some(basename) = entry.get("basename").and_then(Value::as_str) else { continue };
            let file_rel = format!("{work_rel}/{basename}");
            match self.transport.read_file(&file_rel).await {
                Ok(bytes) => outputs.push(FileDescriptor::new(name.clone(), basename.to_string(), bytes)),
                Err(TransportError::NotFound(_)) => {
                    self.store.append_log(
                        job_id,
                        &format!("declared output '{name}' ({basename}) was not produced, dropping"),
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }
        tracing::debug!(job_id = %job_id, files = outputs.len(), "destaged job output");
        Ok(outputs)
    }

    /// Read remote stdout/stderr. Stdout (parsed as JSON) becomes
    /// `remote_output`; stderr is appended to the job's log. Either
    /// file may not exist yet if the run hasn't produced it; that's
    /// not an error here.
    pub async fn update_job(&self, job_id: &JobId) -> Result<(), RemoteFileError> {
        let work_rel = format!("jobs/{job_id}/work");
        let stdout_bytes = self.try_read(&format!("{work_rel}/stdout")).await?;
        let stderr_bytes = self.try_read(&format!("{work_rel}/stderr")).await?;

        if let Ok(remote_output) = serde_json::from_slice::<Value>(&stdout_bytes) {
            self.store.with_store(|jobs| {
                if let Some(job) = jobs.get_mut(job_id) {
                    job.remote_output = Some(remote_output);
                }
            });
        }

        let stderr_text = String::from_utf8_lossy(&stderr_bytes);
        if !stderr_text.trim().is_empty() {
            self.store.append_log(job_id, stderr_text.trim_end());
        }
        Ok(())
    }

    /// Remove `jobs/<id>/` recursively. Idempotent.
    pub async fn delete_job(&self, job_id: &JobId) -> Result<(), RemoteFileError> {
        self.transport.remove_tree(&format!("jobs/{job_id}")).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "remote_files_tests.rs"]
mod tests;
