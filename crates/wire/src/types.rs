// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DTOs exchanged between [`cerise-daemon`]'s `JobService` facade and
//! whatever external REST surface is layered on top of it. Kept separate
//! from [`cerise_core::Job`] so the wire shape can diverge from the
//! internal record without touching the job store.

use cerise_core::{Job, JobId, JobState};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a job-creation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateJobRequest {
    pub name: String,
    pub workflow: String,
    #[serde(default = "default_input")]
    pub local_input: Value,
}

fn default_input() -> Value {
    Value::Object(Default::default())
}

/// One-line summary for list views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobSummary {
    pub id: JobId,
    pub name: String,
    pub state: JobState,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        JobSummary {
            id: job.id,
            name: job.name.clone(),
            state: job.state,
            created_at_ms: job.created_at_ms,
            updated_at_ms: job.updated_at_ms,
        }
    }
}

/// Full record, including the append-only log and any produced outputs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobRecord {
    pub id: JobId,
    pub name: String,
    pub workflow: String,
    pub local_input: Value,
    pub state: JobState,
    pub please_delete: bool,
    pub log: String,
    pub remote_job_id: Option<String>,
    pub remote_output: Option<Value>,
    pub local_output: Option<Value>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl From<&Job> for JobRecord {
    fn from(job: &Job) -> Self {
        JobRecord {
            id: job.id,
            name: job.name.clone(),
            workflow: job.workflow.clone(),
            local_input: job.local_input.clone(),
            state: job.state,
            please_delete: job.please_delete,
            log: job.log.clone(),
            remote_job_id: job.remote_job_id.clone(),
            remote_output: job.remote_output.clone(),
            local_output: job.local_output.clone(),
            created_at_ms: job.created_at_ms,
            updated_at_ms: job.updated_at_ms,
        }
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
