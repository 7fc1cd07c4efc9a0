// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifier, state machine, and the job record.

use crate::descriptor::FileDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

crate::define_id! {
    /// Unique identifier for a job instance.
    ///
    /// Minted on submission and immutable thereafter; used to look the job
    /// up in the store, to name its remote work directory, and to reference
    /// it in the REST surface.
    pub struct JobId("job-");
}

/// Lifecycle state of a job, per the resolve -> stage -> run -> update ->
/// destage -> publish -> done pipeline.
///
/// `Waiting_CR`/`Running_CR` are cancellation-in-progress shadows of
/// `Waiting`/`Running`: entered on a cancellation request, exited to
/// `Cancelled` once the scheduler confirms the remote job is gone, or to
/// `Finished` if completion beats cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobState {
    Submitted,
    Resolved,
    Staged,
    Waiting,
    Running,
    Finished,
    Destaged,
    Success,
    PermanentFailure,
    SystemError,
    Cancelled,
    #[serde(rename = "Waiting_CR")]
    WaitingCr,
    #[serde(rename = "Running_CR")]
    RunningCr,
}

crate::simple_display! {
    JobState {
        Submitted => "Submitted",
        Resolved => "Resolved",
        Staged => "Staged",
        Waiting => "Waiting",
        Running => "Running",
        Finished => "Finished",
        Destaged => "Destaged",
        Success => "Success",
        PermanentFailure => "PermanentFailure",
        SystemError => "SystemError",
        Cancelled => "Cancelled",
        WaitingCr => "Waiting_CR",
        RunningCr => "Running_CR",
    }
}

impl JobState {
    /// Terminal states never transition further; the runner loop stops
    /// scanning a job once it's in one of these.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobState::Success
                | JobState::PermanentFailure
                | JobState::SystemError
                | JobState::Cancelled
        )
    }

    /// Whether the job currently has a live counterpart on the remote
    /// scheduler (submitted but not yet finished or cancelled).
    pub fn is_remote(self) -> bool {
        matches!(
            self,
            JobState::Waiting | JobState::Running | JobState::WaitingCr | JobState::RunningCr
        )
    }

    /// Whether a cancellation request may be accepted from this state.
    pub fn is_cancellable(self) -> bool {
        matches!(self, JobState::Waiting | JobState::Running)
    }

    /// The shadow cancellation state entered from this state, if any.
    pub fn cancellation_shadow(self) -> Option<JobState> {
        match self {
            JobState::Waiting => Some(JobState::WaitingCr),
            JobState::Running => Some(JobState::RunningCr),
            _ => None,
        }
    }
}

/// Parameters supplied by the submitter when creating a job; immutable
/// for the lifetime of the job record.
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub name: String,
    pub workflow: String,
    pub local_input: serde_json::Value,
}

/// The persistent job record. Owned exclusively by the Job Store; mutated
/// only through store operations, never by holding a stale reference
/// outside a scoped acquisition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub name: String,
    pub workflow: String,
    pub local_input: serde_json::Value,
    pub state: JobState,
    pub please_delete: bool,
    pub log: String,
    pub workflow_content: Option<Vec<u8>>,

    pub remote_workdir_path: Option<String>,
    pub remote_workflow_path: Option<String>,
    pub remote_input_path: Option<String>,
    pub remote_stdout_path: Option<String>,
    pub remote_stderr_path: Option<String>,

    pub remote_job_id: Option<String>,
    /// Whether the scheduler reported the run as a clean exit (`Some(true)`
    /// for a zero exit code, `Some(false)` for non-zero) once it reached a
    /// terminal status. `None` until then, and also when the scheduler
    /// simply stopped reporting on the job (vanished) rather than
    /// reporting a definite exit code — the Execution Manager falls back
    /// to comparing destaged outputs against what the workflow declared
    /// in that case.
    pub remote_exit_ok: Option<bool>,
    pub remote_output: Option<serde_json::Value>,
    pub local_output: Option<serde_json::Value>,

    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl Job {
    /// Construct a freshly-submitted job record.
    pub fn new(config: JobConfig, now_ms: u64) -> Self {
        Job {
            id: JobId::new(),
            name: config.name,
            workflow: config.workflow,
            local_input: config.local_input,
            state: JobState::Submitted,
            please_delete: false,
            log: String::new(),
            workflow_content: None,
            remote_workdir_path: None,
            remote_workflow_path: None,
            remote_input_path: None,
            remote_stdout_path: None,
            remote_stderr_path: None,
            remote_job_id: None,
            remote_exit_ok: None,
            remote_output: None,
            local_output: None,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        }
    }

    /// Append a line to the append-only log field.
    pub fn append_log(&mut self, line: &str) {
        if !self.log.is_empty() {
            self.log.push('\n');
        }
        self.log.push_str(line);
    }
}

/// Map of binding name -> file descriptor, the shape produced by
/// [`crate::descriptor::FileDescriptor`] sequences once grouped for lookup.
pub type DescriptorsByBinding = HashMap<String, FileDescriptor>;

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
