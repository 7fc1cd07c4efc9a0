// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pluggable remote-execution backends for the Remote Job Runner.

pub mod local;
pub mod slurm;
pub mod ssh;

use crate::error::SchedulerError;
use async_trait::async_trait;

/// Status of a submitted remote job, as reported by [`Scheduler::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStatus {
    /// Queued or otherwise not yet executing.
    Waiting,
    /// Actively executing on the remote resource.
    Running,
    /// Finished, exit code 0.
    Done,
    /// Finished, non-zero exit code.
    Failed,
    /// The scheduler no longer knows about this job id (cancelled and
    /// reaped, or never existed).
    Gone,
}

/// A remote-execution backend: submits a command, reports on it, and can
/// cancel it. One implementation per supported scheduling method (a
/// forked local process, a bare SSH exec, or a SLURM batch queue).
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Submit `command` with `args`, run from `workdir` on the remote
    /// side. Returns the scheduler's job identifier.
    async fn submit(
        &self,
        workdir: &str,
        command: &str,
        args: &[String],
        stdout_path: &str,
        stderr_path: &str,
    ) -> Result<String, SchedulerError>;

    /// Poll the current status of a previously submitted job.
    async fn status(&self, remote_job_id: &str) -> Result<RemoteStatus, SchedulerError>;

    /// Request cancellation. Idempotent; cancelling an already-finished
    /// or already-gone job is not an error.
    async fn cancel(&self, remote_job_id: &str) -> Result<(), SchedulerError>;
}

impl std::fmt::Debug for dyn Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Scheduler")
    }
}
