// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Execution Manager: the runner loop that drives every job through
//! resolve -> stage -> run -> update -> destage -> publish -> done, one
//! sweep over the job store at a time.
//!
//! Grounded on `original_source/cerise/back_end/execution_manager.py`'s
//! `_thread` poll loop, reworked around a single `sweep` pass per tick
//! rather than a dedicated OS thread per stage, and on
//! `crates/daemon/src/engine/monitor.rs`'s tracing-around-every-effect,
//! errors-classified-at-the-boundary idiom.

use crate::error::EngineError;
use crate::job_runner::RemoteJobRunner;
use crate::local_files::LocalFileManager;
use crate::remote_files::RemoteFileManager;
use cerise_core::{Clock, Job, JobId, JobState};
use cerise_storage::JobStore;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub struct ExecutionManager<C: Clock> {
    store: Arc<JobStore<C>>,
    local_files: LocalFileManager<C>,
    remote_files: RemoteFileManager<C>,
    job_runner: RemoteJobRunner<C>,
    clock: C,
    cwl_runner: String,
    /// How long a transport error may persist against a single job
    /// before the manager gives up retrying and promotes it to
    /// `SystemError`.
    transport_error_deadline_ms: u64,
}

impl<C: Clock> ExecutionManager<C> {
    pub fn new(
        store: Arc<JobStore<C>>,
        local_files: LocalFileManager<C>,
        remote_files: RemoteFileManager<C>,
        job_runner: RemoteJobRunner<C>,
        clock: C,
        cwl_runner: impl Into<String>,
        transport_error_deadline_ms: u64,
    ) -> Self {
        ExecutionManager {
            store,
            local_files,
            remote_files,
            job_runner,
            clock,
            cwl_runner: cwl_runner.into(),
            transport_error_deadline_ms,
        }
    }

    /// Request cancellation of a job. Returns `false` if the job is
    /// unknown or not currently in a cancellable state.
    pub fn request_cancel(&self, job_id: &JobId) -> bool {
        let Some(job) = self.store.get(job_id) else { return false };
        let Some(shadow) = job.state.cancellation_shadow() else { return false };
        self.store.try_transition(job_id, job.state, shadow)
    }

    /// Flag a job for teardown once it reaches a terminal state.
    /// Idempotent; returns `false` only if the job is unknown.
    pub fn request_delete(&self, job_id: &JobId) -> bool {
        self.store.mark_please_delete(job_id)
    }

    /// Advance every non-terminal job one step, and tear down every
    /// terminal job flagged for deletion. Call on a timer.
    pub async fn sweep(&self) {
        for job in self.store.list() {
            self.advance(&job).await;
        }
    }

    /// Run `sweep` on `interval` until `shutdown` resolves.
    pub async fn run(&self, interval: Duration, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.sweep().await,
                _ = &mut shutdown => {
                    tracing::info!("execution manager shutting down");
                    break;
                }
            }
        }
    }

    async fn advance(&self, job: &Job) {
        if job.please_delete && job.state.is_terminal() {
            self.teardown(&job.id).await;
            return;
        }
        match job.state {
            JobState::Submitted => self.resolve(job).await,
            JobState::Resolved => self.stage(job).await,
            JobState::Staged => self.submit(job).await,
            JobState::Waiting | JobState::Running => self.poll(job).await,
            JobState::WaitingCr | JobState::RunningCr => self.poll_cancelling(job).await,
            JobState::Finished => self.destage(job).await,
            JobState::Destaged
            | JobState::Success
            | JobState::PermanentFailure
            | JobState::SystemError
            | JobState::Cancelled => {}
        }
    }

    async fn resolve(&self, job: &Job) {
        match self.local_files.resolve_input(&job.id).await {
            Ok(_) => {
                self.store.try_transition(&job.id, JobState::Submitted, JobState::Resolved);
            }
            Err(err) => self.fail_or_retry(&job.id, JobState::Submitted, err.into()),
        }
    }

    async fn stage(&self, job: &Job) {
        let descriptors = match self.local_files.resolve_input(&job.id).await {
            Ok(descriptors) => descriptors,
            Err(err) => {
                self.fail_or_retry(&job.id, JobState::Resolved, err.into());
                return;
            }
        };
        if let Err(err) = self.local_files.create_output_dir(&job.id).await {
            self.fail_or_retry(&job.id, JobState::Resolved, err.into());
            return;
        }
        match self.remote_files.stage_job(&job.id, &descriptors).await {
            Ok(()) => {
                self.store.try_transition(&job.id, JobState::Resolved, JobState::Staged);
            }
            Err(err) => self.fail_or_retry(&job.id, JobState::Resolved, err.into()),
        }
    }

    async fn submit(&self, job: &Job) {
        match self.job_runner.start_job(&job.id, &self.cwl_runner).await {
            Ok(()) => {
                self.store.try_transition(&job.id, JobState::Staged, JobState::Waiting);
            }
            Err(err) => self.fail_or_retry(&job.id, JobState::Staged, err.into()),
        }
    }

    async fn poll(&self, job: &Job) {
        if let Err(err) = self.job_runner.update_job(&job.id).await {
            self.retry_transient(job, err.into());
        }
        if let Err(err) = self.remote_files.update_job(&job.id).await {
            self.retry_transient(job, err.into());
        }
    }

    async fn poll_cancelling(&self, job: &Job) {
        if let Err(err) = self.job_runner.cancel_job(&job.id).await {
            self.retry_transient(job, err.into());
        }
        self.poll(job).await;
    }

    /// Gather whatever outputs exist, publish them, then decide
    /// `Success` vs `PermanentFailure` from the scheduler's reported
    /// exit status together with how many of the declared outputs were
    /// actually produced. A non-zero exit is always a failure; a zero
    /// exit (or a vanished job, where the exit status is unknown) is a
    /// failure only if outputs are missing.
    async fn destage(&self, job: &Job) {
        let outputs = match self.remote_files.destage_job_output(&job.id).await {
            Ok(outputs) => outputs,
            Err(err) => {
                self.fail_or_retry(&job.id, JobState::Finished, err.into());
                return;
            }
        };

        if let Err(err) = self.local_files.publish_job_output(&job.id, Some(&outputs)).await {
            self.fail_or_retry(&job.id, JobState::Finished, err.into());
            return;
        }

        let current = self.store.get(&job.id);
        let declared = current
            .as_ref()
            .and_then(|job| job.remote_output.as_ref())
            .and_then(|value| value.as_object())
            .map(|fields| fields.values().filter(|entry| entry.get("basename").is_some()).count())
            .unwrap_or(0);
        let exit_ok = current.as_ref().and_then(|job| job.remote_exit_ok);

        if exit_ok == Some(false) {
            self.store.append_log(&job.id, "workflow runner exited with a non-zero status");
            self.store.try_transition(&job.id, JobState::Finished, JobState::PermanentFailure);
        } else if outputs.len() < declared {
            self.store.append_log(
                &job.id,
                &format!("only {} of {} declared outputs were produced", outputs.len(), declared),
            );
            self.store.try_transition(&job.id, JobState::Finished, JobState::PermanentFailure);
        } else {
            self.store.try_transition(&job.id, JobState::Finished, JobState::Destaged);
            self.store.try_transition(&job.id, JobState::Destaged, JobState::Success);
        }
    }

    async fn teardown(&self, job_id: &JobId) {
        if let Err(err) = self.remote_files.delete_job(job_id).await {
            tracing::warn!(job_id = %job_id, error = %err, "failed to delete remote job tree, retrying next sweep");
            return;
        }
        if let Err(err) = self.local_files.delete_output_dir(job_id).await {
            tracing::warn!(job_id = %job_id, error = %err, "failed to delete local output dir, retrying next sweep");
            return;
        }
        self.store.delete(job_id);
        tracing::info!(job_id = %job_id, "deleted job");
    }

    /// Input and scheduler errors are permanent; storage errors are
    /// logged and retried; transport errors are retried until
    /// `transport_error_deadline_ms` has passed since the job last
    /// moved, at which point the job is promoted to `SystemError`.
    fn fail_or_retry(&self, job_id: &JobId, from: JobState, err: EngineError) {
        match err {
            EngineError::Input(msg) => {
                self.store.append_log(job_id, &format!("input error: {msg}"));
                self.store.try_transition(job_id, from, JobState::PermanentFailure);
            }
            EngineError::Scheduler(msg) => {
                self.store.append_log(job_id, &format!("scheduler rejected job: {msg}"));
                self.store.try_transition(job_id, from, JobState::PermanentFailure);
            }
            EngineError::Transport(msg) => self.retry_or_promote(job_id, from, &msg),
            EngineError::Storage(err) => {
                tracing::error!(job_id = %job_id, error = %err, "storage error, retrying next sweep");
            }
        }
    }

    /// Version of [`Self::fail_or_retry`] for stages that already hold
    /// a [`Job`] and so don't need a fresh store lookup to find `from`.
    fn retry_transient(&self, job: &Job, err: EngineError) {
        match err {
            EngineError::Transport(msg) => self.retry_or_promote(&job.id, job.state, &msg),
            EngineError::Storage(err) => {
                tracing::error!(job_id = %job.id, error = %err, "storage error, retrying next sweep");
            }
            other => tracing::warn!(job_id = %job.id, error = %other, "unexpected error during poll, retrying next sweep"),
        }
    }

    fn retry_or_promote(&self, job_id: &JobId, from: JobState, msg: &str) {
        tracing::warn!(job_id = %job_id, error = %msg, "transient transport error");
        let Some(job) = self.store.get(job_id) else { return };
        let age_ms = self.clock.epoch_ms().saturating_sub(job.updated_at_ms);
        if age_ms >= self.transport_error_deadline_ms {
            self.store.append_log(job_id, &format!("transport error persisted past deadline: {msg}"));
            self.store.try_transition(job_id, from, JobState::SystemError);
        }
    }
}

#[cfg(test)]
#[path = "execution_manager_tests.rs"]
mod tests;
