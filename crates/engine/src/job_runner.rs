// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Remote Job Runner: submits a job to the configured scheduler,
//! polls its status, and issues cancellation.
//!
//! Method bodies are grounded on
//! `original_source/cerise/back_end/xenon_job_runner.py`'s
//! `start_job`/`update_job`/`cancel_job`, routed through
//! [`cerise_adapters::Scheduler`] rather than a xenon job description.

use crate::error::JobRunnerError;
use cerise_adapters::{RemoteStatus, Scheduler};
use cerise_core::{Clock, JobId, JobState};
use cerise_storage::JobStore;
use std::sync::Arc;

pub struct RemoteJobRunner<C: Clock> {
    store: Arc<JobStore<C>>,
    scheduler: Arc<dyn Scheduler>,
}

impl<C: Clock> RemoteJobRunner<C> {
    pub fn new(store: Arc<JobStore<C>>, scheduler: Arc<dyn Scheduler>) -> Self {
        RemoteJobRunner { store, scheduler }
    }

    /// Submit the job's staged work directory to the scheduler and
    /// record the resulting handle. Does not transition the job's
    /// state — the caller does that once submission succeeds.
    pub async fn start_job(
        &self,
        job_id: &JobId,
        executable: &str,
    ) -> Result<(), JobRunnerError> {
        let job = self.store.get(job_id).ok_or_else(|| JobRunnerError::UnknownJob(job_id.to_string()))?;
        let workdir = job.remote_workdir_path.clone().unwrap_or_default();
        let args = vec![
            job.remote_workflow_path.clone().unwrap_or_default(),
            job.remote_input_path.clone().unwrap_or_default(),
        ];
        let stdout = job.remote_stdout_path.clone().unwrap_or_default();
        let stderr = job.remote_stderr_path.clone().unwrap_or_default();

        let remote_job_id = self.scheduler.submit(&workdir, executable, &args, &stdout, &stderr).await?;

        self.store.with_store(|jobs| {
            if let Some(job) = jobs.get_mut(job_id) {
                job.remote_job_id = Some(remote_job_id.clone());
            }
        });
        tracing::info!(job_id = %job_id, remote_job_id = %remote_job_id, "submitted job to scheduler");
        Ok(())
    }

    /// Poll the scheduler and advance the job's remote-facing state.
    /// Running jobs move out of their `Waiting`/`Waiting_CR` shadow;
    /// jobs the scheduler no longer knows about, or reports done, move
    /// to `Finished` (or `Cancelled` if a cancellation was pending).
    pub async fn update_job(&self, job_id: &JobId) -> Result<(), JobRunnerError> {
        let job = self.store.get(job_id).ok_or_else(|| JobRunnerError::UnknownJob(job_id.to_string()))?;
        let Some(remote_job_id) = &job.remote_job_id else {
            return Ok(());
        };

        let status = self.scheduler.status(remote_job_id).await?;
        match status {
            RemoteStatus::Running => {
                self.store.try_transition(job_id, JobState::Waiting, JobState::Running);
                self.store.try_transition(job_id, JobState::WaitingCr, JobState::RunningCr);
            }
            RemoteStatus::Waiting => {}
            RemoteStatus::Done | RemoteStatus::Failed => {
                let exit_ok = status == RemoteStatus::Done;
                self.store.with_store(|jobs| {
                    if let Some(job) = jobs.get_mut(job_id) {
                        job.remote_exit_ok = Some(exit_ok);
                    }
                });
                self.store.try_transition(job_id, JobState::Waiting, JobState::Finished);
                self.store.try_transition(job_id, JobState::Running, JobState::Finished);
                self.store.try_transition(job_id, JobState::WaitingCr, JobState::Cancelled);
                self.store.try_transition(job_id, JobState::RunningCr, JobState::Cancelled);
            }
            RemoteStatus::Gone => {
                // Vanished without a definite exit code: treated as
                // completion per spec, the destage step decides success
                // from whichever outputs actually materialized.
                self.store.try_transition(job_id, JobState::Waiting, JobState::Finished);
                self.store.try_transition(job_id, JobState::Running, JobState::Finished);
                self.store.try_transition(job_id, JobState::WaitingCr, JobState::Cancelled);
                self.store.try_transition(job_id, JobState::RunningCr, JobState::Cancelled);
            }
        }
        Ok(())
    }

    /// Request cancellation of the job's remote counterpart, if it has
    /// one. Returns whether the job is still running after the
    /// request — a caller reporting "still running" should expect to
    /// poll again rather than assume immediate cancellation.
    pub async fn cancel_job(&self, job_id: &JobId) -> Result<bool, JobRunnerError> {
        let job = self.store.get(job_id).ok_or_else(|| JobRunnerError::UnknownJob(job_id.to_string()))?;
        if !job.state.is_remote() {
            return Ok(false);
        }
        let Some(remote_job_id) = &job.remote_job_id else {
            return Ok(false);
        };

        self.scheduler.cancel(remote_job_id).await?;
        let status = self.scheduler.status(remote_job_id).await?;
        Ok(matches!(status, RemoteStatus::Waiting | RemoteStatus::Running))
    }
}

#[cfg(test)]
#[path = "job_runner_tests.rs"]
mod tests;
