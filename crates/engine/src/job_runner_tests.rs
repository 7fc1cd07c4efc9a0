// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use async_trait::async_trait;
use cerise_core::FakeClock;
use std::collections::VecDeque;
use std::sync::Mutex;

struct FakeScheduler {
    statuses: Mutex<VecDeque<RemoteStatus>>,
    cancelled: Mutex<bool>,
}

impl FakeScheduler {
    fn new(statuses: Vec<RemoteStatus>) -> Self {
        FakeScheduler { statuses: Mutex::new(statuses.into()), cancelled: Mutex::new(false) }
    }
}

#[async_trait]
impl Scheduler for FakeScheduler {
    async fn submit(
        &self,
        _workdir: &str,
        _command: &str,
        _args: &[String],
        _stdout_path: &str,
        _stderr_path: &str,
    ) -> Result<String, cerise_adapters::SchedulerError> {
        Ok("remote-1".to_string())
    }

    async fn status(&self, _remote_job_id: &str) -> Result<RemoteStatus, cerise_adapters::SchedulerError> {
        let mut statuses = self.statuses.lock().unwrap();
        Ok(if statuses.len() > 1 { statuses.pop_front().unwrap() } else { *statuses.front().unwrap() })
    }

    async fn cancel(&self, _remote_job_id: &str) -> Result<(), cerise_adapters::SchedulerError> {
        *self.cancelled.lock().unwrap() = true;
        Ok(())
    }
}

fn store() -> Arc<JobStore<FakeClock>> {
    Arc::new(JobStore::in_memory(FakeClock::new()))
}

#[tokio::test]
async fn start_job_records_the_remote_id_without_transitioning_state() {
    let store = store();
    let id = store.create("wc", "file:///wc.cwl", serde_json::json!({}));
    store.with_store(|jobs| {
        let job = jobs.get_mut(&id).unwrap();
        job.remote_workdir_path = Some("/remote/jobs/1/work".to_string());
        job.remote_workflow_path = Some("/remote/jobs/1/work/workflow.cwl".to_string());
        job.remote_input_path = Some("/remote/jobs/1/work/input.json".to_string());
        job.remote_stdout_path = Some("/remote/jobs/1/work/stdout".to_string());
        job.remote_stderr_path = Some("/remote/jobs/1/work/stderr".to_string());
    });
    let scheduler: Arc<dyn Scheduler> = Arc::new(FakeScheduler::new(vec![RemoteStatus::Waiting]));
    let runner = RemoteJobRunner::new(store.clone(), scheduler);

    runner.start_job(&id, "/opt/cerise/cwltiny.py").await.unwrap();

    let job = store.get(&id).unwrap();
    assert_eq!(job.remote_job_id.as_deref(), Some("remote-1"));
    assert_eq!(job.state, JobState::Submitted);
}

#[tokio::test]
async fn update_job_promotes_waiting_to_running_when_scheduler_reports_running() {
    let store = store();
    let id = store.create("wc", "file:///wc.cwl", serde_json::json!({}));
    store.try_transition(&id, JobState::Submitted, JobState::Resolved);
    store.try_transition(&id, JobState::Resolved, JobState::Staged);
    store.try_transition(&id, JobState::Staged, JobState::Waiting);
    store.with_store(|jobs| jobs.get_mut(&id).unwrap().remote_job_id = Some("remote-1".to_string()));

    let scheduler: Arc<dyn Scheduler> = Arc::new(FakeScheduler::new(vec![RemoteStatus::Running]));
    let runner = RemoteJobRunner::new(store.clone(), scheduler);
    runner.update_job(&id).await.unwrap();

    assert_eq!(store.get(&id).unwrap().state, JobState::Running);
}

#[tokio::test]
async fn update_job_moves_waiting_to_finished_when_scheduler_reports_done() {
    let store = store();
    let id = store.create("wc", "file:///wc.cwl", serde_json::json!({}));
    store.try_transition(&id, JobState::Submitted, JobState::Resolved);
    store.try_transition(&id, JobState::Resolved, JobState::Staged);
    store.try_transition(&id, JobState::Staged, JobState::Waiting);
    store.with_store(|jobs| jobs.get_mut(&id).unwrap().remote_job_id = Some("remote-1".to_string()));

    let scheduler: Arc<dyn Scheduler> = Arc::new(FakeScheduler::new(vec![RemoteStatus::Done]));
    let runner = RemoteJobRunner::new(store.clone(), scheduler);
    runner.update_job(&id).await.unwrap();

    let job = store.get(&id).unwrap();
    assert_eq!(job.state, JobState::Finished);
    assert_eq!(job.remote_exit_ok, Some(true));
}

#[tokio::test]
async fn update_job_records_a_failed_exit_code() {
    let store = store();
    let id = store.create("wc", "file:///wc.cwl", serde_json::json!({}));
    store.try_transition(&id, JobState::Submitted, JobState::Resolved);
    store.try_transition(&id, JobState::Resolved, JobState::Staged);
    store.try_transition(&id, JobState::Staged, JobState::Waiting);
    store.with_store(|jobs| jobs.get_mut(&id).unwrap().remote_job_id = Some("remote-1".to_string()));

    let scheduler: Arc<dyn Scheduler> = Arc::new(FakeScheduler::new(vec![RemoteStatus::Failed]));
    let runner = RemoteJobRunner::new(store.clone(), scheduler);
    runner.update_job(&id).await.unwrap();

    let job = store.get(&id).unwrap();
    assert_eq!(job.state, JobState::Finished);
    assert_eq!(job.remote_exit_ok, Some(false));
}

#[tokio::test]
async fn update_job_moves_waiting_cr_to_cancelled_when_scheduler_reports_gone() {
    let store = store();
    let id = store.create("wc", "file:///wc.cwl", serde_json::json!({}));
    store.try_transition(&id, JobState::Submitted, JobState::Resolved);
    store.try_transition(&id, JobState::Resolved, JobState::Staged);
    store.try_transition(&id, JobState::Staged, JobState::Waiting);
    store.try_transition(&id, JobState::Waiting, JobState::WaitingCr);
    store.with_store(|jobs| jobs.get_mut(&id).unwrap().remote_job_id = Some("remote-1".to_string()));

    let scheduler: Arc<dyn Scheduler> = Arc::new(FakeScheduler::new(vec![RemoteStatus::Gone]));
    let runner = RemoteJobRunner::new(store.clone(), scheduler);
    runner.update_job(&id).await.unwrap();

    assert_eq!(store.get(&id).unwrap().state, JobState::Cancelled);
}

#[tokio::test]
async fn update_job_without_a_remote_id_is_a_no_op() {
    let store = store();
    let id = store.create("wc", "file:///wc.cwl", serde_json::json!({}));
    let scheduler: Arc<dyn Scheduler> = Arc::new(FakeScheduler::new(vec![RemoteStatus::Running]));
    let runner = RemoteJobRunner::new(store.clone(), scheduler);
    runner.update_job(&id).await.unwrap();
    assert_eq!(store.get(&id).unwrap().state, JobState::Submitted);
}

#[tokio::test]
async fn cancel_job_on_a_non_remote_job_is_a_no_op() {
    let store = store();
    let id = store.create("wc", "file:///wc.cwl", serde_json::json!({}));
    let scheduler: Arc<dyn Scheduler> = Arc::new(FakeScheduler::new(vec![RemoteStatus::Running]));
    let runner = RemoteJobRunner::new(store.clone(), scheduler);
    assert!(!runner.cancel_job(&id).await.unwrap());
}

#[tokio::test]
async fn cancel_job_on_a_running_job_requests_cancellation() {
    let store = store();
    let id = store.create("wc", "file:///wc.cwl", serde_json::json!({}));
    store.try_transition(&id, JobState::Submitted, JobState::Resolved);
    store.try_transition(&id, JobState::Resolved, JobState::Staged);
    store.try_transition(&id, JobState::Staged, JobState::Waiting);
    store.try_transition(&id, JobState::Waiting, JobState::Running);
    store.with_store(|jobs| jobs.get_mut(&id).unwrap().remote_job_id = Some("remote-1".to_string()));

    let scheduler: Arc<dyn Scheduler> = Arc::new(FakeScheduler::new(vec![RemoteStatus::Gone]));
    let runner = RemoteJobRunner::new(store.clone(), scheduler);
    assert!(!runner.cancel_job(&id).await.unwrap());
}

#[tokio::test]
async fn start_job_fails_for_an_unknown_job() {
    let store = store();
    let scheduler: Arc<dyn Scheduler> = Arc::new(FakeScheduler::new(vec![RemoteStatus::Waiting]));
    let runner = RemoteJobRunner::new(store, scheduler);
    let result = runner.start_job(&JobId::new(), "/opt/cerise/cwltiny.py").await;
    assert!(matches!(result, Err(JobRunnerError::UnknownJob(_))));
}
