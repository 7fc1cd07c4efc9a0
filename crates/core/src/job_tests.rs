// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn config() -> JobConfig {
    JobConfig {
        name: "wc".to_string(),
        workflow: "file:///workflows/wc.cwl".to_string(),
        local_input: serde_json::json!({}),
    }
}

#[test]
fn new_job_starts_submitted() {
    let job = Job::new(config(), 1_000);
    assert_eq!(job.state, JobState::Submitted);
    assert!(!job.please_delete);
    assert!(job.log.is_empty());
    assert!(job.workflow_content.is_none());
    assert!(job.remote_job_id.is_none());
}

#[test]
fn new_job_ids_are_unique() {
    let a = Job::new(config(), 1_000);
    let b = Job::new(config(), 1_000);
    assert_ne!(a.id, b.id);
}

#[test]
fn append_log_joins_with_newlines() {
    let mut job = Job::new(config(), 1_000);
    job.append_log("first");
    job.append_log("second");
    assert_eq!(job.log, "first\nsecond");
}

#[test]
fn append_log_on_empty_log_has_no_leading_newline() {
    let mut job = Job::new(config(), 1_000);
    job.append_log("only");
    assert_eq!(job.log, "only");
}

#[yare::parameterized(
    submitted         = { JobState::Submitted,        false, false, false, None },
    resolved          = { JobState::Resolved,         false, false, false, None },
    staged            = { JobState::Staged,           false, false, false, None },
    waiting           = { JobState::Waiting,          false, true,  true,  Some(JobState::WaitingCr) },
    running           = { JobState::Running,          false, true,  true,  Some(JobState::RunningCr) },
    finished          = { JobState::Finished,         false, false, false, None },
    destaged          = { JobState::Destaged,         false, false, false, None },
    success           = { JobState::Success,          true,  false, false, None },
    permanent_failure = { JobState::PermanentFailure, true,  false, false, None },
    system_error      = { JobState::SystemError,      true,  false, false, None },
    cancelled         = { JobState::Cancelled,        true,  false, false, None },
    waiting_cr        = { JobState::WaitingCr,        false, true,  false, None },
    running_cr        = { JobState::RunningCr,        false, true,  false, None },
)]
fn state_predicates_and_cancellation_shadow(
    state: JobState,
    terminal: bool,
    remote: bool,
    cancellable: bool,
    shadow: Option<JobState>,
) {
    assert_eq!(state.is_terminal(), terminal, "{state} is_terminal");
    assert_eq!(state.is_remote(), remote, "{state} is_remote");
    assert_eq!(state.is_cancellable(), cancellable, "{state} is_cancellable");
    assert_eq!(state.cancellation_shadow(), shadow, "{state} cancellation_shadow");
}

#[test]
fn display_matches_python_enum_names() {
    assert_eq!(JobState::WaitingCr.to_string(), "Waiting_CR");
    assert_eq!(JobState::RunningCr.to_string(), "Running_CR");
    assert_eq!(JobState::Submitted.to_string(), "Submitted");
}

#[test]
fn serde_round_trip_preserves_shadow_state_names() {
    let json = serde_json::to_string(&JobState::WaitingCr).unwrap();
    assert_eq!(json, "\"Waiting_CR\"");
    let back: JobState = serde_json::from_str(&json).unwrap();
    assert_eq!(back, JobState::WaitingCr);
}

#[test]
fn job_serde_round_trip() {
    let mut job = Job::new(config(), 42);
    job.append_log("hello");
    job.remote_job_id = Some("12345".to_string());
    let json = serde_json::to_string(&job).unwrap();
    let back: Job = serde_json::from_str(&json).unwrap();
    assert_eq!(back.id, job.id);
    assert_eq!(back.log, "hello");
    assert_eq!(back.remote_job_id.as_deref(), Some("12345"));
}
