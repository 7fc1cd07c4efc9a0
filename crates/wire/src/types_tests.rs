// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cerise_core::JobConfig;

fn job() -> Job {
    let mut job = Job::new(
        JobConfig {
            name: "wc".to_string(),
            workflow: "file:///wc.cwl".to_string(),
            local_input: serde_json::json!({"file": "input.txt"}),
        },
        1_000,
    );
    job.append_log("staged");
    job
}

#[test]
fn job_summary_carries_identity_and_state() {
    let job = job();
    let summary = JobSummary::from(&job);
    assert_eq!(summary.id, job.id);
    assert_eq!(summary.name, "wc");
    assert_eq!(summary.state, JobState::Submitted);
}

#[test]
fn job_record_carries_the_log() {
    let job = job();
    let record = JobRecord::from(&job);
    assert_eq!(record.log, "staged");
    assert_eq!(record.workflow, "file:///wc.cwl");
}

#[test]
fn create_job_request_defaults_local_input_to_empty_object() {
    let parsed: CreateJobRequest =
        serde_json::from_str(r#"{"name": "wc", "workflow": "file:///wc.cwl"}"#).unwrap();
    assert_eq!(parsed.local_input, serde_json::json!({}));
}

#[test]
fn job_summary_serializes_state_as_a_string() {
    let summary = JobSummary::from(&job());
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["state"], serde_json::json!("Submitted"));
}
