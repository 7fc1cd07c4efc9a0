// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parse_job_id_extracts_the_trailing_number() {
    assert_eq!(SlurmScheduler::parse_job_id("Submitted batch job 98765\n"), Some("98765".to_string()));
}

#[test]
fn parse_job_id_on_unexpected_output_is_none() {
    assert_eq!(SlurmScheduler::parse_job_id(""), None);
}

#[yare::parameterized(
    pending     = { "PENDING",     RemoteStatus::Waiting },
    configuring = { "CONFIGURING", RemoteStatus::Waiting },
    running     = { "RUNNING",     RemoteStatus::Running },
    completing  = { "COMPLETING",  RemoteStatus::Running },
    completed   = { "COMPLETED",   RemoteStatus::Done },
    cancelled   = { "CANCELLED",   RemoteStatus::Failed },
    timeout     = { "TIMEOUT",     RemoteStatus::Failed },
    empty       = { "",            RemoteStatus::Gone },
)]
fn parse_squeue_state_maps_each_status(squeue_output: &str, expected: RemoteStatus) {
    assert_eq!(SlurmScheduler::parse_squeue_state(squeue_output), expected);
}

fn scheduler(queue_name: Option<&str>, slots_per_node: u32) -> SlurmScheduler {
    SlurmScheduler::with_queue(
        "login.example.org",
        22,
        Credentials { username: "alice".to_string(), password: None },
        queue_name.map(str::to_string),
        slots_per_node,
    )
}

#[test]
fn batch_script_embeds_output_paths_and_command() {
    let script = scheduler(None, 1).batch_script(
        "/work/job-1",
        "/opt/cerise/run.sh",
        &["input.json".to_string()],
        "/work/job-1/stdout.txt",
        "/work/job-1/stderr.txt",
    );
    assert!(script.contains("#SBATCH --output=/work/job-1/stdout.txt"));
    assert!(script.contains("#SBATCH --chdir=/work/job-1"));
    assert!(script.contains("/opt/cerise/run.sh 'input.json'"));
    assert!(!script.contains("--partition"));
}

#[test]
fn batch_script_embeds_queue_and_slots_per_node_when_configured() {
    let script = scheduler(Some("gpu"), 4).batch_script(
        "/work/job-1",
        "/opt/cerise/run.sh",
        &[],
        "/work/job-1/stdout.txt",
        "/work/job-1/stderr.txt",
    );
    assert!(script.contains("#SBATCH --partition=gpu"));
    assert!(script.contains("#SBATCH --ntasks-per-node=4"));
}
