// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cerise_core::{Job, JobConfig};

fn sample_job() -> (JobId, HashMap<JobId, Job>) {
    let job = Job::new(
        JobConfig {
            name: "wc".to_string(),
            workflow: "file:///wc.cwl".to_string(),
            local_input: serde_json::json!({}),
        },
        1_000,
    );
    let id = job.id;
    let mut jobs = HashMap::new();
    jobs.insert(id, job);
    (id, jobs)
}

#[test]
fn write_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jobs.json");
    let (id, jobs) = sample_job();
    write_snapshot(&path, &jobs).unwrap();
    let loaded = load_snapshot(&path).unwrap();
    assert_eq!(loaded.get(&id).unwrap().name, "wc");
}

#[test]
fn load_missing_file_returns_empty_map() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jobs.json");
    let loaded = load_snapshot(&path).unwrap();
    assert!(loaded.is_empty());
}

#[test]
fn second_write_rotates_first_into_bak() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jobs.json");
    let (_, jobs_a) = sample_job();
    let (id_b, jobs_b) = sample_job();
    write_snapshot(&path, &jobs_a).unwrap();
    write_snapshot(&path, &jobs_b).unwrap();
    assert!(bak_path(&path).exists());
    let backed_up = load_snapshot(&bak_path(&path)).unwrap();
    assert!(backed_up.is_empty() || backed_up.get(&id_b).is_none());
}

#[test]
fn load_falls_back_to_backup_when_primary_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jobs.json");
    let (id, jobs) = sample_job();
    write_snapshot(&path, &jobs).unwrap();
    write_snapshot(&path, &jobs).unwrap();
    std::fs::write(&path, b"{ not valid json").unwrap();
    let loaded = load_snapshot(&path).unwrap();
    assert_eq!(loaded.get(&id).unwrap().name, "wc");
}
