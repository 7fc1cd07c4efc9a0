// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cerise_adapters::transport::local::LocalTransport;
use cerise_core::FakeClock;
use cerise_storage::JobStore;
use serde_json::json;

fn manager(dir: &Path) -> (Arc<JobStore<FakeClock>>, RemoteFileManager<FakeClock>) {
    let store = Arc::new(JobStore::in_memory(FakeClock::new()));
    let transport: Arc<dyn Transport> = Arc::new(LocalTransport::new(dir.to_path_buf()));
    let manager = RemoteFileManager::new(store.clone(), transport, dir.display().to_string());
    (store, manager)
}

#[tokio::test]
async fn stage_api_mirrors_the_local_tree_preserving_relative_paths() {
    let remote = tempfile::tempdir().unwrap();
    let local = tempfile::tempdir().unwrap();
    std::fs::write(local.path().join("cwltiny.py"), b"# runner").unwrap();
    std::fs::create_dir(local.path().join("nested")).unwrap();
    std::fs::write(local.path().join("nested").join("helper.py"), b"# helper").unwrap();

    let (_, manager) = manager(remote.path());
    manager.stage_api(local.path()).await.unwrap();

    assert_eq!(std::fs::read(remote.path().join("api/cwltiny.py")).unwrap(), b"# runner");
    assert_eq!(std::fs::read(remote.path().join("api/nested/helper.py")).unwrap(), b"# helper");
}

#[tokio::test]
async fn stage_job_writes_the_workflow_numbered_inputs_and_rewritten_input_json() {
    let remote = tempfile::tempdir().unwrap();
    let (store, manager) = manager(remote.path());
    let id = store.create(
        "wc",
        "file:///wc.cwl",
        json!({"input_file": {"class": "File", "location": "file:///hello.txt", "basename": "hello.txt"}}),
    );
    store.with_store(|jobs| jobs.get_mut(&id).unwrap().workflow_content = Some(b"cwlVersion: v1.0".to_vec()));

    let inputs = vec![FileDescriptor::new("input_file".to_string(), "hello.txt".to_string(), b"hello world".to_vec())];
    manager.stage_job(&id, &inputs).await.unwrap();

    let work = remote.path().join("jobs").join(id.to_string()).join("work");
    assert_eq!(std::fs::read(work.join("workflow.cwl")).unwrap(), b"cwlVersion: v1.0");
    assert_eq!(std::fs::read(work.join("01_input_hello.txt")).unwrap(), b"hello world");

    let input_json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(work.join("input.json")).unwrap()).unwrap();
    let location = input_json["input_file"]["location"].as_str().unwrap();
    assert!(location.contains("01_input_hello.txt"));

    let job = store.get(&id).unwrap();
    assert!(job.remote_workdir_path.is_some());
    assert!(job.remote_workflow_path.as_deref().unwrap().ends_with("workflow.cwl"));
    assert!(job.remote_input_path.as_deref().unwrap().ends_with("input.json"));
    assert!(job.remote_stdout_path.as_deref().unwrap().ends_with("stdout"));
    assert!(job.remote_stderr_path.as_deref().unwrap().ends_with("stderr"));
}

#[tokio::test]
async fn stage_job_numbers_multiple_inputs_in_binding_order() {
    let remote = tempfile::tempdir().unwrap();
    let (store, manager) = manager(remote.path());
    let id = store.create("wc", "file:///wc.cwl", json!({}));

    let inputs = vec![
        FileDescriptor::new("a".to_string(), "same.txt".to_string(), b"first".to_vec()),
        FileDescriptor::new("b".to_string(), "same.txt".to_string(), b"second".to_vec()),
    ];
    manager.stage_job(&id, &inputs).await.unwrap();

    let work = remote.path().join("jobs").join(id.to_string()).join("work");
    assert_eq!(std::fs::read(work.join("01_input_same.txt")).unwrap(), b"first");
    assert_eq!(std::fs::read(work.join("02_input_same.txt")).unwrap(), b"second");
}

#[tokio::test]
async fn destage_job_output_reads_declared_outputs_and_drops_missing_ones() {
    let remote = tempfile::tempdir().unwrap();
    let (store, manager) = manager(remote.path());
    let id = store.create("wc", "file:///wc.cwl", json!({}));

    let work = remote.path().join("jobs").join(id.to_string()).join("work");
    std::fs::create_dir_all(&work).unwrap();
    std::fs::write(
        work.join("stdout"),
        serde_json::to_vec(&json!({
            "output": {"basename": "result.txt"},
            "missing": {"basename": "absent.txt"},
        }))
        .unwrap(),
    )
    .unwrap();
    std::fs::write(work.join("result.txt"), b"4 11 58").unwrap();

    let outputs = manager.destage_job_output(&id).await.unwrap();
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].basename, "result.txt");
    assert_eq!(outputs[0].bytes, b"4 11 58");
    assert!(store.get(&id).unwrap().log.contains("absent.txt"));
}

#[tokio::test]
async fn update_job_reads_stdout_as_remote_output_and_appends_stderr_to_the_log() {
    let remote = tempfile::tempdir().unwrap();
    let (store, manager) = manager(remote.path());
    let id = store.create("wc", "file:///wc.cwl", json!({}));

    let work = remote.path().join("jobs").join(id.to_string()).join("work");
    std::fs::create_dir_all(&work).unwrap();
    std::fs::write(work.join("stdout"), br#"{"output": {"basename": "result.txt"}}"#).unwrap();
    std::fs::write(work.join("stderr"), b"a warning happened\n").unwrap();

    manager.update_job(&id).await.unwrap();

    let job = store.get(&id).unwrap();
    assert_eq!(job.remote_output.unwrap()["output"]["basename"], "result.txt");
    assert_eq!(job.log, "a warning happened");
}

#[tokio::test]
async fn update_job_with_no_stdout_or_stderr_yet_is_not_an_error() {
    let remote = tempfile::tempdir().unwrap();
    let (store, manager) = manager(remote.path());
    let id = store.create("wc", "file:///wc.cwl", json!({}));
    manager.update_job(&id).await.unwrap();
    assert!(store.get(&id).unwrap().remote_output.is_none());
}

#[tokio::test]
async fn delete_job_removes_the_work_tree_and_is_idempotent() {
    let remote = tempfile::tempdir().unwrap();
    let (store, manager) = manager(remote.path());
    let id = store.create("wc", "file:///wc.cwl", json!({}));
    let work = remote.path().join("jobs").join(id.to_string()).join("work");
    std::fs::create_dir_all(&work).unwrap();
    std::fs::write(work.join("workflow.cwl"), b"x").unwrap();

    manager.delete_job(&id).await.unwrap();
    manager.delete_job(&id).await.unwrap();
    assert!(!remote.path().join("jobs").join(id.to_string()).exists());
}

#[tokio::test]
async fn stage_job_removes_the_partial_work_directory_on_failure() {
    let remote = tempfile::tempdir().unwrap();
    let store = Arc::new(JobStore::in_memory(FakeClock::new()));
    // No such job id recorded: stage_job_inner fails looking it up, after
    // create_dir already made the work tree, exercising the cleanup path.
    let transport: Arc<dyn Transport> = Arc::new(LocalTransport::new(remote.path().to_path_buf()));
    let manager = RemoteFileManager::new(store, transport, remote.path().display().to_string());
    let id = cerise_core::JobId::new();

    let err = manager.stage_job(&id, &[]).await.unwrap_err();
    assert!(matches!(err, RemoteFileError::UnknownJob(_)));
    assert!(!remote.path().join("jobs").join(id.to_string()).exists());
}
