// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cerised`: loads configuration, wires up the job store and execution
//! manager, and runs the sweep loop until asked to shut down.

use cerise_core::SystemClock;
use cerise_daemon::{build_scheduler, build_transport};
use cerise_engine::{Config, ExecutionManager, LocalFileManager, RemoteFileManager, RemoteJobRunner};
use cerise_storage::JobStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_CONFIG: &str = r#"
store-location-service = "./var/cerise/output"
store-location-client = "http://localhost:29593"

[jobs]
scheme = "local"

[files]
scheme = "local"
path = "./var/cerise/work"
"#;

fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CERISE_CONFIG") {
        return Some(PathBuf::from(path));
    }
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
        if let Some(value) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(value));
        }
    }
    None
}

fn load_config() -> anyhow::Result<Config> {
    match config_path() {
        Some(path) => Ok(Config::load(&path)?),
        None => {
            tracing::info!("no $CERISE_CONFIG or --config given, using built-in defaults");
            Ok(Config::from_toml_str(DEFAULT_CONFIG)?)
        }
    }
}

// Allow expect here: a signal handler that fails to install means the
// process cannot be asked to shut down cleanly, so crashing immediately
// is preferable to running on and masking the failure.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate())
            .expect("failed to install sigterm handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = load_config()?;
    let clock = SystemClock;

    std::fs::create_dir_all(&config.store_location_service)?;
    let snapshot_path = PathBuf::from(&config.store_location_service).join("jobstore.json");
    let store = Arc::new(JobStore::open(snapshot_path, clock.clone())?);

    let local_files = LocalFileManager::new(store.clone(), config.store_location_service.clone(), config.store_location_client.clone());
    let transport = build_transport(&config.files)?;
    let remote_files = RemoteFileManager::new(store.clone(), transport, config.files.path.clone());
    let scheduler = build_scheduler(&config.jobs)?;
    let job_runner = RemoteJobRunner::new(store.clone(), scheduler);

    let api_files_path = format!("{}/api", config.files.path.trim_end_matches('/'));
    let cwl_runner = config.jobs.resolved_cwl_runner(&api_files_path);

    let manager = Arc::new(ExecutionManager::new(
        store,
        local_files,
        remote_files,
        job_runner,
        clock,
        cwl_runner,
        config.transport_error_deadline_ms,
    ));

    tracing::info!(interval_ms = config.sweep_interval_ms, "execution manager starting");
    manager
        .run(Duration::from_millis(config.sweep_interval_ms), shutdown_signal())
        .await;

    tracing::info!("execution manager stopped");
    Ok(())
}
