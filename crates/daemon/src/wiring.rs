// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Translates `jobs.*`/`files.*` configuration into a concrete
//! [`Scheduler`]/[`Transport`] implementation. The scheme string
//! selects the backend; `location`/`path` carries backend-specific
//! addressing (`host[:port]` for the remote backends, a filesystem
//! root for `local`).

use cerise_adapters::credential::{resolve_files_credentials, resolve_job_credentials};
use cerise_adapters::scheduler::local::LocalScheduler;
use cerise_adapters::scheduler::slurm::SlurmScheduler;
use cerise_adapters::scheduler::ssh::SshScheduler;
use cerise_adapters::transport::local::LocalTransport;
use cerise_adapters::transport::ssh::SshTransport;
use cerise_adapters::transport::webdav::WebDavTransport;
use cerise_adapters::{CredentialError, Scheduler, Transport};
use cerise_engine::{FilesConfig, JobsConfig};
use std::sync::Arc;
use thiserror::Error;

const DEFAULT_SSH_PORT: u16 = 22;

#[derive(Debug, Error)]
pub enum WiringError {
    #[error("unknown transport scheme: {0}")]
    UnknownTransportScheme(String),
    #[error("unknown scheduler scheme: {0}")]
    UnknownSchedulerScheme(String),
    #[error(transparent)]
    Credential(#[from] CredentialError),
}

fn split_host_port(location: &str, default_port: u16) -> (String, u16) {
    match location.rsplit_once(':') {
        Some((host, port)) => match port.parse() {
            Ok(port) => (host.to_string(), port),
            Err(_) => (location.to_string(), default_port),
        },
        None => (location.to_string(), default_port),
    }
}

pub fn build_transport(files: &FilesConfig) -> Result<Arc<dyn Transport>, WiringError> {
    match files.scheme.as_str() {
        "local" => Ok(Arc::new(LocalTransport::new(files.path.clone()))),
        "ssh" => {
            let credentials = resolve_files_credentials(files.username.as_deref(), files.password.as_deref())?;
            let (host, port) = split_host_port(&files.path, DEFAULT_SSH_PORT);
            Ok(Arc::new(SshTransport::new(host, port, credentials)))
        }
        "webdav" => {
            let credentials = resolve_files_credentials(files.username.as_deref(), files.password.as_deref())?;
            Ok(Arc::new(WebDavTransport::new(files.path.clone(), credentials)))
        }
        other => Err(WiringError::UnknownTransportScheme(other.to_string())),
    }
}

pub fn build_scheduler(jobs: &JobsConfig) -> Result<Arc<dyn Scheduler>, WiringError> {
    match jobs.scheme.as_str() {
        "local" => Ok(Arc::new(LocalScheduler::new())),
        "ssh" => {
            let credentials = resolve_job_credentials(jobs.username.as_deref(), jobs.password.as_deref())?;
            let (host, port) = split_host_port(&jobs.location, DEFAULT_SSH_PORT);
            Ok(Arc::new(SshScheduler::new(host, port, credentials)))
        }
        "slurm" => {
            let credentials = resolve_job_credentials(jobs.username.as_deref(), jobs.password.as_deref())?;
            let (host, port) = split_host_port(&jobs.location, DEFAULT_SSH_PORT);
            Ok(Arc::new(SlurmScheduler::with_queue(
                host,
                port,
                credentials,
                jobs.queue_name.clone(),
                jobs.slots_per_node,
            )))
        }
        other => Err(WiringError::UnknownSchedulerScheme(other.to_string())),
    }
}

#[cfg(test)]
#[path = "wiring_tests.rs"]
mod tests;
