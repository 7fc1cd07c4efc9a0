// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-component error enums, plus the boundary translation into the
//! five-member error taxonomy the Execution Manager acts on.

use thiserror::Error;

/// Errors raised while loading and validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(
        "deprecated config key '{0}' is not supported; use 'store-location-service'/'store-location-client' instead"
    )]
    DeprecatedKey(&'static str),
}

/// Errors raised by the Local File Manager.
#[derive(Debug, Error)]
pub enum LocalFileError {
    #[error("input file not found: {0}")]
    InputNotFound(String),
    #[error("could not parse workflow document: {0}")]
    InvalidWorkflow(String),
    #[error("unsupported URL scheme in file reference: {0}")]
    UnsupportedScheme(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("http error: {0}")]
    Http(String),
    #[error("no such job: {0}")]
    UnknownJob(String),
}

/// Errors raised by the Remote File Manager.
#[derive(Debug, Error)]
pub enum RemoteFileError {
    #[error("transport error: {0}")]
    Transport(#[from] cerise_adapters::TransportError),
    #[error("could not parse remote output description: {0}")]
    InvalidOutput(#[from] serde_json::Error),
    #[error("no such job: {0}")]
    UnknownJob(String),
}

/// Errors raised by the Remote Job Runner.
#[derive(Debug, Error)]
pub enum JobRunnerError {
    #[error("scheduler error: {0}")]
    Scheduler(#[from] cerise_adapters::SchedulerError),
    #[error("no such job: {0}")]
    UnknownJob(String),
}

/// The taxonomy from spec.md §7, produced at the Execution Manager's
/// boundary. Transport and scheduler errors never reach a state
/// transition decision directly — they are matched into this set first.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Missing input file, malformed workflow, unsupported scheme.
    /// Surfaces as `PermanentFailure`.
    #[error("input error: {0}")]
    Input(String),
    /// Transient network/SSH/WebDAV failure. Not reflected in state;
    /// retried on the next sweep.
    #[error("transport error: {0}")]
    Transport(String),
    /// Submission rejected by the scheduler. Surfaces as
    /// `PermanentFailure`.
    #[error("scheduler error: {0}")]
    Scheduler(String),
    /// Job store operation failed. Logged and retried at the next
    /// sweep.
    #[error("storage error: {0}")]
    Storage(#[from] cerise_storage::StorageError),
}

impl From<LocalFileError> for EngineError {
    fn from(err: LocalFileError) -> Self {
        match err {
            LocalFileError::InputNotFound(_)
            | LocalFileError::InvalidWorkflow(_)
            | LocalFileError::UnsupportedScheme(_)
            | LocalFileError::UnknownJob(_) => EngineError::Input(err.to_string()),
            LocalFileError::Io(_) | LocalFileError::Http(_) => EngineError::Transport(err.to_string()),
        }
    }
}

impl From<RemoteFileError> for EngineError {
    fn from(err: RemoteFileError) -> Self {
        match &err {
            RemoteFileError::Transport(_) => EngineError::Transport(err.to_string()),
            RemoteFileError::InvalidOutput(_) | RemoteFileError::UnknownJob(_) => {
                EngineError::Input(err.to_string())
            }
        }
    }
}

impl From<JobRunnerError> for EngineError {
    fn from(err: JobRunnerError) -> Self {
        match &err {
            JobRunnerError::Scheduler(cerise_adapters::SchedulerError::SubmissionFailed(_)) => {
                EngineError::Scheduler(err.to_string())
            }
            JobRunnerError::Scheduler(_) => EngineError::Transport(err.to_string()),
            JobRunnerError::UnknownJob(_) => EngineError::Input(err.to_string()),
        }
    }
}
