// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors raised by a [`crate::transport::Transport`] implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ssh error: {0}")]
    Ssh(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("no entry at remote path {0}")]
    NotFound(String),
}

/// Errors raised by a [`crate::scheduler::Scheduler`] implementation.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ssh error: {0}")]
    Ssh(String),
    #[error("no such remote job: {0}")]
    UnknownJob(String),
    #[error("submission failed: {0}")]
    SubmissionFailed(String),
}
