// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential resolution for remote transport/scheduler connections.
//!
//! Resolution follows a fallback chain, most specific first:
//!
//! ```text
//! CERISE_FILES_USERNAME / CERISE_FILES_PASSWORD   (files-transport specific)
//! CERISE_USERNAME / CERISE_PASSWORD               (shared with the job runner)
//! config-supplied username/password
//! ```
//!
//! The same chain, without the `_FILES` tier, resolves scheduler
//! credentials.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("no username configured (checked {0} and config)")]
    MissingUsername(&'static str),
    #[error("no password configured (checked {0} and config)")]
    MissingPassword(&'static str),
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

/// Resolve file-transport credentials: `CERISE_FILES_*` then
/// `CERISE_*` then the config-supplied fallback.
pub fn resolve_files_credentials(
    config_username: Option<&str>,
    config_password: Option<&str>,
) -> Result<Credentials, CredentialError> {
    let username = env_nonempty("CERISE_FILES_USERNAME")
        .or_else(|| env_nonempty("CERISE_USERNAME"))
        .or_else(|| config_username.map(str::to_string))
        .ok_or(CredentialError::MissingUsername("CERISE_FILES_USERNAME/CERISE_USERNAME"))?;

    let password = env_nonempty("CERISE_FILES_PASSWORD")
        .or_else(|| env_nonempty("CERISE_PASSWORD"))
        .or_else(|| config_password.map(str::to_string));

    Ok(Credentials { username, password })
}

/// Resolve job-runner credentials: `CERISE_*` then the config-supplied
/// fallback.
pub fn resolve_job_credentials(
    config_username: Option<&str>,
    config_password: Option<&str>,
) -> Result<Credentials, CredentialError> {
    let username = env_nonempty("CERISE_USERNAME")
        .or_else(|| config_username.map(str::to_string))
        .ok_or(CredentialError::MissingUsername("CERISE_USERNAME"))?;

    let password =
        env_nonempty("CERISE_PASSWORD").or_else(|| config_password.map(str::to_string));

    Ok(Credentials { username, password })
}

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "credential_tests.rs"]
mod tests;
