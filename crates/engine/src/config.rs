// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration loading: the `jobs.*`/`files.*`/`store-location-*`
//! keys from spec.md §6, deserialized via `toml`.
//!
//! The original implementation has two parallel Local File Manager
//! configuration schemes: `local-base-path`/`store-location-service`
//! and `file-store-path`/`file-store-location`. This implementation
//! adopts the `store-location-service`/`store-location-client` naming
//! and rejects the deprecated `file-store-*` keys outright at load
//! time, rather than silently ignoring them.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;

const DEPRECATED_KEYS: &[&str] = &["file-store-path", "file-store-location"];

fn default_scheme() -> String {
    "local".to_string()
}

fn default_slots_per_node() -> u32 {
    1
}

fn default_cwl_runner() -> String {
    "$CERISE_API_FILES/cerise/cwltiny.py".to_string()
}

fn default_sweep_interval_ms() -> u64 {
    5_000
}

fn default_transport_error_deadline_ms() -> u64 {
    60_000
}

/// `jobs.*` configuration: where and how the CWL runner is submitted.
#[derive(Debug, Clone, Deserialize)]
pub struct JobsConfig {
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default)]
    pub location: String,
    #[serde(rename = "queue-name", default)]
    pub queue_name: Option<String>,
    #[serde(rename = "slots-per-node", default = "default_slots_per_node")]
    pub slots_per_node: u32,
    #[serde(rename = "cwl-runner", default = "default_cwl_runner")]
    pub cwl_runner: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl JobsConfig {
    /// Substitute `$CERISE_USERNAME` then `$CERISE_API_FILES` into the
    /// configured runner path. Order matches the original
    /// (`xenon_job_runner.py`): username first, then the API files
    /// path, since the username itself cannot contain the literal
    /// `$CERISE_API_FILES` token.
    pub fn resolved_cwl_runner(&self, api_files_path: &str) -> String {
        let mut runner = self.cwl_runner.clone();
        if let Some(username) = &self.username {
            runner = runner.replace("$CERISE_USERNAME", username);
        }
        runner.replace("$CERISE_API_FILES", api_files_path)
    }
}

/// `files.*` configuration: the remote transport.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Top-level configuration, mapping spec.md §6's nested key table.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub jobs: JobsConfig,
    pub files: FilesConfig,
    #[serde(rename = "store-location-service")]
    pub store_location_service: String,
    #[serde(rename = "store-location-client")]
    pub store_location_client: String,
    /// How often the execution manager sweeps the job store. Not part
    /// of spec.md's original configuration table; added so the runner
    /// loop's cadence is configurable rather than a hardcoded constant.
    #[serde(rename = "sweep-interval-ms", default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,
    /// spec.md §7's "configurable deadline" for promoting a persistent
    /// transport error to `SystemError`.
    #[serde(rename = "transport-error-deadline-ms", default = "default_transport_error_deadline_ms")]
    pub transport_error_deadline_ms: u64,
}

impl Config {
    /// Parse configuration from a TOML document, rejecting the
    /// deprecated `file-store-*` key names up front.
    pub fn from_toml_str(body: &str) -> Result<Config, ConfigError> {
        let value: toml::Value = toml::from_str(body)?;
        reject_deprecated_keys(&value)?;
        value.try_into().map_err(ConfigError::Parse)
    }

    /// Load and parse configuration from a file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let body = std::fs::read_to_string(path)?;
        Self::from_toml_str(&body)
    }
}

fn reject_deprecated_keys(value: &toml::Value) -> Result<(), ConfigError> {
    let toml::Value::Table(table) = value else {
        return Ok(());
    };
    for key in DEPRECATED_KEYS {
        if table.contains_key(*key) {
            return Err(ConfigError::DeprecatedKey(key));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
