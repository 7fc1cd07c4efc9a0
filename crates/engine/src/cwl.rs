// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CWL input-binding extraction.
//!
//! The CWL parser proper is out of scope (spec.md §1): an external
//! component is expected to understand the full grammar. What the
//! Local File Manager needs from it is narrower — given the job's
//! `local_input` document, which bindings name a file and what URL it
//! points at. [`WorkflowBindings`] is that seam; [`FlatCwlBindings`] is
//! a minimal built-in implementation that understands the flat
//! `{"id": {"class": "File", "location": "...", "basename": "..."}}`
//! input-object shape used throughout the original's own test suite,
//! not a general CWL grammar.

use crate::error::LocalFileError;
use serde_json::Value;

/// One file reference extracted from a job's input object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBinding {
    pub name: String,
    pub location: String,
    pub basename: String,
}

/// Extracts file bindings from a job's `local_input` document.
/// Implemented externally by a real CWL parser in a full deployment;
/// [`FlatCwlBindings`] stands in for it here.
pub trait WorkflowBindings: Send + Sync {
    fn file_bindings(&self, local_input: &Value) -> Result<Vec<FileBinding>, LocalFileError>;
}

/// Resolves file bindings from a flat CWL input object: a JSON object
/// whose values that are themselves objects with `"class": "File"` are
/// file references, keyed by binding name. Bindings are yielded in the
/// input object's key order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatCwlBindings;

impl WorkflowBindings for FlatCwlBindings {
    fn file_bindings(&self, local_input: &Value) -> Result<Vec<FileBinding>, LocalFileError> {
        let Value::Object(fields) = local_input else {
            return Err(LocalFileError::InvalidWorkflow(
                "local_input is not a JSON object".to_string(),
            ));
        };

        let mut bindings = Vec::new();
        for (name, value) in fields {
            let Value::Object(entry) = value else { continue };
            let is_file = matches!(entry.get("class"), Some(Value::String(class)) if class == "File");
            if !is_file {
                continue;
            }

            let location = entry
                .get("location")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    LocalFileError::InvalidWorkflow(format!("binding '{name}' has no location"))
                })?
                .to_string();

            let basename = entry
                .get("basename")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| basename_of(&location));

            bindings.push(FileBinding { name: name.clone(), location, basename });
        }
        Ok(bindings)
    }
}

fn basename_of(location: &str) -> String {
    location.rsplit('/').next().unwrap_or(location).to_string()
}

#[cfg(test)]
#[path = "cwl_tests.rs"]
mod tests;
