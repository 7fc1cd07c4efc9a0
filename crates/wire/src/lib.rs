// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cerise-wire: DTOs for the job-service facade that an external REST
//! layer (out of scope here) would serve over HTTP.

mod types;

pub use types::{CreateJobRequest, JobRecord, JobSummary};
