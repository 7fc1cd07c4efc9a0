// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `JobService` facade: the seam spec.md §6 describes an external
//! REST layer calling into (create/list/get/cancel/delete). Thin
//! wrapper over the job store and execution manager — no policy of its
//! own beyond translating to/from the wire DTOs.

use cerise_core::{Clock, JobId};
use cerise_engine::ExecutionManager;
use cerise_storage::JobStore;
use cerise_wire::{CreateJobRequest, JobRecord, JobSummary};
use std::sync::Arc;

pub struct JobService<C: Clock> {
    store: Arc<JobStore<C>>,
    manager: Arc<ExecutionManager<C>>,
}

impl<C: Clock> JobService<C> {
    pub fn new(store: Arc<JobStore<C>>, manager: Arc<ExecutionManager<C>>) -> Self {
        JobService { store, manager }
    }

    /// Insert a new job in state `Submitted`. Corresponds to spec.md
    /// §6's "create (returns id, initial state `Submitted`)" and the
    /// 201 status its REST layer would respond with.
    pub fn create(&self, request: CreateJobRequest) -> JobId {
        self.store.create(request.name, request.workflow, request.local_input)
    }

    /// One-line summaries for every present job.
    pub fn list(&self) -> Vec<JobSummary> {
        self.store.list().iter().map(JobSummary::from).collect()
    }

    /// The full record for one job, or `None` if absent (404 at the
    /// REST layer).
    pub fn get(&self, id: &JobId) -> Option<JobRecord> {
        self.store.get(id).as_ref().map(JobRecord::from)
    }

    /// Record cancellation intent. Returns whether the job was in a
    /// cancellable state.
    pub fn cancel(&self, id: &JobId) -> bool {
        self.manager.request_cancel(id)
    }

    /// Record deletion intent; the execution manager tears the job
    /// down once it reaches a terminal state. Returns whether the job
    /// exists.
    pub fn delete(&self, id: &JobId) -> bool {
        self.manager.request_delete(id)
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
