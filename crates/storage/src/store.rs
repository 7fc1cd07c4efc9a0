// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job store: the sole owner of job records.
//!
//! Every mutator routes through a single [`parking_lot::ReentrantMutex`]
//! guarding a [`RefCell`]-wrapped map, so a caller already holding the
//! lock on its thread (a helper calling another store method from inside
//! a [`JobStore::with_store`] closure) re-enters instead of deadlocking.
//! `try_transition` is the only way `Job::state` moves; everything else
//! that needs to inspect or update a record does so through
//! [`JobStore::with_store`], a scoped acquisition that releases on every
//! exit path including a panic unwind (`parking_lot` poisons nothing, so
//! a panicking closure still leaves the lock usable). The `RefCell`'s
//! own borrow check still panics on a genuine overlapping `&mut`
//! (two nested `with_store` closures both live at once); it does not
//! panic on the common case this type exists for — a nested call that
//! only needs read access, or that borrows, finishes, and drops before
//! the outer closure borrows again.

use crate::error::StorageError;
use crate::snapshot;
use cerise_core::{Clock, Job, JobConfig, JobId, JobState};
use parking_lot::ReentrantMutex;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

pub struct JobStore<C: Clock> {
    jobs: ReentrantMutex<RefCell<HashMap<JobId, Job>>>,
    snapshot_path: Option<PathBuf>,
    clock: C,
}

impl<C: Clock> JobStore<C> {
    /// An in-memory store with no backing snapshot file. Useful for tests
    /// and for any deployment that accepts losing in-flight jobs on crash.
    pub fn in_memory(clock: C) -> Self {
        JobStore {
            jobs: ReentrantMutex::new(RefCell::new(HashMap::new())),
            snapshot_path: None,
            clock,
        }
    }

    /// A store backed by a snapshot file at `path`. Loads the most recent
    /// valid snapshot (primary, else rotated backup, else empty) before
    /// returning.
    pub fn open(path: impl Into<PathBuf>, clock: C) -> Result<Self, StorageError> {
        let path = path.into();
        let jobs = snapshot::load_snapshot(&path)?;
        Ok(JobStore {
            jobs: ReentrantMutex::new(RefCell::new(jobs)),
            snapshot_path: Some(path),
            clock,
        })
    }

    fn persist(&self, jobs: &HashMap<JobId, Job>) {
        let Some(path) = &self.snapshot_path else {
            return;
        };
        if let Err(err) = snapshot::write_snapshot(path, jobs) {
            tracing::error!(error = %err, path = %path.display(), "failed to persist job store snapshot");
        }
    }

    /// Insert a freshly submitted job in state `Submitted`. Returns its
    /// newly minted id.
    pub fn create(&self, name: impl Into<String>, workflow: impl Into<String>, local_input: Value) -> JobId {
        let config = JobConfig {
            name: name.into(),
            workflow: workflow.into(),
            local_input,
        };
        let job = Job::new(config, self.clock.epoch_ms());
        let id = job.id.clone();
        let guard = self.jobs.lock();
        let mut jobs = guard.borrow_mut();
        jobs.insert(id.clone(), job);
        self.persist(&jobs);
        id
    }

    /// Enumerate all present records, in no particular order.
    pub fn list(&self) -> Vec<Job> {
        let guard = self.jobs.lock();
        let jobs = guard.borrow();
        jobs.values().cloned().collect()
    }

    /// Look up a job by id. Absent if never created or already deleted.
    pub fn get(&self, id: &JobId) -> Option<Job> {
        let guard = self.jobs.lock();
        let jobs = guard.borrow();
        jobs.get(id).cloned()
    }

    /// Remove a record outright.
    pub fn delete(&self, id: &JobId) {
        let guard = self.jobs.lock();
        let mut jobs = guard.borrow_mut();
        jobs.remove(id);
        self.persist(&jobs);
    }

    /// Scoped acquisition: run `f` with exclusive access to the
    /// materialized map, then persist whatever it left behind. `f`
    /// observes and may mutate any field; by convention it does not
    /// assign `Job::state` directly — that goes through
    /// [`JobStore::try_transition`] so every transition is a CAS. `f`
    /// may itself call back into another `JobStore` method that only
    /// needs to borrow the map after this one's `RefMut` has been
    /// dropped; the surrounding lock is reentrant on this thread either
    /// way.
    pub fn with_store<R>(&self, f: impl FnOnce(&mut HashMap<JobId, Job>) -> R) -> R {
        let guard = self.jobs.lock();
        let result = {
            let mut jobs = guard.borrow_mut();
            f(&mut jobs)
        };
        self.persist(&guard.borrow());
        result
    }

    /// Atomic compare-and-swap on `Job::state`. Succeeds only if the
    /// job exists and its current state equals `from`; also bumps
    /// `updated_at_ms`. Returns whether the row changed.
    pub fn try_transition(&self, id: &JobId, from: JobState, to: JobState) -> bool {
        let guard = self.jobs.lock();
        let mut jobs = guard.borrow_mut();
        let Some(job) = jobs.get_mut(id) else {
            return false;
        };
        if job.state != from {
            return false;
        }
        job.state = to;
        job.updated_at_ms = self.clock.epoch_ms();
        self.persist(&jobs);
        true
    }

    /// Append one line to the job's append-only log.
    pub fn append_log(&self, id: &JobId, line: &str) -> bool {
        let guard = self.jobs.lock();
        let mut jobs = guard.borrow_mut();
        let Some(job) = jobs.get_mut(id) else {
            return false;
        };
        job.append_log(line);
        job.updated_at_ms = self.clock.epoch_ms();
        self.persist(&jobs);
        true
    }

    /// Set the deletion-requested flag. Idempotent.
    pub fn mark_please_delete(&self, id: &JobId) -> bool {
        let guard = self.jobs.lock();
        let mut jobs = guard.borrow_mut();
        let Some(job) = jobs.get_mut(id) else {
            return false;
        };
        job.please_delete = true;
        job.updated_at_ms = self.clock.epoch_ms();
        self.persist(&jobs);
        true
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
