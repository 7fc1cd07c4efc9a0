// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `local` scheduler: forks the workflow runner as a child process
//! on the same host the daemon runs on. Used for development and for
//! single-machine deployments that skip a real batch scheduler.

use super::{RemoteStatus, Scheduler};
use crate::error::SchedulerError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::process::Stdio;
use tokio::process::Child;

pub struct LocalScheduler {
    children: Mutex<HashMap<String, Child>>,
    exit_codes: Mutex<HashMap<String, i32>>,
}

impl Default for LocalScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalScheduler {
    pub fn new() -> Self {
        LocalScheduler {
            children: Mutex::new(HashMap::new()),
            exit_codes: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl Scheduler for LocalScheduler {
    async fn submit(
        &self,
        workdir: &str,
        command: &str,
        args: &[String],
        stdout_path: &str,
        stderr_path: &str,
    ) -> Result<String, SchedulerError> {
        let stdout = std::fs::File::create(stdout_path)?;
        let stderr = std::fs::File::create(stderr_path)?;
        let child = tokio::process::Command::new(command)
            .args(args)
            .current_dir(workdir)
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .spawn()?;

        let id = child
            .id()
            .ok_or_else(|| SchedulerError::SubmissionFailed("child exited before id was read".to_string()))?
            .to_string();
        self.children.lock().insert(id.clone(), child);
        Ok(id)
    }

    async fn status(&self, remote_job_id: &str) -> Result<RemoteStatus, SchedulerError> {
        if let Some(code) = self.exit_codes.lock().get(remote_job_id) {
            return Ok(if *code == 0 { RemoteStatus::Done } else { RemoteStatus::Failed });
        }

        let mut children = self.children.lock();
        let Some(child) = children.get_mut(remote_job_id) else {
            return Ok(RemoteStatus::Gone);
        };
        match child.try_wait()? {
            None => Ok(RemoteStatus::Running),
            Some(status) => {
                let code = status.code().unwrap_or(-1);
                self.exit_codes.lock().insert(remote_job_id.to_string(), code);
                children.remove(remote_job_id);
                Ok(if code == 0 { RemoteStatus::Done } else { RemoteStatus::Failed })
            }
        }
    }

    async fn cancel(&self, remote_job_id: &str) -> Result<(), SchedulerError> {
        let mut children = self.children.lock();
        if let Some(child) = children.get_mut(remote_job_id) {
            let _ = child.start_kill();
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
