// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `slurm` scheduler: submits via `sbatch`, polls via `squeue`,
//! cancels via `scancel`, all run over an SSH exec channel against the
//! cluster's login node.

use super::ssh::SshScheduler;
use super::{RemoteStatus, Scheduler};
use crate::credential::Credentials;
use crate::error::SchedulerError;
use async_trait::async_trait;

pub struct SlurmScheduler {
    login_node: SshScheduler,
    /// `jobs.queue-name` from configuration; emitted as `--partition`
    /// when set.
    queue_name: Option<String>,
    /// `jobs.slots-per-node` from configuration; emitted as
    /// `--ntasks-per-node`.
    slots_per_node: u32,
}

impl SlurmScheduler {
    pub fn new(host: impl Into<String>, port: u16, credentials: Credentials) -> Self {
        Self::with_queue(host, port, credentials, None, 1)
    }

    pub fn with_queue(
        host: impl Into<String>,
        port: u16,
        credentials: Credentials,
        queue_name: Option<String>,
        slots_per_node: u32,
    ) -> Self {
        SlurmScheduler {
            login_node: SshScheduler::new(host, port, credentials),
            queue_name,
            slots_per_node,
        }
    }

    fn batch_script(&self, workdir: &str, command: &str, args: &[String], stdout_path: &str, stderr_path: &str) -> String {
        let args_joined = args
            .iter()
            .map(|a| format!("'{}'", a.replace('\'', "'\\''")))
            .collect::<Vec<_>>()
            .join(" ");
        let mut directives = format!(
            "#SBATCH --output={stdout_path}\n#SBATCH --error={stderr_path}\n#SBATCH --chdir={workdir}\n"
        );
        if let Some(queue) = &self.queue_name {
            directives.push_str(&format!("#SBATCH --partition={queue}\n"));
        }
        directives.push_str(&format!("#SBATCH --ntasks-per-node={}\n", self.slots_per_node));
        format!("#!/bin/sh\n{directives}{command} {args_joined}\n")
    }

    fn parse_job_id(sbatch_output: &str) -> Option<String> {
        // sbatch prints "Submitted batch job 12345"
        sbatch_output.trim().rsplit(' ').next().map(str::to_string)
    }

    fn parse_squeue_state(squeue_output: &str) -> RemoteStatus {
        match squeue_output.trim() {
            "" => RemoteStatus::Gone,
            "PENDING" | "CONFIGURING" => RemoteStatus::Waiting,
            "RUNNING" | "COMPLETING" => RemoteStatus::Running,
            "COMPLETED" => RemoteStatus::Done,
            _ => RemoteStatus::Failed,
        }
    }
}

#[async_trait]
impl Scheduler for SlurmScheduler {
    async fn submit(
        &self,
        workdir: &str,
        command: &str,
        args: &[String],
        stdout_path: &str,
        stderr_path: &str,
    ) -> Result<String, SchedulerError> {
        let script = self.batch_script(workdir, command, args, stdout_path, stderr_path);
        let script_path = format!("{workdir}/.cerise-submit.sh");
        let write_and_submit = format!(
            "cat > {script_path} <<'CERISE_EOF'\n{script}CERISE_EOF\nsbatch {script_path}"
        );
        let output = self.login_node.run_for_output(&write_and_submit).await?;
        Self::parse_job_id(&output)
            .ok_or_else(|| SchedulerError::SubmissionFailed(format!("could not parse sbatch output: {output:?}")))
    }

    async fn status(&self, remote_job_id: &str) -> Result<RemoteStatus, SchedulerError> {
        let command = format!("squeue -j {remote_job_id} -h -o %T || true");
        let output = self.login_node.run_for_output(&command).await?;
        if output.trim().is_empty() {
            // squeue drops jobs from its view shortly after completion;
            // sacct retains the terminal state.
            let sacct = format!("sacct -j {remote_job_id} -n -o State -X");
            let state = self.login_node.run_for_output(&sacct).await?;
            return Ok(Self::parse_squeue_state(state.lines().next().unwrap_or("")));
        }
        Ok(Self::parse_squeue_state(&output))
    }

    async fn cancel(&self, remote_job_id: &str) -> Result<(), SchedulerError> {
        let command = format!("scancel {remote_job_id}");
        self.login_node.run_for_output(&command).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "slurm_tests.rs"]
mod tests;
