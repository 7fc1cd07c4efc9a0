// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `ssh` scheduler: runs the workflow runner as a detached remote
//! process over a bare SSH exec channel, polling liveness with `kill
//! -0`. No queue — appropriate for a single remote workstation rather
//! than a shared cluster (see the `slurm` scheduler for that case).

use super::{RemoteStatus, Scheduler};
use crate::credential::Credentials;
use crate::error::SchedulerError;
use async_trait::async_trait;
use std::io::Read;
use std::net::TcpStream;

#[derive(Clone)]
pub struct SshScheduler {
    host: String,
    port: u16,
    credentials: Credentials,
}

impl SshScheduler {
    pub fn new(host: impl Into<String>, port: u16, credentials: Credentials) -> Self {
        SshScheduler { host: host.into(), port, credentials }
    }

    fn session(&self) -> Result<ssh2::Session, SchedulerError> {
        let tcp = TcpStream::connect((self.host.as_str(), self.port))
            .map_err(|err| SchedulerError::Ssh(format!("connect {}:{}: {err}", self.host, self.port)))?;
        let mut session = ssh2::Session::new().map_err(|err| SchedulerError::Ssh(err.to_string()))?;
        session.set_tcp_stream(tcp);
        session.handshake().map_err(|err| SchedulerError::Ssh(err.to_string()))?;
        match &self.credentials.password {
            Some(password) => session
                .userauth_password(&self.credentials.username, password)
                .map_err(|err| SchedulerError::Ssh(err.to_string()))?,
            None => session
                .userauth_agent(&self.credentials.username)
                .map_err(|err| SchedulerError::Ssh(err.to_string()))?,
        }
        Ok(session)
    }

    /// Run `command` on a fresh SSH exec channel, blocking. Returns the
    /// exit status and combined output.
    fn exec(&self, command: &str) -> Result<(i32, String), SchedulerError> {
        let session = self.session()?;
        let mut channel = session.channel_session().map_err(|err| SchedulerError::Ssh(err.to_string()))?;
        channel.exec(command).map_err(|err| SchedulerError::Ssh(err.to_string()))?;
        let mut output = String::new();
        channel.read_to_string(&mut output)?;
        channel.wait_close().map_err(|err| SchedulerError::Ssh(err.to_string()))?;
        let exit_status = channel.exit_status().map_err(|err| SchedulerError::Ssh(err.to_string()))?;
        Ok((exit_status, output))
    }

    /// Hand `command` to a blocking thread so the async runtime isn't
    /// stalled by `ssh2`'s synchronous I/O.
    async fn exec_blocking(&self, command: String) -> Result<(i32, String), SchedulerError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.exec(&command))
            .await
            .map_err(|err| SchedulerError::Ssh(format!("blocking task panicked: {err}")))?
    }

    /// Run `command` and return its combined output, ignoring the exit
    /// status. Used by [`super::slurm::SlurmScheduler`], whose own
    /// commands (`squeue`, `sacct`) use empty output rather than a
    /// non-zero exit code to mean "nothing found".
    pub(crate) async fn run_for_output(&self, command: &str) -> Result<String, SchedulerError> {
        let (_, output) = self.exec_blocking(command.to_string()).await?;
        Ok(output)
    }
}

#[async_trait]
impl Scheduler for SshScheduler {
    async fn submit(
        &self,
        workdir: &str,
        command: &str,
        args: &[String],
        stdout_path: &str,
        stderr_path: &str,
    ) -> Result<String, SchedulerError> {
        let args_joined = shell_join(args);
        let launch = format!(
            "cd {workdir} && nohup {command} {args_joined} >{stdout_path} 2>{stderr_path} </dev/null & echo $!"
        );
        let (status, output) = self.exec_blocking(launch).await?;
        if status != 0 {
            return Err(SchedulerError::SubmissionFailed(format!("exit {status}: {output}")));
        }
        let pid = output.trim();
        if pid.is_empty() || pid.parse::<u32>().is_err() {
            return Err(SchedulerError::SubmissionFailed(format!("unexpected launcher output: {output:?}")));
        }
        Ok(pid.to_string())
    }

    async fn status(&self, remote_job_id: &str) -> Result<RemoteStatus, SchedulerError> {
        let command = format!("kill -0 {remote_job_id} 2>/dev/null; echo $?");
        let (_, output) = self.exec_blocking(command).await?;
        match output.trim() {
            "0" => Ok(RemoteStatus::Running),
            _ => Ok(RemoteStatus::Gone),
        }
    }

    async fn cancel(&self, remote_job_id: &str) -> Result<(), SchedulerError> {
        let command = format!("kill {remote_job_id} 2>/dev/null; true");
        self.exec_blocking(command).await?;
        Ok(())
    }
}

fn shell_join(args: &[String]) -> String {
    args.iter().map(|arg| shell_escape(arg)).collect::<Vec<_>>().join(" ")
}

fn shell_escape(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', "'\\''"))
}

#[cfg(test)]
#[path = "ssh_tests.rs"]
mod tests;
