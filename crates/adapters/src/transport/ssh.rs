// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `ssh` transport: stages and destages files over SFTP.
//!
//! `ssh2` is a blocking library; every operation below hands the session
//! off to a blocking thread via [`tokio::task::spawn_blocking`] so it
//! never stalls the async runtime.

use super::Transport;
use crate::credential::Credentials;
use crate::error::TransportError;
use async_trait::async_trait;
use std::net::TcpStream;
use std::path::Path;
use std::sync::Mutex;

pub struct SshTransport {
    host: String,
    port: u16,
    credentials: Credentials,
    session: Mutex<Option<ssh2::Session>>,
}

impl SshTransport {
    pub fn new(host: impl Into<String>, port: u16, credentials: Credentials) -> Self {
        SshTransport {
            host: host.into(),
            port,
            credentials,
            session: Mutex::new(None),
        }
    }

    fn connect(&self) -> Result<ssh2::Session, TransportError> {
        let tcp = TcpStream::connect((self.host.as_str(), self.port))
            .map_err(|err| TransportError::Ssh(format!("connect {}:{}: {err}", self.host, self.port)))?;
        let mut session = ssh2::Session::new().map_err(|err| TransportError::Ssh(err.to_string()))?;
        session.set_tcp_stream(tcp);
        session.handshake().map_err(|err| TransportError::Ssh(err.to_string()))?;

        match &self.credentials.password {
            Some(password) => session
                .userauth_password(&self.credentials.username, password)
                .map_err(|err| TransportError::Ssh(err.to_string()))?,
            None => session
                .userauth_agent(&self.credentials.username)
                .map_err(|err| TransportError::Ssh(err.to_string()))?,
        }

        if !session.authenticated() {
            return Err(TransportError::Ssh("authentication failed".to_string()));
        }
        Ok(session)
    }

    fn sftp(&self) -> Result<ssh2::Sftp, TransportError> {
        let mut guard = self.session.lock().expect("ssh session mutex poisoned");
        if guard.is_none() {
            *guard = Some(self.connect()?);
        }
        guard
            .as_ref()
            .expect("session just populated")
            .sftp()
            .map_err(|err| TransportError::Ssh(err.to_string()))
    }
}

#[async_trait]
impl Transport for SshTransport {
    async fn create_dir(&self, path: &str) -> Result<(), TransportError> {
        let path = path.to_string();
        self.with_sftp(move |sftp| {
            mkdir_p(sftp, Path::new(&path))?;
            Ok(())
        })
        .await
    }

    async fn write_file(&self, path: &str, bytes: &[u8]) -> Result<(), TransportError> {
        let path = path.to_string();
        let bytes = bytes.to_vec();
        self.with_sftp(move |sftp| {
            if let Some(parent) = Path::new(&path).parent() {
                mkdir_p(sftp, parent)?;
            }
            let mut file = sftp
                .create(Path::new(&path))
                .map_err(|err| TransportError::Ssh(err.to_string()))?;
            std::io::Write::write_all(&mut file, &bytes)?;
            Ok(())
        })
        .await
    }

    async fn read_file(&self, path: &str) -> Result<Vec<u8>, TransportError> {
        let path_for_err = path.to_string();
        let path = path.to_string();
        self.with_sftp(move |sftp| {
            let mut file = sftp.open(Path::new(&path)).map_err(|_| {
                TransportError::NotFound(path_for_err.clone())
            })?;
            let mut bytes = Vec::new();
            std::io::Read::read_to_end(&mut file, &mut bytes)?;
            Ok(bytes)
        })
        .await
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<String>, TransportError> {
        let path = path.to_string();
        self.with_sftp(move |sftp| {
            let entries = sftp
                .readdir(Path::new(&path))
                .map_err(|err| TransportError::Ssh(err.to_string()))?;
            Ok(entries
                .into_iter()
                .filter_map(|(p, _)| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                .collect())
        })
        .await
    }

    async fn remove_tree(&self, path: &str) -> Result<(), TransportError> {
        let path = path.to_string();
        self.with_sftp(move |sftp| {
            match sftp.stat(Path::new(&path)) {
                Ok(stat) if stat.is_dir() => remove_dir_recursive(sftp, Path::new(&path))?,
                Ok(_) => {
                    let _ = sftp.unlink(Path::new(&path));
                }
                Err(_) => {}
            }
            Ok(())
        })
        .await
    }
}

impl SshTransport {
    async fn with_sftp<T, F>(&self, f: F) -> Result<T, TransportError>
    where
        T: Send + 'static,
        F: FnOnce(&ssh2::Sftp) -> Result<T, TransportError> + Send + 'static,
    {
        let sftp = self.sftp()?;
        tokio::task::spawn_blocking(move || f(&sftp))
            .await
            .map_err(|err| TransportError::Ssh(format!("blocking task panicked: {err}")))?
    }
}

fn mkdir_p(sftp: &ssh2::Sftp, path: &Path) -> Result<(), TransportError> {
    if sftp.stat(path).is_ok() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        mkdir_p(sftp, parent)?;
    }
    match sftp.mkdir(path, 0o755) {
        Ok(()) => Ok(()),
        Err(_) if sftp.stat(path).is_ok() => Ok(()),
        Err(err) => Err(TransportError::Ssh(err.to_string())),
    }
}

fn remove_dir_recursive(sftp: &ssh2::Sftp, path: &Path) -> Result<(), TransportError> {
    let entries = sftp
        .readdir(path)
        .map_err(|err| TransportError::Ssh(err.to_string()))?;
    for (entry_path, stat) in entries {
        if stat.is_dir() {
            remove_dir_recursive(sftp, &entry_path)?;
        } else {
            let _ = sftp.unlink(&entry_path);
        }
    }
    sftp.rmdir(path).map_err(|err| TransportError::Ssh(err.to_string()))?;
    Ok(())
}
