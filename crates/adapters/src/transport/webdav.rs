// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `webdav` transport: stages and destages files against a WebDAV
//! endpoint (the shape the reference implementation's file-access
//! service exposes) via HTTP `MKCOL`/`PUT`/`GET`/`PROPFIND`/`DELETE`.

use super::Transport;
use crate::credential::Credentials;
use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

pub struct WebDavTransport {
    base_url: String,
    client: Client,
    credentials: Credentials,
}

impl WebDavTransport {
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        WebDavTransport {
            base_url: base_url.into(),
            client: Client::new(),
            credentials,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.basic_auth(&self.credentials.username, self.credentials.password.as_ref())
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Http(err.to_string())
    }
}

#[async_trait]
impl Transport for WebDavTransport {
    async fn create_dir(&self, path: &str) -> Result<(), TransportError> {
        let response = self
            .authed(self.client.request(
                reqwest::Method::from_bytes(b"MKCOL").expect("MKCOL is a valid method token"),
                self.url(path),
            ))
            .send()
            .await?;
        // Created or already-present (405 Method Not Allowed) both count.
        if response.status().is_success() || response.status() == StatusCode::METHOD_NOT_ALLOWED {
            Ok(())
        } else {
            Err(TransportError::Http(format!("MKCOL {path}: {}", response.status())))
        }
    }

    async fn write_file(&self, path: &str, bytes: &[u8]) -> Result<(), TransportError> {
        let response = self
            .authed(self.client.put(self.url(path)))
            .body(bytes.to_vec())
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(TransportError::Http(format!("PUT {path}: {}", response.status())))
        }
    }

    async fn read_file(&self, path: &str) -> Result<Vec<u8>, TransportError> {
        let response = self.authed(self.client.get(self.url(path))).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(TransportError::NotFound(path.to_string()));
        }
        if !response.status().is_success() {
            return Err(TransportError::Http(format!("GET {path}: {}", response.status())));
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<String>, TransportError> {
        let response = self
            .authed(self.client.request(
                reqwest::Method::from_bytes(b"PROPFIND").expect("PROPFIND is a valid method token"),
                self.url(path),
            ))
            .header("Depth", "1")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(TransportError::Http(format!("PROPFIND {path}: {}", response.status())));
        }
        let body = response.text().await?;
        Ok(parse_propfind_basenames(&body))
    }

    async fn remove_tree(&self, path: &str) -> Result<(), TransportError> {
        let response = self.authed(self.client.delete(self.url(path))).send().await?;
        if response.status().is_success() || response.status() == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(TransportError::Http(format!("DELETE {path}: {}", response.status())))
        }
    }
}

/// Extract `<d:href>` basenames from a minimal WebDAV PROPFIND response.
/// Deliberately not a full XML parser: servers vary in namespace prefix,
/// so this scans for the `href` tag by local name.
fn parse_propfind_basenames(body: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = body;
    while let Some(start) = rest.find("href>") {
        let after_open = &rest[start + "href>".len()..];
        let Some(end) = after_open.find("</") else {
            break;
        };
        let href = &after_open[..end];
        if let Some(basename) = href.trim_end_matches('/').rsplit('/').next() {
            if !basename.is_empty() {
                names.push(basename.to_string());
            }
        }
        rest = &after_open[end..];
    }
    // The collection's own entry always self-references; drop duplicates
    // and keep first occurrence order stable for tests.
    let mut seen = std::collections::HashSet::new();
    names.retain(|n| seen.insert(n.clone()));
    names
}

#[cfg(test)]
#[path = "webdav_tests.rs"]
mod tests;
