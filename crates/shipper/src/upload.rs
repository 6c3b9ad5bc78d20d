// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Upload client
//!
//! Sends one rotated usage file to the collection service. The request is
//! built once per file and handed to a [`Transport`] session, which is
//! retried according to the configured [`RetryPolicy`].

use crate::config::{Credentials, DEFAULT_REQUEST_TIMEOUT_SECS, ShipperConfig};
use crate::error::UploadError;
use crate::retry::{RetryPolicy, execute_with_retry};
use base64::Engine;
use std::path::Path;
use std::time::Duration;

/// Header carrying the original file name; multipart bodies do not always
/// preserve it.
pub const FILE_NAME_HEADER: &str = "FileName";
pub const ACCEPT_APPLICATION_JSON: &str = "application/json";
/// Name of the multipart part holding the file bytes
pub const FILE_PART_NAME: &str = "file";

/// Everything needed to post one usage file.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub endpoint: String,
    pub file_name: String,
    /// Complete `Authorization` header value
    pub authorization: String,
    pub body: Vec<u8>,
    /// Applies to each attempt separately
    pub timeout: Duration,
}

impl std::fmt::Debug for UploadRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadRequest")
            .field("endpoint", &self.endpoint)
            .field("file_name", &self.file_name)
            .field("authorization", &"<redacted>")
            .field("body_len", &self.body.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Opens sessions against the upload service.
pub trait Transport {
    /// A fresh session is opened for each file and dropped once that file
    /// succeeds or runs out of attempts.
    fn open(&self) -> Result<Box<dyn Session + '_>, UploadError>;
}

/// A single connection-holding resource.
pub trait Session {
    /// One attempt. Returns the response body on a 2xx status; every other
    /// outcome is an error.
    fn post(&self, request: &UploadRequest) -> Result<String, UploadError>;
}

/// `Basic base64(username:password)`
pub fn basic_auth_header(credentials: &Credentials) -> Result<String, UploadError> {
    if credentials.username.is_empty() {
        return Err(UploadError::Credentials("username is empty".to_string()));
    }
    if credentials.username.contains(':') {
        return Err(UploadError::Credentials(
            "username must not contain ':'".to_string(),
        ));
    }
    let pair = format!("{}:{}", credentials.username, credentials.password);
    let encoded = base64::engine::general_purpose::STANDARD.encode(pair.as_bytes());
    Ok(format!("Basic {encoded}"))
}

pub struct UploadClient<'a> {
    transport: &'a dyn Transport,
    endpoint: String,
    credentials: Credentials,
    policy: RetryPolicy,
    timeout: Duration,
}

impl<'a> UploadClient<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        endpoint: impl Into<String>,
        credentials: Credentials,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            credentials,
            policy,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn from_config(config: &ShipperConfig, transport: &'a dyn Transport) -> Self {
        Self::new(
            transport,
            config.upload_endpoint(),
            config.credentials.clone(),
            config.retry_policy(),
        )
        .with_timeout(config.request_timeout())
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Upload one file, logging the outcome. Returns true once the service
    /// has accepted the file.
    pub fn upload(&self, path: &Path, file_name: &str) -> bool {
        match self.try_upload(path, file_name) {
            Ok(response) => {
                diagnostics::log_info!(
                    "Usage file {file_name} uploaded successfully. Server response: {response}",
                    file_name: file_name,
                    response: response.as_str()
                );
                true
            }
            Err(e) => {
                let error = e.to_string();
                diagnostics::log_error!(
                    "Error uploading usage file {file_name}: {error}",
                    file_name: file_name,
                    error: error.as_str()
                );
                false
            }
        }
    }

    /// Upload one file and return the service's response body.
    pub fn try_upload(&self, path: &Path, file_name: &str) -> Result<String, UploadError> {
        let authorization = basic_auth_header(&self.credentials)?;
        let body = std::fs::read(path).map_err(|source| UploadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let request = UploadRequest {
            endpoint: self.endpoint.clone(),
            file_name: file_name.to_string(),
            authorization,
            body,
            timeout: self.timeout,
        };

        let session = self.transport.open()?;
        execute_with_retry(&self.policy, |_| session.post(&request)).map_err(|exhausted| {
            UploadError::RetriesExhausted {
                attempts: exhausted.attempts,
                last: Box::new(exhausted.last),
            }
        })
    }
}
