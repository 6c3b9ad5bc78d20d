// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP transport: multipart POST with `reqwest`'s blocking client

use crate::error::UploadError;
use crate::upload::{
    ACCEPT_APPLICATION_JSON, FILE_NAME_HEADER, FILE_PART_NAME, Session, Transport, UploadRequest,
};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::header::{ACCEPT, AUTHORIZATION};

/// Builds a new blocking client for every file.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpTransport;

struct HttpSession {
    client: reqwest::blocking::Client,
}

impl Transport for HttpTransport {
    fn open(&self) -> Result<Box<dyn Session + '_>, UploadError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| UploadError::Transport(format!("Failed to create HTTP client: {e}")))?;
        Ok(Box::new(HttpSession { client }))
    }
}

impl Session for HttpSession {
    fn post(&self, request: &UploadRequest) -> Result<String, UploadError> {
        let part = Part::bytes(request.body.clone())
            .file_name(request.file_name.clone())
            .mime_str("application/octet-stream")?;
        let form = Form::new().part(FILE_PART_NAME, part);

        let response = self
            .client
            .post(&request.endpoint)
            .timeout(request.timeout)
            .header(FILE_NAME_HEADER, &request.file_name)
            .header(AUTHORIZATION, &request.authorization)
            .header(ACCEPT, ACCEPT_APPLICATION_JSON)
            .multipart(form)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(UploadError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.text()?)
    }
}
