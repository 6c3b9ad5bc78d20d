// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for the usage shipper

use std::path::PathBuf;
use thiserror::Error;

/// Configuration could not be produced; the run is abandoned.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML configuration: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid upload URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Missing credentials: set {0} or provide credentials in the config file")]
    MissingCredentials(&'static str),
}

/// Raised by the external rotate operation.
#[derive(Error, Debug)]
pub enum RotationError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rotation failed: {0}")]
    Failed(String),
}

/// Anything that prevents a single usage file from being delivered.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Failed to read usage file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid credentials: {0}")]
    Credentials(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status} from upload service: {body}")]
    Status { status: u16, body: String },

    #[error("Upload failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: usize,
        #[source]
        last: Box<UploadError>,
    },
}

impl From<reqwest::Error> for UploadError {
    fn from(e: reqwest::Error) -> Self {
        UploadError::Transport(e.to_string())
    }
}
