// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Shipper - periodic delivery of rotated usage files
//!
//! Each run rotates the active usage file if it has data, finds rotated
//! files that have not been delivered, uploads them one at a time in name
//! order and renames each delivered file with an `.uploaded` suffix.
//!
//! The file name is the delivery state. A file is renamed only after the
//! collection service accepted it, so a crash or a failed rename means the
//! file is sent again: delivery is at-least-once.

mod config;
mod error;
mod http;
mod layout;
mod marker;
mod retry;
mod rotation;
mod scanner;
mod task;
mod upload;

pub use config::{
    ConfigSource, Credentials, DEFAULT_UPLOAD_SERVICE_URL, PASSWORD_ENV, ShipperConfig,
    USERNAME_ENV, YamlConfigFile, load_config,
};
pub use error::{ConfigError, RotationError, UploadError};
pub use http::HttpTransport;
pub use layout::{
    DEFAULT_ACTIVE_FILE_NAME, FileState, GZIP_EXTENSION, SpoolLayout, UPLOADED_FILE_SUFFIX,
    USAGE_OUTPUT_DIRECTORY,
};
pub use marker::mark_uploaded;
pub use retry::{RetryExhausted, RetryPolicy, execute_with_retry};
pub use rotation::{Rotator, maybe_rotate};
pub use scanner::{PendingFile, list_pending};
pub use task::{RunReport, UsageUploadTask};
pub use upload::{
    ACCEPT_APPLICATION_JSON, FILE_NAME_HEADER, FILE_PART_NAME, Session, Transport, UploadClient,
    UploadRequest, basic_auth_header,
};
