// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Settings for one upload run
//!
//! Settings are a plain value handed to the task through a [`ConfigSource`].
//! A source is asked for settings at the start of every run, so edits to a
//! YAML file are picked up by the next scheduled invocation.

use crate::error::ConfigError;
use crate::layout::{DEFAULT_ACTIVE_FILE_NAME, SpoolLayout, USAGE_OUTPUT_DIRECTORY};
use crate::retry::RetryPolicy;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Used when no upload URL is configured
pub const DEFAULT_UPLOAD_SERVICE_URL: &str =
    "https://localhost:9443/micro-gateway/v0.9/usage/upload-file";

pub const USERNAME_ENV: &str = "SHIPPER_USERNAME";
pub const PASSWORD_ENV: &str = "SHIPPER_PASSWORD";

const DEFAULT_MAX_RETRIES: usize = 5;
const DEFAULT_RETRY_DELAY_MS: u64 = 1000;
pub(crate) const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipperConfig {
    /// Base installation path; the spool directory lives beneath it
    pub base_dir: PathBuf,
    pub active_file_name: String,
    pub upload_url: Option<String>,
    /// Total attempts per file, including the first
    pub max_retries: usize,
    pub retry_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub credentials: Credentials,
}

/// On-disk form: everything but `base_dir` may be omitted.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    base_dir: PathBuf,
    #[serde(default = "default_active_file_name")]
    active_file_name: String,
    #[serde(default)]
    upload_url: Option<String>,
    #[serde(default = "default_max_retries")]
    max_retries: usize,
    #[serde(default = "default_retry_delay_ms")]
    retry_delay_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,
    #[serde(default)]
    credentials: Option<Credentials>,
}

fn default_active_file_name() -> String {
    DEFAULT_ACTIVE_FILE_NAME.to_string()
}

fn default_max_retries() -> usize {
    DEFAULT_MAX_RETRIES
}

fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl ShipperConfig {
    /// Settings with defaults for everything except location and credentials.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>, credentials: Credentials) -> Self {
        Self {
            base_dir: base_dir.into(),
            active_file_name: default_active_file_name(),
            upload_url: None,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            credentials,
        }
    }

    /// `<base_dir>/api-usage-data`
    #[must_use]
    pub fn spool_dir(&self) -> PathBuf {
        self.base_dir.join(USAGE_OUTPUT_DIRECTORY)
    }

    #[must_use]
    pub fn layout(&self) -> SpoolLayout {
        SpoolLayout::with_active_file(&self.active_file_name)
    }

    /// The configured upload URL, or the built-in default when it is
    /// missing or blank.
    #[must_use]
    pub fn upload_endpoint(&self) -> &str {
        match self.upload_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url,
            _ => DEFAULT_UPLOAD_SERVICE_URL,
        }
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_delay_ms))
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.active_file_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "active_file_name cannot be empty".to_string(),
            ));
        }
        if self.max_retries == 0 {
            return Err(ConfigError::Invalid(
                "max_retries must be greater than 0".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if let Some(url) = self.upload_url.as_deref().map(str::trim) {
            if !url.is_empty() {
                let parsed = url::Url::parse(url).map_err(|source| ConfigError::InvalidUrl {
                    url: url.to_string(),
                    source,
                })?;
                if parsed.scheme() != "http" && parsed.scheme() != "https" {
                    return Err(ConfigError::Invalid(format!(
                        "upload_url must be http or https, got {}",
                        parsed.scheme()
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Produces the settings for a run.
pub trait ConfigSource {
    fn load(&self) -> Result<ShipperConfig, ConfigError>;
}

/// Fixed settings supplied by the host.
impl ConfigSource for ShipperConfig {
    fn load(&self) -> Result<ShipperConfig, ConfigError> {
        self.validate()?;
        Ok(self.clone())
    }
}

/// Settings re-read from a YAML file on every run. Credentials missing from
/// the file are taken from `SHIPPER_USERNAME` / `SHIPPER_PASSWORD`.
#[derive(Debug, Clone)]
pub struct YamlConfigFile {
    path: PathBuf,
}

impl YamlConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for YamlConfigFile {
    fn load(&self) -> Result<ShipperConfig, ConfigError> {
        load_config(&self.path)
    }
}

/// Load configuration from YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ShipperConfig, ConfigError> {
    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.as_ref().to_path_buf(),
        source,
    })?;
    parse_config(&content, |key| std::env::var(key).ok())
}

/// Parse YAML settings; `env` resolves credential variables.
pub(crate) fn parse_config<F>(content: &str, env: F) -> Result<ShipperConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let file: ConfigFile = serde_yaml_ng::from_str(content)?;

    let credentials = match file.credentials {
        Some(credentials) => credentials,
        None => Credentials {
            username: env(USERNAME_ENV).ok_or(ConfigError::MissingCredentials(USERNAME_ENV))?,
            password: env(PASSWORD_ENV).ok_or(ConfigError::MissingCredentials(PASSWORD_ENV))?,
        },
    };

    let config = ShipperConfig {
        base_dir: file.base_dir,
        active_file_name: file.active_file_name,
        upload_url: file.upload_url,
        max_retries: file.max_retries,
        retry_delay_ms: file.retry_delay_ms,
        request_timeout_secs: file.request_timeout_secs,
        credentials,
    };
    config.validate()?;
    Ok(config)
}
