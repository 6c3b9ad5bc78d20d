// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Task driver: one scheduled run of rotate, scan, upload, mark.
//!
//! Runs are synchronous and must not overlap on the same spool directory;
//! the filesystem is the only state carried between runs.

use crate::config::ConfigSource;
use crate::layout::SpoolLayout;
use crate::marker::mark_uploaded;
use crate::rotation::{Rotator, maybe_rotate};
use crate::scanner::list_pending;
use crate::upload::{Transport, UploadClient};
use std::path::PathBuf;

/// What a run did. Informational only: a run never fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Configuration could not be loaded, nothing else was attempted
    pub aborted: bool,
    pub rotated: Option<PathBuf>,
    /// Uploaded and renamed, in upload order
    pub delivered: Vec<String>,
    /// Upload failed; still rotated
    pub failed: Vec<String>,
    /// Uploaded but the rename failed; will be uploaded again
    pub unmarked: Vec<String>,
}

impl RunReport {
    fn aborted() -> Self {
        Self {
            aborted: true,
            ..Self::default()
        }
    }
}

pub struct UsageUploadTask<C, R, T> {
    config: C,
    rotator: R,
    transport: T,
}

impl<C, R, T> UsageUploadTask<C, R, T>
where
    C: ConfigSource,
    R: Rotator,
    T: Transport,
{
    pub fn new(config: C, rotator: R, transport: T) -> Self {
        Self {
            config,
            rotator,
            transport,
        }
    }

    /// Execute one run. All failures are logged where they happen.
    pub fn run(&self) -> RunReport {
        diagnostics::log_info!("Running usage file upload task");

        let config = match self.config.load() {
            Ok(config) => config,
            Err(e) => {
                let error = e.to_string();
                diagnostics::log_error!(
                    "Error reading the configuration, usage upload was cancelled: {error}",
                    error: error.as_str()
                );
                return RunReport::aborted();
            }
        };

        let spool_dir = config.spool_dir();
        let layout: SpoolLayout = config.layout();
        let mut report = RunReport {
            rotated: maybe_rotate(&layout.active_path(&spool_dir), &self.rotator),
            ..RunReport::default()
        };

        let pending = match list_pending(&spool_dir, &layout) {
            Ok(pending) => pending,
            Err(e) => {
                let dir = spool_dir.display().to_string();
                let error = e.to_string();
                diagnostics::log_error!(
                    "Could not list spool directory {dir}: {error}",
                    dir: dir.as_str(),
                    error: error.as_str()
                );
                return report;
            }
        };

        let client = UploadClient::from_config(&config, &self.transport);
        for file in pending {
            let name = file.name;
            if !client.upload(&file.path, &name) {
                diagnostics::log_error!(
                    "Usage file {name} upload failed. It will be retried in the next task run",
                    name: name.as_str()
                );
                report.failed.push(name);
                continue;
            }

            match mark_uploaded(&file.path, &layout) {
                Ok(_) => report.delivered.push(name),
                Err(e) => {
                    let error = e.to_string();
                    diagnostics::log_error!(
                        "Error marking uploaded file {name}, it will be uploaded again: {error}",
                        name: name.as_str(),
                        error: error.as_str()
                    );
                    report.unmarked.push(name);
                }
            }
        }

        let delivered = report.delivered.len() as u64;
        let remaining = (report.failed.len() + report.unmarked.len()) as u64;
        diagnostics::log_info!(
            "Usage upload finished: {delivered} delivered, {remaining} left for the next run",
            delivered: delivered,
            remaining: remaining
        );
        report
    }
}
