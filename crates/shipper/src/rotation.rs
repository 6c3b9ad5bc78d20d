// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Rotation trigger
//!
//! Closing off the active file is done by the usage writer; this module only
//! decides whether to ask for it.

use crate::error::RotationError;
use std::path::{Path, PathBuf};

/// The usage writer's rotate operation: close the current contents of the
/// active file into a new compressed file, reopen the active file empty,
/// and return the new file's path.
pub trait Rotator {
    fn rotate(&self, active: &Path) -> Result<PathBuf, RotationError>;
}

impl<F> Rotator for F
where
    F: Fn(&Path) -> Result<PathBuf, RotationError>,
{
    fn rotate(&self, active: &Path) -> Result<PathBuf, RotationError> {
        self(active)
    }
}

/// Rotate the active file if it holds any data.
///
/// Empty active files are left alone so no empty upload artifacts appear.
/// Failures are logged and swallowed: files rotated by earlier runs can
/// still be uploaded.
pub fn maybe_rotate(active: &Path, rotator: &dyn Rotator) -> Option<PathBuf> {
    let file = active.display().to_string();

    let size = match std::fs::metadata(active) {
        Ok(meta) => meta.len(),
        Err(e) => {
            let error = e.to_string();
            diagnostics::log_error!(
                "Could not read size of {file}, will only upload previously rotated files: {error}",
                file: file.as_str(),
                error: error.as_str()
            );
            return None;
        }
    };

    if size == 0 {
        diagnostics::log_debug!("Active file {file} is empty, not rotating", file: file.as_str());
        return None;
    }

    diagnostics::log_debug!(
        "Rotating {file} ({size} bytes) for uploading",
        file: file.as_str(),
        size: size
    );
    match rotator.rotate(active) {
        Ok(rotated) => {
            let rotated_file = rotated.display().to_string();
            diagnostics::log_info!(
                "Rotated {file} into {rotated_file}",
                file: file.as_str(),
                rotated_file: rotated_file.as_str()
            );
            Some(rotated)
        }
        Err(e) => {
            let error = e.to_string();
            diagnostics::log_error!(
                "Error rotating {file}, will only upload previously rotated files: {error}",
                file: file.as_str(),
                error: error.as_str()
            );
            None
        }
    }
}
