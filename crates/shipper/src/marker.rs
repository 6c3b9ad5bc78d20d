// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Completion marker
//!
//! Renaming `X.gz` to `X.gz.uploaded` is the only record that a file was
//! delivered. The rename stays inside the spool directory so it is a single
//! atomic `rename(2)`; the directory is then synced so the new name survives
//! a power loss.

use crate::layout::SpoolLayout;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

/// Mark a delivered file as uploaded. Returns the new path.
///
/// Never replaces an existing file: if the uploaded name is already taken
/// the rename fails with `AlreadyExists` and the file stays rotated.
pub fn mark_uploaded(rotated: &Path, layout: &SpoolLayout) -> io::Result<PathBuf> {
    let target = layout.uploaded_path(rotated);

    if target.symlink_metadata().is_ok() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", target.display()),
        ));
    }

    std::fs::rename(rotated, &target)?;

    // The rename already happened; a failed sync only weakens durability.
    if let Some(parent) = target.parent() {
        if let Err(e) = fsync_dir(parent) {
            let dir = parent.display().to_string();
            let error = e.to_string();
            diagnostics::log_warn!(
                "Could not sync spool directory {dir}: {error}",
                dir: dir.as_str(),
                error: error.as_str()
            );
        }
    }

    Ok(target)
}

/// Sync a directory so entries created or renamed in it are durable.
fn fsync_dir(dir_path: &Path) -> io::Result<()> {
    let dir = OpenOptions::new().read(true).open(dir_path)?;
    dir.sync_all()
}
