// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Directory scanner: finds rotated files that still need uploading

use crate::layout::{FileState, SpoolLayout};
use std::path::{Path, PathBuf};

/// A rotated file found in the spool directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub path: PathBuf,
    pub name: String,
}

/// List rotated, undelivered files in ascending name order.
///
/// Rotated names embed an increasing timestamp, so name order is delivery
/// order. Listing has no side effects.
pub fn list_pending(spool_dir: &Path, layout: &SpoolLayout) -> std::io::Result<Vec<PendingFile>> {
    let mut pending = Vec::new();

    for entry in std::fs::read_dir(spool_dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let error = e.to_string();
                diagnostics::log_warn!(
                    "Skipping unreadable spool entry: {error}",
                    error: error.as_str()
                );
                continue;
            }
        };
        let Ok(name) = entry.file_name().into_string() else {
            let raw = entry.path().display().to_string();
            diagnostics::log_warn!(
                "Skipping spool entry with non UTF-8 name: {raw}",
                raw: raw.as_str()
            );
            continue;
        };

        if layout.classify(&name) != Some(FileState::Rotated) {
            continue;
        }
        match entry.file_type() {
            Ok(file_type) if file_type.is_file() => {}
            Ok(_) => {
                diagnostics::log_debug!(
                    "Skipping {name}: not a regular file",
                    name: name.as_str()
                );
                continue;
            }
            Err(e) => {
                let error = e.to_string();
                diagnostics::log_warn!(
                    "Skipping {name}, could not read its file type: {error}",
                    name: name.as_str(),
                    error: error.as_str()
                );
                continue;
            }
        }

        pending.push(PendingFile {
            path: entry.path(),
            name,
        });
    }

    pending.sort_by(|a, b| a.name.cmp(&b.name));

    let count = pending.len() as u64;
    let dir = spool_dir.display().to_string();
    diagnostics::log_debug!(
        "Found {count} pending usage files in {dir}",
        count: count,
        dir: dir.as_str()
    );
    Ok(pending)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"data").unwrap();
    }

    fn names(files: &[PendingFile]) -> Vec<&str> {
        files.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_filters_to_rotated_files() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "usage.log");
        touch(dir.path(), "usage-20200101.log.gz");
        touch(dir.path(), "usage-20191231.log.gz.uploaded");
        touch(dir.path(), "README.txt");
        std::fs::create_dir(dir.path().join("archive.gz")).unwrap();

        let pending = list_pending(dir.path(), &SpoolLayout::default()).unwrap();
        assert_eq!(names(&pending), vec!["usage-20200101.log.gz"]);
        assert_eq!(pending[0].path, dir.path().join("usage-20200101.log.gz"));
    }

    #[test]
    fn test_sorted_by_name() {
        let dir = tempdir().unwrap();
        for name in [
            "usage-20200103.log.gz",
            "usage-20200101.log.gz",
            "usage-20200102.log.gz",
        ] {
            touch(dir.path(), name);
        }

        let pending = list_pending(dir.path(), &SpoolLayout::default()).unwrap();
        assert_eq!(
            names(&pending),
            vec![
                "usage-20200101.log.gz",
                "usage-20200102.log.gz",
                "usage-20200103.log.gz"
            ]
        );
    }

    #[test]
    fn test_listing_is_repeatable() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "usage-20200101.log.gz");

        let layout = SpoolLayout::default();
        let first = list_pending(dir.path(), &layout).unwrap();
        let second = list_pending(dir.path(), &layout).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(list_pending(&dir.path().join("missing"), &SpoolLayout::default()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_does_not_stop_listing() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "usage-20200101.log.gz");
        touch(dir.path(), "usage-20200103.log.gz");
        std::os::unix::fs::symlink(
            dir.path().join("gone.log.gz"),
            dir.path().join("usage-20200102.log.gz"),
        )
        .unwrap();

        let pending = list_pending(dir.path(), &SpoolLayout::default()).unwrap();
        assert_eq!(
            names(&pending),
            vec!["usage-20200101.log.gz", "usage-20200103.log.gz"]
        );
    }
}
