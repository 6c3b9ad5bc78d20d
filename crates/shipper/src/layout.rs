// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Spool directory naming
//!
//! A usage file's delivery state is carried entirely by its name:
//!
//! ```text
//! usage.log                               active   (written by the usage writer)
//! usage-20200101.log.gz                   rotated  (waiting for upload)
//! usage-20200101.log.gz.uploaded          uploaded (kept for audit)
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Directory under the base installation path that holds usage files
pub const USAGE_OUTPUT_DIRECTORY: &str = "api-usage-data";

/// Name of the file the usage writer appends to
pub const DEFAULT_ACTIVE_FILE_NAME: &str = "usage.log";

/// Extension the rotate operation gives to closed, compressed files
pub const GZIP_EXTENSION: &str = ".gz";

/// Suffix appended to a rotated file once it has been delivered
pub const UPLOADED_FILE_SUFFIX: &str = ".uploaded";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Active,
    Rotated,
    Uploaded,
}

/// Naming rules for one spool directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpoolLayout {
    pub active_file_name: String,
    pub rotated_extension: String,
    pub uploaded_suffix: String,
}

impl Default for SpoolLayout {
    fn default() -> Self {
        Self::with_active_file(DEFAULT_ACTIVE_FILE_NAME)
    }
}

impl SpoolLayout {
    #[must_use]
    pub fn with_active_file(name: &str) -> Self {
        Self {
            active_file_name: name.to_string(),
            rotated_extension: GZIP_EXTENSION.to_string(),
            uploaded_suffix: UPLOADED_FILE_SUFFIX.to_string(),
        }
    }

    /// Classify a directory entry name. Names that belong to none of the
    /// three states return `None` and are left alone.
    #[must_use]
    pub fn classify(&self, name: &str) -> Option<FileState> {
        if name == self.active_file_name {
            return Some(FileState::Active);
        }
        if let Some(stem) = name.strip_suffix(self.uploaded_suffix.as_str()) {
            if stem.ends_with(self.rotated_extension.as_str()) {
                return Some(FileState::Uploaded);
            }
            return None;
        }
        if name.ends_with(self.rotated_extension.as_str())
            && name.len() > self.rotated_extension.len()
        {
            return Some(FileState::Rotated);
        }
        None
    }

    #[must_use]
    pub fn active_path(&self, spool_dir: &Path) -> PathBuf {
        spool_dir.join(&self.active_file_name)
    }

    /// Path a rotated file is renamed to once delivered.
    #[must_use]
    pub fn uploaded_path(&self, rotated: &Path) -> PathBuf {
        let mut name = OsString::from(rotated.as_os_str());
        name.push(&self.uploaded_suffix);
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let layout = SpoolLayout::default();
        assert_eq!(layout.classify("usage.log"), Some(FileState::Active));
        assert_eq!(
            layout.classify("usage-20200101.log.gz"),
            Some(FileState::Rotated)
        );
        assert_eq!(
            layout.classify("usage-20191231.log.gz.uploaded"),
            Some(FileState::Uploaded)
        );
        assert_eq!(layout.classify("usage-20200101.log"), None);
        assert_eq!(layout.classify("notes.txt.uploaded"), None);
        assert_eq!(layout.classify(".gz"), None);
    }

    #[test]
    fn test_custom_active_name() {
        let layout = SpoolLayout::with_active_file("api-usage.dat");
        assert_eq!(layout.classify("api-usage.dat"), Some(FileState::Active));
        assert_eq!(layout.classify("usage.log"), None);
    }

    #[test]
    fn test_uploaded_path_appends_suffix() {
        let layout = SpoolLayout::default();
        let rotated = Path::new("/spool/usage-20200101.log.gz");
        assert_eq!(
            layout.uploaded_path(rotated),
            PathBuf::from("/spool/usage-20200101.log.gz.uploaded")
        );
        let uploaded = layout.uploaded_path(rotated);
        let name = uploaded
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        assert_eq!(layout.classify(name), Some(FileState::Uploaded));
    }
}
