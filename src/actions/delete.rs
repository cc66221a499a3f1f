//! Permanent deletion of empty files.
//!
//! # Overview
//!
//! Sweeping removes every entry tagged [`Group::Empty`]. Deletions are
//! permanent and a failure on one file never stops the batch: it is
//! recorded in [`BatchResult::failures`] and the next file is tried.
//!
//! # Example
//!
//! ```no_run
//! use broom::actions::remove_empty_files;
//! use broom::duplicates::find_empty_files;
//! use broom::scanner::{Tracker, TrackerConfig};
//! use std::path::Path;
//!
//! let mut entries = Tracker::new(Path::new("."), TrackerConfig::default()).track().unwrap();
//! let empty = find_empty_files(&mut entries);
//! let result = remove_empty_files(&empty, None);
//! println!("{}", result.summary());
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::progress::ProgressCallback;
use crate::scanner::{Entry, Group};

/// Error type for remediation operations.
#[derive(Debug, Error)]
pub enum RemediationError {
    /// The file could not be deleted.
    #[error("failed to delete {path}: {source}")]
    Delete {
        /// File that was not deleted
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The file was deleted but the link replacing it could not be created.
    #[error("failed to link {path} to {target}: {source}")]
    Symlink {
        /// Location of the missing link
        path: PathBuf,
        /// File the link should point at
        target: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The retained copy of a group is gone, so the group was left untouched.
    #[error("retained copy no longer exists: {path}")]
    MissingCanonical {
        /// Path of the retained copy
        path: PathBuf,
    },
}

impl RemediationError {
    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Delete { path, .. }
            | Self::Symlink { path, .. }
            | Self::MissingCanonical { path } => path,
        }
    }
}

/// Results of a batch remediation.
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Files that were deleted and not replaced.
    pub removed: Vec<PathBuf>,
    /// Files that were replaced by a link to their group's retained copy.
    pub linked: Vec<PathBuf>,
    /// Entries that could not be remediated.
    pub failures: Vec<RemediationError>,
    /// Bytes of file content no longer stored.
    pub bytes_freed: u64,
}

impl BatchResult {
    /// Number of entries remediated.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.removed.len() + self.linked.len()
    }

    /// Number of failed entries.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Check if every entry was remediated.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fold another batch into this one.
    pub fn merge(&mut self, other: BatchResult) {
        self.removed.extend(other.removed);
        self.linked.extend(other.linked);
        self.failures.extend(other.failures);
        self.bytes_freed += other.bytes_freed;
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut text = format!(
            "Removed {} file(s), linked {} file(s)",
            self.removed.len(),
            self.linked.len()
        );
        if !self.all_succeeded() {
            text.push_str(&format!(", {} failed", self.failure_count()));
        }
        text.push_str(&format!(", freed {} bytes", self.bytes_freed));
        text
    }
}

/// Permanently delete one file.
///
/// # Errors
///
/// Returns [`RemediationError::Delete`] if the file cannot be removed.
pub fn permanent_delete(path: &Path) -> Result<(), RemediationError> {
    fs::remove_file(path).map_err(|source| RemediationError::Delete {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Deleted: {}", path.display());
    Ok(())
}

/// Delete every entry tagged [`Group::Empty`].
///
/// Entries carrying any other tag are skipped. Failures are recorded and
/// the batch continues.
pub fn remove_empty_files(
    entries: &[Entry],
    progress: Option<&Arc<dyn ProgressCallback>>,
) -> BatchResult {
    let mut result = BatchResult::default();
    if let Some(callback) = progress {
        callback.on_phase_start("sweeping", entries.len());
    }

    for (i, entry) in entries.iter().enumerate() {
        if let Some(callback) = progress {
            callback.on_progress(i + 1, &entry.path.to_string_lossy());
        }
        if entry.group() != Group::Empty {
            log::debug!(
                "Skipping {} entry during empty sweep: {}",
                entry.group(),
                entry.path.display()
            );
            continue;
        }

        match permanent_delete(&entry.path) {
            Ok(()) => result.removed.push(entry.path.clone()),
            Err(e) => {
                log::warn!("{}", e);
                result.failures.push(e);
            }
        }
    }

    if let Some(callback) = progress {
        callback.on_phase_end("sweeping");
    }
    log::info!(
        "Removed {} of {} empty files",
        result.removed.len(),
        entries.len()
    );
    result
}
