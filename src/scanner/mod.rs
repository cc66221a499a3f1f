//! Scanner module for directory tracking and file fingerprinting.
//!
//! This module provides functionality for:
//! - Tracking every regular file under a root directory
//! - Sampling file contents into a cheap hexadecimal fingerprint
//! - The per-file [`Entry`] record that flows through the pipeline
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery ([`Tracker`])
//! - [`fingerprint`]: Fixed-offset content sampling ([`SamplingConfig`])
//!
//! # Example
//!
//! ```no_run
//! use broom::scanner::{SamplingConfig, Tracker, TrackerConfig};
//! use std::path::Path;
//!
//! let tracker = Tracker::new(Path::new("."), TrackerConfig::default());
//! let mut entries = tracker.track().unwrap();
//!
//! let sampling = SamplingConfig::default();
//! for entry in &mut entries {
//!     if let Ok(fingerprint) = entry.compute_fingerprint(&sampling) {
//!         println!("{}", fingerprint);
//!     }
//! }
//! ```

pub mod fingerprint;
pub mod walker;

use std::path::{Path, PathBuf};

use serde::Serialize;

// Re-export main types
pub use fingerprint::{sample_file, SamplingConfig, DEFAULT_PIECE_COUNT, DEFAULT_PIECE_SIZE};
pub use walker::{Tracker, TrackerConfig};

/// Classification assigned to an entry by the pipeline.
///
/// Tags form a small state machine: `Untagged` may advance to either
/// `Empty` or `Duplicate`, and both of those are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    /// Not yet classified.
    #[default]
    Untagged,
    /// Zero-length file.
    Empty,
    /// Shares its fingerprint with at least one other tracked file.
    Duplicate,
}

impl Group {
    /// Attempt a transition to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`TagError`] when the current tag is terminal or `next`
    /// is `Untagged`.
    pub fn advance(self, next: Group) -> Result<Group, TagError> {
        match (self, next) {
            (Group::Untagged, Group::Empty | Group::Duplicate) => Ok(next),
            (from, to) => Err(TagError { from, to }),
        }
    }

    /// Whether this tag can no longer change.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self != Group::Untagged
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Group::Untagged => write!(f, "untagged"),
            Group::Empty => write!(f, "empty"),
            Group::Duplicate => write!(f, "duplicate"),
        }
    }
}

/// Rejected group tag transition.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot retag {from} entry as {to}")]
pub struct TagError {
    /// Tag the entry already carries
    pub from: Group,
    /// Tag that was requested
    pub to: Group,
}

/// A tracked file.
///
/// Holds everything the pipeline needs to decide whether the file is
/// empty or a duplicate. The fingerprint is computed lazily and at most
/// once per entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    fingerprint: Option<String>,
    group: Group,
}

impl Entry {
    /// Create a new untagged entry without a fingerprint.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the file
    /// * `size` - File size in bytes
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self {
            path,
            size,
            fingerprint: None,
            group: Group::Untagged,
        }
    }

    /// Create an entry by querying the file's size from the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] if the metadata cannot be read.
    pub fn from_path(path: &Path) -> Result<Self, ScanError> {
        let metadata = std::fs::metadata(path).map_err(|e| ScanError::from_io(path, e))?;
        Ok(Self::new(path.to_path_buf(), metadata.len()))
    }

    /// The fingerprint, if it has been computed.
    #[must_use]
    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    /// Current group tag.
    #[must_use]
    pub fn group(&self) -> Group {
        self.group
    }

    /// Advance this entry's group tag.
    ///
    /// # Errors
    ///
    /// Returns [`TagError`] if the entry is already tagged.
    pub fn tag(&mut self, group: Group) -> Result<(), TagError> {
        self.group = self.group.advance(group)?;
        Ok(())
    }

    /// Whether the file is zero-length.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Compute (or return the cached) content fingerprint.
    ///
    /// The file is only read the first time this is called.
    ///
    /// # Errors
    ///
    /// Returns [`FingerprintError::ReadFailure`] if the file cannot be
    /// opened or read. The entry is left without a fingerprint.
    pub fn compute_fingerprint(
        &mut self,
        sampling: &SamplingConfig,
    ) -> Result<&str, FingerprintError> {
        if self.fingerprint.is_none() {
            let sample = sample_file(&self.path, self.size, sampling)?;
            self.fingerprint = Some(hex::encode(sample));
        }
        Ok(self.fingerprint.as_deref().unwrap_or_default())
    }

    /// Attach an already-known fingerprint.
    #[must_use]
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }
}

/// Errors that can occur while tracking a directory.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The root path does not exist.
    #[error("Invalid argument: {0} does not exist")]
    InvalidArgument(PathBuf),

    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    pub(crate) fn from_io(path: &Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::InvalidArgument(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Errors that can occur while sampling a file's contents.
#[derive(thiserror::Error, Debug)]
pub enum FingerprintError {
    /// The file could not be opened, sought or read.
    #[error("Failed to read {path}: {source}")]
    ReadFailure {
        /// Path of the unreadable file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl FingerprintError {
    /// Path of the file that failed.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::ReadFailure { path, .. } => path,
        }
    }
}
