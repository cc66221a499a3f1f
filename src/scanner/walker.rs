//! Directory tracker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Tracker`] struct, which turns a root path
//! into the ordered list of [`Entry`] records the pipeline works on.
//!
//! # Features
//!
//! - Deterministic, single-threaded traversal sorted by file name
//! - Directories and symbolic links are never tracked
//! - Hidden file filtering
//! - Unreadable paths are logged and skipped instead of failing the run
//!
//! # Example
//!
//! ```no_run
//! use broom::scanner::{Tracker, TrackerConfig};
//! use std::path::Path;
//!
//! let tracker = Tracker::new(Path::new("/home/user/Downloads"), TrackerConfig::default());
//! for entry in tracker.track().unwrap() {
//!     println!("{}: {} bytes", entry.path.display(), entry.size);
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::{DirEntry, WalkDir};

use super::{Entry, ScanError};
use crate::progress::ProgressCallback;

/// Configuration for directory tracking.
#[derive(Debug, Clone, Default)]
pub struct TrackerConfig {
    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,
}

impl TrackerConfig {
    /// Set whether hidden files are skipped.
    #[must_use]
    pub fn with_skip_hidden(mut self, skip_hidden: bool) -> Self {
        self.skip_hidden = skip_hidden;
        self
    }
}

/// Directory tracker for file discovery.
pub struct Tracker {
    /// Root path to track
    root: PathBuf,
    /// Tracker configuration
    config: TrackerConfig,
    /// Optional progress callback
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("root", &self.root)
            .field("config", &self.config)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Tracker {
    /// Create a new tracker for the given path.
    ///
    /// # Arguments
    ///
    /// * `path` - Root directory (or single file) to track
    /// * `config` - Tracker configuration options
    #[must_use]
    pub fn new(path: &Path, config: TrackerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Track every regular file under the root.
    ///
    /// The root is canonicalized first, so every returned path is absolute.
    /// Entries come back in traversal order (directory contents sorted by
    /// file name).
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidArgument`] if the root does not exist.
    /// Errors below the root are logged and skipped.
    pub fn track(&self) -> Result<Vec<Entry>, ScanError> {
        if !self.root.exists() {
            return Err(ScanError::InvalidArgument(self.root.clone()));
        }
        let root = self
            .root
            .canonicalize()
            .map_err(|e| ScanError::from_io(&self.root, e))?;

        log::info!("Tracking files under {}", root.display());
        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start("tracking", 0);
        }

        let skip_hidden = self.config.skip_hidden;
        let walker = WalkDir::new(&root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| !(skip_hidden && e.depth() > 0 && is_hidden(e)));

        let mut entries = Vec::new();
        for result in walker {
            let dir_entry = match result {
                Ok(dir_entry) => dir_entry,
                Err(e) => {
                    self.log_walk_error(&e);
                    continue;
                }
            };

            if let Some(entry) = self.process_dir_entry(&dir_entry) {
                if let Some(ref callback) = self.progress_callback {
                    callback.on_progress(entries.len() + 1, &entry.path.to_string_lossy());
                }
                entries.push(entry);
            }
        }

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end("tracking");
        }
        log::info!("Tracked {} files", entries.len());

        Ok(entries)
    }

    /// Create an Entry for a regular file, or skip it.
    fn process_dir_entry(&self, dir_entry: &DirEntry) -> Option<Entry> {
        let file_type = dir_entry.file_type();
        let path = dir_entry.path();

        if file_type.is_dir() {
            return None;
        }
        if file_type.is_symlink() {
            log::trace!("Skipping symlink: {}", path.display());
            return None;
        }
        if !file_type.is_file() {
            log::trace!("Skipping special file: {}", path.display());
            return None;
        }

        match dir_entry.metadata() {
            Ok(metadata) => Some(Entry::new(path.to_path_buf(), metadata.len())),
            Err(e) => {
                self.log_walk_error(&e);
                None
            }
        }
    }

    fn log_walk_error(&self, error: &walkdir::Error) {
        let path = error.path().unwrap_or(&self.root);
        match error.io_error().map(std::io::Error::kind) {
            Some(std::io::ErrorKind::PermissionDenied) => {
                log::warn!("Permission denied, skipping: {}", path.display());
            }
            Some(std::io::ErrorKind::NotFound) => {
                log::debug!("File vanished during traversal: {}", path.display());
            }
            _ => log::warn!("Walker error for {}: {}", path.display(), error),
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}
