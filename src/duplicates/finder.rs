//! Duplicate finder implementation with progressive elimination.
//!
//! # Overview
//!
//! This module holds the reduction pipeline. Every stage is a free function
//! over `&mut Vec<Entry>` that only removes (untracks) or tags entries, and
//! the stages always run in the same order:
//!
//! 1. [`find_empty_files`]: move zero-length files out of the working set
//! 2. [`untrack_unique_sizes`]: drop every file whose size occurs once
//! 3. [`compute_fingerprints`]: sample survivors, drop unreadable ones
//! 4. [`untrack_unique_fingerprints`]: drop every file whose fingerprint occurs once
//! 5. [`tag_duplicates`]: tag what remains as duplicates
//!
//! [`DuplicateFinder`] runs the tracker, the stages, and the grouper in
//! sequence and returns a [`ScanReport`].
//!
//! # Example
//!
//! ```no_run
//! use broom::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default());
//! let report = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! println!("{} empty files", report.empty_files.len());
//! println!("{} duplicate groups", report.summary.duplicate_groups);
//! println!("Reclaimable: {}", report.summary.reclaimable_display());
//! ```

use std::collections::HashMap;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use serde::Serialize;

use super::groups::{estimated_savings, group_duplicates, DuplicateGroup};
use crate::progress::ProgressCallback;
use crate::scanner::{
    Entry, FingerprintError, Group, SamplingConfig, ScanError, Tracker, TrackerConfig,
};

/// Partition zero-length files out of the working set.
///
/// Every entry with `size == 0` is tagged [`Group::Empty`] and moved into the
/// returned list. Relative order is preserved in both collections.
pub fn find_empty_files(entries: &mut Vec<Entry>) -> Vec<Entry> {
    let (mut empty, rest): (Vec<Entry>, Vec<Entry>) =
        entries.drain(..).partition(Entry::is_empty);
    *entries = rest;

    for entry in &mut empty {
        if let Err(e) = entry.tag(Group::Empty) {
            log::warn!("{}: {}", entry.path.display(), e);
        }
    }

    log::info!("Found {} empty files", empty.len());
    empty
}

/// Drop every entry whose key occurs exactly once.
///
/// Counts every key in one pass, then retains only entries whose key has
/// multiplicity greater than one. Entries without a key are dropped too.
/// Returns the number of entries removed.
fn untrack_unique_by<K, F>(entries: &mut Vec<Entry>, key: F) -> usize
where
    K: Eq + Hash,
    F: Fn(&Entry) -> Option<K>,
{
    let mut counts: HashMap<K, usize> = HashMap::new();
    for entry in entries.iter() {
        if let Some(k) = key(entry) {
            *counts.entry(k).or_insert(0) += 1;
        }
    }

    let before = entries.len();
    entries.retain(|entry| {
        let keep = key(entry).is_some_and(|k| counts.get(&k).copied().unwrap_or(0) > 1);
        if !keep {
            log::trace!("Untracking {}", entry.path.display());
        }
        keep
    });
    before - entries.len()
}

/// Untrack every entry whose size is unique in the working set.
///
/// Counts are recomputed on every call. Returns the number removed.
pub fn untrack_unique_sizes(entries: &mut Vec<Entry>) -> usize {
    let removed = untrack_unique_by(entries, |e| Some(e.size));
    log::info!(
        "Size stage: untracked {} files, {} remain",
        removed,
        entries.len()
    );
    removed
}

/// Fingerprint every entry in the working set.
///
/// Entries that cannot be read are untracked. Their errors are returned so
/// the caller can count and report them; one unreadable file never aborts
/// the scan.
pub fn compute_fingerprints(
    entries: &mut Vec<Entry>,
    sampling: &SamplingConfig,
    progress: Option<&Arc<dyn ProgressCallback>>,
) -> Vec<FingerprintError> {
    if let Some(callback) = progress {
        callback.on_phase_start("fingerprinting", entries.len());
    }

    let mut errors = Vec::new();
    let mut done = 0;
    entries.retain_mut(|entry| {
        done += 1;
        let result = entry.compute_fingerprint(sampling).map(|_| ());
        if let Some(callback) = progress {
            callback.on_progress(done, &entry.path.to_string_lossy());
        }
        match result {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Untracking unreadable file: {}", e);
                errors.push(e);
                false
            }
        }
    });

    if let Some(callback) = progress {
        callback.on_phase_end("fingerprinting");
    }
    log::info!(
        "Fingerprint stage: {} files sampled, {} unreadable",
        entries.len(),
        errors.len()
    );
    errors
}

/// Untrack every entry whose fingerprint is unique in the working set.
///
/// Fingerprints are only compared between files of the same size, since
/// two large files of different sizes can share their sampled bytes.
/// Entries that have no fingerprint are untracked as well. Returns the
/// number removed.
pub fn untrack_unique_fingerprints(entries: &mut Vec<Entry>) -> usize {
    let removed = untrack_unique_by(entries, |e| {
        e.fingerprint().map(|f| (e.size, f.to_owned()))
    });
    log::info!(
        "Fingerprint elimination: untracked {} files, {} remain",
        removed,
        entries.len()
    );
    removed
}

/// Tag every still-untagged entry as a duplicate.
///
/// Returns the number of entries tagged.
pub fn tag_duplicates(entries: &mut [Entry]) -> usize {
    let mut tagged = 0;
    for entry in entries.iter_mut() {
        if entry.group() == Group::Untagged && entry.tag(Group::Duplicate).is_ok() {
            log::debug!("Duplicate: {}", entry.path.display());
            tagged += 1;
        }
    }
    tagged
}

/// Configuration for the duplicate finder.
#[derive(Clone, Default)]
pub struct FinderConfig {
    /// How files are sampled into fingerprints.
    pub sampling: SamplingConfig,
    /// Directory tracking options.
    pub tracker_config: TrackerConfig,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("sampling", &self.sampling)
            .field("tracker_config", &self.tracker_config)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl FinderConfig {
    /// Set the sampling strategy.
    #[must_use]
    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }

    /// Set the tracker configuration.
    #[must_use]
    pub fn with_tracker_config(mut self, config: TrackerConfig) -> Self {
        self.tracker_config = config;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// Total number of files tracked
    pub total_files: usize,
    /// Total size of all tracked files in bytes
    pub total_size: u64,
    /// Number of zero-length files
    pub empty_files: usize,
    /// Number of files untracked because their size was unique
    pub eliminated_by_size: usize,
    /// Number of files untracked because they could not be read
    pub fingerprint_failures: usize,
    /// Number of files untracked because their fingerprint was unique
    pub eliminated_by_fingerprint: usize,
    /// Number of groups with two or more members
    pub duplicate_groups: usize,
    /// Number of redundant copies (excluding the retained member of each group)
    pub duplicate_files: usize,
    /// Estimated bytes freed by sweeping every group
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    #[serde(serialize_with = "serialize_duration_ms", rename = "scan_duration_ms")]
    pub scan_duration: Duration,
}

fn serialize_duration_ms<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u128(d.as_millis())
}

impl ScanSummary {
    /// Percentage of the tracked bytes that duplicates waste.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Reclaimable space as a human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Total tracked size as a human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_size).to_string()
    }
}

/// Everything a scan produced.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Zero-length files, tagged [`Group::Empty`]
    pub empty_files: Vec<Entry>,
    /// Duplicate groups in first-encounter order
    pub groups: Vec<DuplicateGroup>,
    /// Scan statistics
    pub summary: ScanSummary,
    /// Files that were untracked because they could not be read
    pub errors: Vec<FingerprintError>,
}

impl ScanReport {
    /// Groups with two or more members.
    pub fn true_duplicates(&self) -> impl Iterator<Item = &DuplicateGroup> {
        self.groups.iter().filter(|g| g.is_true_duplicate())
    }

    /// Paths of the files that could not be fingerprinted.
    #[must_use]
    pub fn failed_paths(&self) -> Vec<PathBuf> {
        self.errors.iter().map(|e| e.path().to_path_buf()).collect()
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The sampling configuration cannot produce fingerprints.
    #[error("Invalid sampling configuration: piece size {piece_size}, piece count {piece_count}")]
    InvalidSampling {
        /// Configured piece size
        piece_size: usize,
        /// Configured piece count
        piece_count: usize,
    },

    /// Tracking the root failed.
    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// Duplicate finder that runs tracking, reduction and grouping.
#[derive(Debug, Default)]
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Track `path` and find its empty files and duplicate groups.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Scan`] if the root does not exist, or
    /// [`FinderError::InvalidSampling`] if the sampling configuration has a
    /// zero parameter. Unreadable files below the root are recorded in
    /// [`ScanReport::errors`] instead.
    pub fn find_duplicates(&self, path: &Path) -> Result<ScanReport, FinderError> {
        self.check_sampling()?;
        let start_time = Instant::now();

        log::info!("Starting duplicate scan of {}", path.display());

        let mut tracker = Tracker::new(path, self.config.tracker_config.clone());
        if let Some(ref callback) = self.config.progress_callback {
            tracker = tracker.with_progress_callback(callback.clone());
        }
        let entries = tracker.track()?;

        let mut report = self.find_duplicates_in_entries(entries)?;
        report.summary.scan_duration = start_time.elapsed();
        Ok(report)
    }

    /// Run the reduction pipeline over an already tracked set of entries.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::InvalidSampling`] if the sampling configuration
    /// has a zero parameter.
    pub fn find_duplicates_in_entries(
        &self,
        mut entries: Vec<Entry>,
    ) -> Result<ScanReport, FinderError> {
        self.check_sampling()?;
        let start_time = Instant::now();

        let mut summary = ScanSummary {
            total_files: entries.len(),
            total_size: entries.iter().map(|e| e.size).sum(),
            ..ScanSummary::default()
        };

        let empty_files = find_empty_files(&mut entries);
        summary.empty_files = empty_files.len();

        summary.eliminated_by_size = untrack_unique_sizes(&mut entries);

        let errors = compute_fingerprints(
            &mut entries,
            &self.config.sampling,
            self.config.progress_callback.as_ref(),
        );
        summary.fingerprint_failures = errors.len();

        summary.eliminated_by_fingerprint = untrack_unique_fingerprints(&mut entries);

        let tagged = tag_duplicates(&mut entries);
        log::debug!("Tagged {} duplicates", tagged);

        let groups = group_duplicates(&mut entries);
        let true_groups: Vec<&DuplicateGroup> =
            groups.iter().filter(|g| g.is_true_duplicate()).collect();
        summary.duplicate_groups = true_groups.len();
        summary.duplicate_files = true_groups.iter().map(|g| g.duplicate_count()).sum();
        summary.reclaimable_space = estimated_savings(&groups);
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate groups, {} reclaimable",
            summary.duplicate_groups,
            summary.reclaimable_display()
        );

        Ok(ScanReport {
            empty_files,
            groups,
            summary,
            errors,
        })
    }

    fn check_sampling(&self) -> Result<(), FinderError> {
        let sampling = self.config.sampling;
        if sampling.is_valid() {
            Ok(())
        } else {
            Err(FinderError::InvalidSampling {
                piece_size: sampling.piece_size,
                piece_count: sampling.piece_count,
            })
        }
    }
}
