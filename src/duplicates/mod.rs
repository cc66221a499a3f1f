//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - The reduction pipeline (empty partition, size and fingerprint elimination)
//! - Grouping the surviving duplicates by fingerprint
//! - Orchestrating a full scan with [`DuplicateFinder`]

pub mod finder;
pub mod groups;

pub use finder::{
    compute_fingerprints, find_empty_files, tag_duplicates, untrack_unique_fingerprints,
    untrack_unique_sizes, DuplicateFinder, FinderConfig, FinderError, ScanReport, ScanSummary,
};
pub use groups::{estimated_savings, group_duplicates, DuplicateGroup};
