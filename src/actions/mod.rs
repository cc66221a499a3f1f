//! File actions module.
//!
//! Sweeping is the only part of broom that mutates the filesystem:
//! - [`delete`]: permanent removal of empty files
//! - [`link`]: replacing redundant duplicate copies with symlinks
//!
//! Both operations tolerate partial failure. Each entry is handled on its
//! own and failures are collected in a [`BatchResult`].
//!
//! ```no_run
//! use broom::actions::{remove_duplicates_make_symlinks, remove_empty_files};
//! use broom::duplicates::DuplicateFinder;
//! use std::path::Path;
//!
//! let report = DuplicateFinder::with_defaults().find_duplicates(Path::new(".")).unwrap();
//! let mut result = remove_empty_files(&report.empty_files, None);
//! result.merge(remove_duplicates_make_symlinks(&report.groups, None));
//! println!("{}", result.summary());
//! ```

pub mod delete;
pub mod link;

pub use delete::{permanent_delete, remove_empty_files, BatchResult, RemediationError};
pub use link::{remove_duplicates_make_symlinks, replace_with_symlink};

/// Estimated bytes freed by sweeping `groups`.
pub use crate::duplicates::estimated_savings as estimated_bytes_freed;
