//! Output formatters for scan results.
//!
//! This module provides the formats a scan can be reported in:
//! - [`results`]: the plain-text results file, flat or grouped
//! - [`json`]: JSON for automation and scripting
//!
//! # Example
//!
//! ```no_run
//! use broom::duplicates::DuplicateFinder;
//! use broom::output::{save_results, Layout, ResultsFile};
//! use std::path::Path;
//!
//! let report = DuplicateFinder::with_defaults().find_duplicates(Path::new(".")).unwrap();
//! let results = ResultsFile::new(&report.empty_files, &report.groups, Layout::Grouped);
//! let path = save_results(Path::new("."), &results).unwrap();
//! println!("Results written to {}", path.display());
//! ```

pub mod json;
pub mod results;

// Re-export main types
pub use json::JsonOutput;
pub use results::{save_results, Layout, ReportError, ResultsFile, RESULTS_FILE_NAME};
