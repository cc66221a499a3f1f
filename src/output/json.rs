//! JSON output formatter for scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "empty_files": ["/path/to/empty.txt"],
//!   "duplicates": [
//!     {
//!       "fingerprint": "616263...",
//!       "size": 1024,
//!       "files": ["/path/to/file1.txt", "/path/to/file2.txt"]
//!     }
//!   ],
//!   "unreadable": ["/path/to/locked.bin"],
//!   "summary": {
//!     "total_files": 100,
//!     "total_size": 1048576,
//!     "empty_files": 1,
//!     "eliminated_by_size": 80,
//!     "fingerprint_failures": 1,
//!     "eliminated_by_fingerprint": 12,
//!     "duplicate_groups": 3,
//!     "duplicate_files": 4,
//!     "reclaimable_space": 51200,
//!     "scan_duration_ms": 1234,
//!     "exit_code": 0,
//!     "exit_code_name": "BR000"
//!   }
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::actions::BatchResult;
use crate::duplicates::{DuplicateGroup, ScanReport, ScanSummary};
use crate::error::ExitCode;

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// Shared fingerprint
    pub fingerprint: String,
    /// Size of the retained copy in bytes
    pub size: u64,
    /// Paths of every member, retained copy first
    pub files: Vec<String>,
}

impl JsonDuplicateGroup {
    /// Create a JSON duplicate group from a DuplicateGroup.
    #[must_use]
    pub fn from_duplicate_group(group: &DuplicateGroup) -> Self {
        Self {
            fingerprint: group.fingerprint.clone(),
            size: group.size(),
            files: group
                .entries
                .iter()
                .map(|e| e.path.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Scan statistics
    #[serde(flatten)]
    pub scan: ScanSummary,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "BR000")
    pub exit_code_name: String,
}

/// Outcome of a sweep in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSweep {
    /// Files deleted
    pub removed: Vec<String>,
    /// Files replaced by a link to their group's retained copy
    pub linked: Vec<String>,
    /// Entries that could not be remediated, as error messages
    pub failures: Vec<String>,
    /// Bytes of file content no longer stored
    pub bytes_freed: u64,
}

impl JsonSweep {
    /// Create a JSON sweep outcome from a BatchResult.
    #[must_use]
    pub fn from_batch_result(result: &BatchResult) -> Self {
        let lossy = |p: &std::path::PathBuf| p.to_string_lossy().into_owned();
        Self {
            removed: result.removed.iter().map(lossy).collect(),
            linked: result.linked.iter().map(lossy).collect(),
            failures: result.failures.iter().map(ToString::to_string).collect(),
            bytes_freed: result.bytes_freed,
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Zero-length files
    pub empty_files: Vec<String>,
    /// Groups with two or more members
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Files that could not be fingerprinted
    pub unreadable: Vec<String>,
    /// Scan summary statistics
    pub summary: JsonSummary,
    /// Sweep outcome, present only after a sweep
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sweep: Option<JsonSweep>,
}

impl JsonOutput {
    /// Create a new JSON output from a scan report and exit code.
    ///
    /// Single-member groups are left out.
    #[must_use]
    pub fn new(report: &ScanReport, exit_code: ExitCode) -> Self {
        Self {
            empty_files: report
                .empty_files
                .iter()
                .map(|e| e.path.to_string_lossy().into_owned())
                .collect(),
            duplicates: report
                .true_duplicates()
                .map(JsonDuplicateGroup::from_duplicate_group)
                .collect(),
            unreadable: report
                .failed_paths()
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
            summary: JsonSummary {
                scan: report.summary.clone(),
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix().to_string(),
            },
            sweep: None,
        }
    }

    /// Attach the outcome of a sweep.
    #[must_use]
    pub fn with_sweep(mut self, result: &BatchResult) -> Self {
        self.sweep = Some(JsonSweep::from_batch_result(result));
        self
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
