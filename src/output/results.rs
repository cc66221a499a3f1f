//! Plain-text results file.
//!
//! # Layouts
//!
//! Flat, one tagged entry per line:
//!
//! ```text
//! /abs/path/empty.txt --- is an empty file
//! /abs/path/b.txt --- is a duplicate of another file
//! /abs/path/c.txt --- is a duplicate of another file
//! ```
//!
//! Grouped, one block per category with a blank line after each block:
//!
//! ```text
//! [EMPTY FILES]
//! /abs/path/empty.txt
//!
//! [DUPLICATE GROUP]
//! /abs/path/b.txt
//! /abs/path/c.txt
//!
//! ```
//!
//! Groups with a single member are never written.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::duplicates::DuplicateGroup;
use crate::scanner::Entry;

/// Name of the results file written into the output directory.
pub const RESULTS_FILE_NAME: &str = "scan_results.txt";

/// Layout of the results file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// One line per tagged entry
    Flat,
    /// Header line per block, one path per line
    #[default]
    Grouped,
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Layout::Flat => write!(f, "flat"),
            Layout::Grouped => write!(f, "grouped"),
        }
    }
}

/// Errors that can occur while writing the results file.
#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    /// The results file could not be created or written.
    #[error("Failed to write results to {path}: {source}")]
    WriteFailure {
        /// Path of the results file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Renderer for the results of one scan.
#[derive(Debug, Clone, Copy)]
pub struct ResultsFile<'a> {
    empty_files: &'a [Entry],
    groups: &'a [DuplicateGroup],
    layout: Layout,
}

impl<'a> ResultsFile<'a> {
    /// Create a renderer over a scan's empty files and duplicate groups.
    #[must_use]
    pub fn new(empty_files: &'a [Entry], groups: &'a [DuplicateGroup], layout: Layout) -> Self {
        Self {
            empty_files,
            groups,
            layout,
        }
    }

    fn true_groups(&self) -> impl Iterator<Item = &'a DuplicateGroup> {
        self.groups.iter().filter(|g| g.is_true_duplicate())
    }

    /// Write the results in the configured layout.
    ///
    /// # Errors
    ///
    /// Returns any error produced by `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        match self.layout {
            Layout::Flat => self.write_flat(writer),
            Layout::Grouped => self.write_grouped(writer),
        }
    }

    fn write_flat<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for entry in self.empty_files {
            writeln!(writer, "{} --- is an empty file", entry.path.display())?;
        }
        for group in self.true_groups() {
            for entry in &group.entries {
                writeln!(
                    writer,
                    "{} --- is a duplicate of another file",
                    entry.path.display()
                )?;
            }
        }
        Ok(())
    }

    fn write_grouped<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if !self.empty_files.is_empty() {
            writeln!(writer, "[EMPTY FILES]")?;
            for entry in self.empty_files {
                writeln!(writer, "{}", entry.path.display())?;
            }
            writeln!(writer)?;
        }
        for group in self.true_groups() {
            writeln!(writer, "[DUPLICATE GROUP]")?;
            for entry in &group.entries {
                writeln!(writer, "{}", entry.path.display())?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    /// Render the results into a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

/// Write `results` to [`RESULTS_FILE_NAME`] inside `dir`.
///
/// The directory must already exist. Returns the path of the written file.
///
/// # Errors
///
/// Returns [`ReportError::WriteFailure`] if the file cannot be created or
/// written.
pub fn save_results(dir: &Path, results: &ResultsFile<'_>) -> Result<PathBuf, ReportError> {
    let path = dir.join(RESULTS_FILE_NAME);
    let write_failure = |source: io::Error| ReportError::WriteFailure {
        path: path.clone(),
        source,
    };

    let file = File::create(&path).map_err(write_failure)?;
    let mut writer = BufWriter::new(file);
    results.write_to(&mut writer).map_err(write_failure)?;
    writer.flush().map_err(write_failure)?;

    log::info!("Results written to {}", path.display());
    Ok(path)
}
