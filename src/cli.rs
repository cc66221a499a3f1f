//! Command-line interface definitions for broom.
//!
//! This module defines all CLI arguments and subcommands using the clap derive API.
//! Global options (verbosity, color, config file) apply to every command. A bare
//! path with no subcommand is a scan.
//!
//! # Example
//!
//! ```bash
//! # Report duplicates and empty files (non-destructive)
//! broom ~/Downloads
//! broom scan ~/Downloads --layout flat -o /tmp
//!
//! # Delete empty files and replace duplicates with symlinks
//! broom sweep ~/Downloads
//!
//! # Keep empty files, only relink duplicates
//! broom sweep ~/Downloads --ignore-empty
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::Config;
use crate::output::Layout;

/// Find duplicate and empty files and sweep them away.
///
/// broom compares files by size and then by a small sample of their
/// content. Scanning only reports; sweeping deletes empty files and
/// replaces every duplicate but one with a symlink to the retained copy.
#[derive(Debug, Parser)]
#[command(name = "broom")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute (defaults to scan)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Target of the default scan command
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Available subcommands for broom.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Report duplicate and empty files without changing anything
    Scan(TargetArgs),
    /// Delete empty files and replace duplicates with symlinks
    Sweep(TargetArgs),
}

/// What a run does to the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Report only
    Scan,
    /// Report, then remediate
    Sweep,
}

/// Arguments shared by scan and sweep.
#[derive(Debug, Clone, Default, Args)]
pub struct TargetArgs {
    /// Directory to search for duplicate and empty files
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Directory the results file is written to
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Leave empty files in place when sweeping
    #[arg(long)]
    pub ignore_empty: bool,

    /// Layout of the results file
    #[arg(long, value_enum, default_value_t = Layout::Grouped)]
    pub layout: Layout,

    /// Format of the summary printed to stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Bytes read per sampled piece when fingerprinting
    #[arg(long, value_name = "BYTES")]
    pub piece_size: Option<usize>,

    /// Pieces sampled from files larger than the sample budget
    #[arg(long, value_name = "N")]
    pub piece_count: Option<usize>,
}

impl TargetArgs {
    /// Override configuration values with the flags given on the command line.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(ref output) = self.output {
            config.output_dir = output.clone();
        }
        if self.ignore_empty {
            config.ignore_empty = true;
        }
        if self.skip_hidden {
            config.skip_hidden = true;
        }
        if let Some(piece_size) = self.piece_size {
            config.sampling.piece_size = piece_size;
        }
        if let Some(piece_count) = self.piece_count {
            config.sampling.piece_count = piece_count;
        }
    }
}

/// Format of the summary printed to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// JSON report for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl Cli {
    /// The mode of this run and the arguments it applies to.
    #[must_use]
    pub fn invocation(&self) -> (Mode, &TargetArgs) {
        match self.command {
            Some(Commands::Scan(ref args)) => (Mode::Scan, args),
            Some(Commands::Sweep(ref args)) => (Mode::Sweep, args),
            None => (Mode::Scan, &self.target),
        }
    }
}
