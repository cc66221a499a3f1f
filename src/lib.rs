//! broom - duplicate and empty file sweeper
//!
//! broom tracks every regular file under a directory, narrows them down to
//! likely duplicates by size and then by a small fixed-offset content
//! sample, and reports the result. Sweeping deletes empty files and
//! replaces every duplicate but one with a symlink to the retained copy.
//!
//! # Modules
//!
//! - [`scanner`]: tracking files and fingerprinting their contents
//! - [`duplicates`]: the reduction pipeline and grouping
//! - [`actions`]: sweeping (deleting and relinking)
//! - [`output`]: results file and JSON report

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use bytesize::ByteSize;
use yansi::Paint;

use crate::actions::{remove_duplicates_make_symlinks, remove_empty_files, BatchResult};
use crate::cli::{Cli, Mode, OutputFormat};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig, ScanReport};
use crate::error::ExitCode;
use crate::output::{save_results, JsonOutput, ResultsFile};
use crate::progress::{Progress, ProgressCallback};
use crate::scanner::TrackerConfig;

/// Run broom for a parsed command line.
///
/// # Errors
///
/// Returns an error if no target path was given, the configuration is
/// invalid, the target does not exist, or the results file cannot be
/// written. Failures on individual files are reported, not returned.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    let (mode, args) = cli.invocation();
    let Some(path) = args.path.as_deref() else {
        bail!("No target path supplied (see --help)");
    };

    let mut config =
        Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    args.apply_to(&mut config);
    config.validate().context("Invalid configuration")?;

    let progress: Arc<dyn ProgressCallback> =
        Arc::new(Progress::new(cli.quiet || args.format == OutputFormat::Json));
    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_sampling(config.sampling)
            .with_tracker_config(TrackerConfig::default().with_skip_hidden(config.skip_hidden))
            .with_progress_callback(progress.clone()),
    );

    let report = finder
        .find_duplicates(path)
        .with_context(|| format!("Failed to scan {}", path.display()))?;

    let results = ResultsFile::new(&report.empty_files, &report.groups, args.layout);
    let results_path = save_results(&config.output_dir, &results)
        .context("Failed to save scan results")?;

    let sweep = match mode {
        Mode::Scan => None,
        Mode::Sweep => Some(run_sweep(&report, &config, &progress)),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.format {
        OutputFormat::Json => {
            let mut output = JsonOutput::new(&report, ExitCode::Success);
            if let Some(ref result) = sweep {
                output = output.with_sweep(result);
            }
            output
                .write_to(&mut out, true)
                .context("Failed to write JSON output")?;
        }
        OutputFormat::Text if !cli.quiet => {
            print_summary(&mut out, &report, sweep.as_ref(), &results_path)
                .context("Failed to write summary")?;
        }
        OutputFormat::Text => {}
    }

    Ok(ExitCode::Success)
}

/// Remediate everything a scan found.
fn run_sweep(
    report: &ScanReport,
    config: &Config,
    progress: &Arc<dyn ProgressCallback>,
) -> BatchResult {
    let mut result = BatchResult::default();
    if config.ignore_empty {
        log::info!("Leaving {} empty files in place", report.empty_files.len());
    } else {
        result.merge(remove_empty_files(&report.empty_files, Some(progress)));
    }
    result.merge(remove_duplicates_make_symlinks(&report.groups, Some(progress)));
    result
}

/// Print the human-readable summary of a run.
///
/// # Errors
///
/// Returns any error produced by `out`.
pub fn print_summary<W: Write>(
    out: &mut W,
    report: &ScanReport,
    sweep: Option<&BatchResult>,
    results_path: &Path,
) -> io::Result<()> {
    let summary = &report.summary;

    writeln!(
        out,
        "{} {} files ({}) in {:.2?}",
        "Tracked".bold(),
        summary.total_files,
        summary.total_size_display(),
        summary.scan_duration
    )?;
    writeln!(out, "  {} empty files", summary.empty_files.yellow())?;
    writeln!(
        out,
        "  {} duplicate groups, {} redundant copies",
        summary.duplicate_groups.yellow(),
        summary.duplicate_files.yellow()
    )?;
    writeln!(
        out,
        "  {} reclaimable ({:.1}% of tracked bytes)",
        summary.reclaimable_display().green().bold(),
        summary.wasted_percentage()
    )?;
    if summary.fingerprint_failures > 0 {
        writeln!(
            out,
            "  {} files could not be read",
            summary.fingerprint_failures.red()
        )?;
    }

    if let Some(result) = sweep {
        writeln!(
            out,
            "{} removed {} files, linked {} files, freed {}",
            "Swept:".bold(),
            result.removed.len(),
            result.linked.len(),
            ByteSize::b(result.bytes_freed).green()
        )?;
        for failure in &result.failures {
            writeln!(out, "  {} {}", "failed:".red(), failure)?;
        }
    }

    writeln!(out, "Results written to {}", results_path.display())?;
    Ok(())
}
