//! Progress reporting utilities using indicatif.
//!
//! This module provides the [`ProgressCallback`] trait the pipeline reports
//! through, and [`Progress`], which renders it as terminal progress bars.
//!
//! Phases reported by the pipeline:
//! - `tracking`: spinner while the directory tree is walked
//! - `fingerprinting`: bar over the files that survived the size stage
//! - `sweeping`: bar over the entries being removed or relinked

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Progress callback for pipeline phases.
///
/// Implement this trait to receive progress updates while files are
/// tracked, fingerprinted and swept.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase (`tracking`, `fingerprinting`, `sweeping`)
    /// * `total` - Total number of items to process, or 0 if unknown
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Current item number (1-based)
    /// * `path` - Path being processed
    fn on_progress(&self, current: usize, path: &str);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);

    /// Called to update the progress message.
    fn on_message(&self, _message: &str) {}
}

/// Progress reporter using indicatif.
///
/// Only one phase is active at a time, so a single bar slot is enough.
pub struct Progress {
    multi: MultiProgress,
    active: Mutex<Option<(String, ProgressBar)>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bars will be displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use broom::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            active: Mutex::new(None),
            quiet,
        }
    }

    /// Whether output is suppressed.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn bar_style(color: &str) -> ProgressStyle {
        let template = format!(
            "[{{elapsed_precise}}] [{{bar:40.{color}/blue}}] {{pos}}/{{len}} ({{percent}}%) {{msg}}"
        );
        ProgressStyle::with_template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█>-")
    }

    fn with_active(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.active.lock() {
            if let Some((_, ref pb)) = *guard {
                f(pb);
            }
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        let pb = match phase {
            "tracking" => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::spinner_style());
                pb.set_message("Tracking files");
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            }
            "fingerprinting" => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::bar_style("cyan"));
                pb.set_message("Fingerprinting");
                pb
            }
            "sweeping" => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::bar_style("red"));
                pb.set_message("Sweeping");
                pb
            }
            other => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::bar_style("white"));
                pb.set_message(other.to_string());
                pb
            }
        };

        if let Ok(mut guard) = self.active.lock() {
            if let Some((_, previous)) = guard.replace((phase.to_string(), pb)) {
                previous.finish_and_clear();
            }
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }
        let message = truncate_path(path, 30);
        self.with_active(|pb| {
            pb.set_position(current as u64);
            pb.set_message(message);
        });
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }
        if let Ok(mut guard) = self.active.lock() {
            if guard.as_ref().is_some_and(|(name, _)| name == phase) {
                if let Some((_, pb)) = guard.take() {
                    pb.finish_with_message(format!("{phase} complete"));
                }
            }
        }
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }
        let message = message.to_string();
        self.with_active(|pb| pb.set_message(message));
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len + 4 > max_len {
        let tail: String = file_name
            .chars()
            .skip(name_len.saturating_sub(max_len.saturating_sub(3)))
            .collect();
        return format!("...{tail}");
    }

    format!(".../{file_name}")
}
