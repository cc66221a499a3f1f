//! Replacing duplicate copies with symbolic links.
//!
//! The first member of every [`DuplicateGroup`] is retained. Every other
//! member is deleted and a symlink pointing at the retained file's absolute
//! path is created in its place. Groups with a single member are left alone.

use std::io;
use std::path::Path;
use std::sync::Arc;

use super::delete::{permanent_delete, BatchResult, RemediationError};
use crate::duplicates::DuplicateGroup;
use crate::progress::ProgressCallback;

#[cfg(unix)]
fn make_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn make_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(not(any(unix, windows)))]
fn make_symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not supported on this platform",
    ))
}

/// Replace `path` with a symlink to `target`.
///
/// # Errors
///
/// Returns [`RemediationError::Delete`] if `path` cannot be removed, or
/// [`RemediationError::Symlink`] if the link cannot be created afterwards.
pub fn replace_with_symlink(path: &Path, target: &Path) -> Result<(), RemediationError> {
    permanent_delete(path)?;
    make_symlink(target, path).map_err(|source| RemediationError::Symlink {
        path: path.to_path_buf(),
        target: target.to_path_buf(),
        source,
    })?;
    log::debug!("Linked {} -> {}", path.display(), target.display());
    Ok(())
}

/// Sweep every true duplicate group.
///
/// For each group with two or more members, every member after the first is
/// replaced by a link to the first. If the retained file no longer exists
/// the whole group is skipped and a [`RemediationError::MissingCanonical`]
/// is recorded, so no dangling links are created.
pub fn remove_duplicates_make_symlinks(
    groups: &[DuplicateGroup],
    progress: Option<&Arc<dyn ProgressCallback>>,
) -> BatchResult {
    let mut result = BatchResult::default();
    let total: usize = groups.iter().map(DuplicateGroup::duplicate_count).sum();
    if let Some(callback) = progress {
        callback.on_phase_start("sweeping", total);
    }

    let mut done = 0;
    for group in groups.iter().filter(|g| g.is_true_duplicate()) {
        let Some(canonical) = group.canonical() else {
            continue;
        };
        if !canonical.path.exists() {
            log::warn!(
                "Skipping group {}: retained copy {} is missing",
                group.fingerprint,
                canonical.path.display()
            );
            result.failures.push(RemediationError::MissingCanonical {
                path: canonical.path.clone(),
            });
            done += group.duplicate_count();
            continue;
        }

        let target =
            std::path::absolute(&canonical.path).unwrap_or_else(|_| canonical.path.clone());
        for entry in group.redundant() {
            done += 1;
            if let Some(callback) = progress {
                callback.on_progress(done, &entry.path.to_string_lossy());
            }
            match replace_with_symlink(&entry.path, &target) {
                Ok(()) => {
                    result.bytes_freed += entry.size;
                    result.linked.push(entry.path.clone());
                }
                Err(e) => {
                    log::warn!("{}", e);
                    result.failures.push(e);
                }
            }
        }
    }

    if let Some(callback) = progress {
        callback.on_phase_end("sweeping");
    }
    log::info!(
        "Replaced {} duplicates with links, {} failures",
        result.linked.len(),
        result.failure_count()
    );
    result
}
