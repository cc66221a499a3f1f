//! Fixed-offset content sampling.
//!
//! # Overview
//!
//! A fingerprint is not a hash. It is the raw bytes of a few small pieces
//! of the file, hex-encoded:
//!
//! - Files no larger than the sample budget (`piece_size * piece_count`)
//!   are read in full.
//! - Larger files contribute one piece from the start, one from the end,
//!   and the remaining pieces centered at evenly spaced interior points.
//!   With the default three pieces this is start, middle, end.
//!
//! Two files with identical bytes at the sampled offsets get the same
//! fingerprint even if they differ elsewhere. Raising the budget makes
//! this less likely at the cost of more I/O per candidate.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::FingerprintError;

/// Default number of bytes in one sampled piece.
pub const DEFAULT_PIECE_SIZE: usize = 24;

/// Default number of pieces sampled from a large file.
pub const DEFAULT_PIECE_COUNT: usize = 3;

/// Sampling strategy used to fingerprint files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Bytes read per piece.
    pub piece_size: usize,
    /// Pieces read from files larger than the sample budget.
    pub piece_count: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            piece_size: DEFAULT_PIECE_SIZE,
            piece_count: DEFAULT_PIECE_COUNT,
        }
    }
}

impl SamplingConfig {
    /// Create a sampling configuration.
    #[must_use]
    pub fn new(piece_size: usize, piece_count: usize) -> Self {
        Self {
            piece_size,
            piece_count,
        }
    }

    /// Set the piece size.
    #[must_use]
    pub fn with_piece_size(mut self, piece_size: usize) -> Self {
        self.piece_size = piece_size;
        self
    }

    /// Set the piece count.
    #[must_use]
    pub fn with_piece_count(mut self, piece_count: usize) -> Self {
        self.piece_count = piece_count;
        self
    }

    /// Total bytes sampled from a large file.
    #[must_use]
    pub fn budget(&self) -> u64 {
        (self.piece_size as u64).saturating_mul(self.piece_count as u64)
    }

    /// Both parameters must be non-zero.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.piece_size > 0 && self.piece_count > 0
    }

    /// Offsets of the pieces read from a file of `size` bytes.
    ///
    /// Returns an empty vector when the file fits in the sample budget and
    /// is read whole instead.
    #[must_use]
    pub fn piece_offsets(&self, size: u64) -> Vec<u64> {
        if size <= self.budget() || !self.is_valid() {
            return Vec::new();
        }

        let piece = self.piece_size as u64;
        let last = size - piece;
        match self.piece_count {
            1 => vec![0],
            2 => vec![0, last],
            count => {
                let intervals = count as u64 - 1;
                let mut offsets = Vec::with_capacity(count);
                offsets.push(0);
                for k in 1..intervals {
                    // Center of the k-th interior point, kept inside the file.
                    let center = (size as u128 * k as u128 / intervals as u128) as u64;
                    offsets.push(center.saturating_sub(piece / 2).min(last));
                }
                offsets.push(last);
                offsets
            }
        }
    }
}

/// Read the sample bytes of a file.
///
/// `size` is the size recorded when the file was tracked. The handle is
/// opened here and dropped before returning on every path.
///
/// # Errors
///
/// Returns [`FingerprintError::ReadFailure`] if the file cannot be opened,
/// or if a seek or read fails (including the file shrinking underneath us).
pub fn sample_file(
    path: &Path,
    size: u64,
    sampling: &SamplingConfig,
) -> Result<Vec<u8>, FingerprintError> {
    let read_failure = |source: std::io::Error| FingerprintError::ReadFailure {
        path: path.to_path_buf(),
        source,
    };

    if size == 0 {
        return Ok(Vec::new());
    }

    let mut file = File::open(path).map_err(read_failure)?;

    let offsets = sampling.piece_offsets(size);
    if offsets.is_empty() {
        let mut buffer = Vec::with_capacity(size as usize);
        (&mut file)
            .take(sampling.budget())
            .read_to_end(&mut buffer)
            .map_err(read_failure)?;
        log::trace!("Sampled whole file ({} bytes): {}", buffer.len(), path.display());
        return Ok(buffer);
    }

    let mut buffer = vec![0u8; sampling.piece_size * offsets.len()];
    for (chunk, offset) in buffer.chunks_mut(sampling.piece_size).zip(&offsets) {
        file.seek(SeekFrom::Start(*offset)).map_err(read_failure)?;
        file.read_exact(chunk).map_err(read_failure)?;
    }

    log::trace!(
        "Sampled {} pieces at {:?}: {}",
        offsets.len(),
        offsets,
        path.display()
    );
    Ok(buffer)
}
