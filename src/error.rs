// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Conditions that abort a run. Filtering exclusions (a profile without a
/// trusted cutoff, a hit under threshold) are normal control flow and never
/// surface here.
#[derive(Debug, Error)]
pub enum SiftError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A data line that cannot be read as a record: wrong field count, a
    /// field that fails numeric coercion, or an invariant violation.
    #[error("{path}:{line}: {reason}")]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// Overlap tolerance outside the accepted range.
    #[error("overlap tolerance {0} must lie in [0, 1)")]
    InvalidOverlap(f64),
}

impl SiftError {
    pub(crate) fn malformed(path: &std::path::Path, line: usize, reason: impl Into<String>) -> Self {
        SiftError::Malformed {
            path: path.to_path_buf(),
            line,
            reason: reason.into(),
        }
    }
}
