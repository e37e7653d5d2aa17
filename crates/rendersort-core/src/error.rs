//! # Design
//!
//! - Per-item mapping failures are not errors; they are recorded in the run report.
//! - Only construction-time faults surface here, with constant messages and context fields.

use thiserror::Error;

/// Result alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors produced while preparing the mapper or parsing core configuration values.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The filename pattern failed to compile.
    #[error("failed to compile filename pattern")]
    PatternCompile {
        /// Pattern source text.
        pattern: &'static str,
        /// Underlying regex error.
        source: regex::Error,
    },
    /// A placement mode string did not name a known mode.
    #[error("unknown placement mode")]
    UnknownPlacementMode {
        /// Value supplied by the caller.
        value: String,
    },
}
