//! Error types for tracedb.
//!
//! One enum covers every layer. Variants follow the failure classes a
//! caller has to tell apart: a malformed file, an index outside the set,
//! a resource limit, a layout mismatch while encoding, and a failed
//! transform stage. Everything is returned to the direct caller; nothing
//! is retried.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// All tracedb errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Header fields inconsistent, unknown codes, or a truncated file
    #[error("format error: {0}")]
    Format(String),

    /// The file was created by a writer that never finalized it
    #[error("trace set at {} was never finalized", path.display())]
    Pending {
        /// File that carries the pending trace count
        path: PathBuf,
    },

    /// Trace index outside `[0, len)`
    #[error("trace index {index} out of range (trace set holds {len})")]
    OutOfBounds {
        /// Requested index
        index: usize,
        /// Number of traces in the set
        len: usize,
    },

    /// Descriptor exhaustion or allocation failure
    #[error("resource exhausted: {0}")]
    Resource(String),

    /// I/O error, including short reads
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A record does not match the configured layout
    #[error("validation error: {0}")]
    Validation(String),

    /// A transform stage failed and the run was aborted
    #[error("transform {stage} failed: {reason}")]
    Transform {
        /// Stage that failed (init, accumulate, finalize, ...)
        stage: &'static str,
        /// Human-readable reason
        reason: String,
    },

    /// Operation not allowed in the trace set's current mode
    #[error("invalid state: {0}")]
    InvalidState(String),
}

/// Too many open files in the system.
#[cfg(unix)]
const ENFILE: i32 = 23;

/// Too many open files in this process.
#[cfg(unix)]
const EMFILE: i32 = 24;

#[cfg(unix)]
fn descriptors_exhausted(err: &io::Error) -> bool {
    matches!(err.raw_os_error(), Some(ENFILE) | Some(EMFILE))
}

#[cfg(not(unix))]
fn descriptors_exhausted(_err: &io::Error) -> bool {
    false
}

/// Result type for tracedb operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build a transform stage error.
    pub fn transform(stage: &'static str, reason: impl Into<String>) -> Self {
        Error::Transform {
            stage,
            reason: reason.into(),
        }
    }

    /// Classify an error raised while opening or creating a file.
    ///
    /// Descriptor exhaustion and out-of-memory become [`Error::Resource`];
    /// everything else stays an I/O error.
    pub fn from_open(path: &std::path::Path, err: io::Error) -> Self {
        let exhausted =
            descriptors_exhausted(&err) || err.kind() == io::ErrorKind::OutOfMemory;
        if exhausted {
            Error::Resource(format!("{}: {}", path.display(), err))
        } else {
            Error::Io(err)
        }
    }

    /// Check if this is a format error (including a pending file).
    pub fn is_format(&self) -> bool {
        matches!(self, Error::Format(_) | Error::Pending { .. })
    }

    /// Check if this is a bounds error.
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, Error::OutOfBounds { .. })
    }

    /// Check if this is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Check if this error came from a transform stage.
    pub fn is_transform(&self) -> bool {
        matches!(self, Error::Transform { .. })
    }
}
