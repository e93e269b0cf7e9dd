//! Storage layer for tracedb
//!
//! This crate implements the file-backed side of a trace set:
//! - format: fixed global header and typed metadata entries
//! - codec: record encode/decode with sample type and yscale handling
//! - TraceFile: the file descriptor behind a mutual-exclusion gate
//! - TraceCache: index-keyed, reference-counted cache of decoded traces
//! - TraceSet: root trace sets (open, create, append, finalize, close)

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Log a lifecycle event at info level when `verbose`, debug otherwise.
macro_rules! lifecycle {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::info!($($arg)+)
        } else {
            tracing::debug!($($arg)+)
        }
    };
}

pub mod cache;
pub mod codec;
pub mod file;
pub mod format;
pub mod traceset;

pub use cache::{CacheStats, TraceCache};
pub use file::TraceFile;
pub use format::TraceSetHeader;
pub use traceset::TraceSet;
