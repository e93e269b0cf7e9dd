//! On-disk byte formats for trace set files.
//!
//! This module centralizes the serialization of everything that precedes
//! the trace records: the fixed global header and the metadata entries.
//! Record bodies are handled by the codec.
//!
//! # Module Structure
//!
//! - `header`: fixed header layout, magic, pending trace count marker
//! - `metadata`: typed `(name, value)` entries following the header

pub mod header;
pub mod metadata;

pub use header::{
    TraceSetHeader, HEADER_SIZE, PENDING_TRACE_COUNT, TRACESET_FORMAT_VERSION, TRACESET_MAGIC,
    TRACE_COUNT_OFFSET,
};
