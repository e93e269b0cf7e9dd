//! Core types for tracedb
//!
//! This crate defines the values every other layer passes around:
//! - Error: the error taxonomy and `Result` alias
//! - TraceLayout / SampleType / FieldSpan: the shape of a trace set
//! - Metadata: ordered typed header entries
//! - Trace / TraceRecord: decoded traces and write payloads
//! - TraceSource: the read contract shared by root, derived and in-memory sets
//! - TraceSetOptions / PipelineOptions: configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod layout;
pub mod metadata;
pub mod source;
pub mod trace;

pub use config::{PipelineOptions, TraceSetOptions};
pub use error::{Error, Result};
pub use layout::{FieldSpan, SampleType, TraceLayout};
pub use metadata::{Metadata, MetadataEntry, MetadataValue};
pub use source::{MemoryTraceSet, TraceHandle, TraceSource};
pub use trace::{Trace, TraceData, TraceRecord};
