//! # tracedb
//!
//! Disk-backed trace sets for side-channel analysis.
//!
//! A trace set is an ordered collection of traces sharing one layout:
//! a fixed-size title, a data blob carrying input/output/key fields, and
//! a run of samples stored as 8/16/32-bit integers or floats. Sets live in
//! a single file with a typed metadata header, and decoded traces are
//! served through a reference-counted cache.
//!
//! ## Quick Start
//!
//! ```ignore
//! use tracedb::prelude::*;
//!
//! let layout = TraceLayout::new(4, SampleType::Float32);
//! let mut set = TraceSet::create("a.trs", layout, Metadata::new(), TraceSetOptions::default())?;
//! set.append_trace(&TraceRecord::from_samples(vec![1.0, 2.0, 3.0, 4.0]))?;
//! set.finalize()?;
//! set.close()?;
//!
//! let parent = std::sync::Arc::new(TraceSet::open("a.trs", TraceSetOptions::default())?);
//! let corr = DerivedTraceSet::materialize(
//!     parent,
//!     PatternCorrelation::new(0),
//!     "a.corr.trs",
//!     TraceSetOptions::default(),
//!     PipelineOptions::default(),
//! )?;
//! ```
//!
//! ## Layers
//!
//! - [`tracedb_core`]: layout, traces, metadata, errors, configuration
//! - [`tracedb_storage`]: file format, codec, cache, root trace sets
//! - [`tracedb_transform`]: accumulators, the pipeline engine, transforms

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod logging;
pub mod prelude;

pub use logging::LogConfig;

// Core types
pub use tracedb_core::{
    Error, FieldSpan, MemoryTraceSet, Metadata, MetadataEntry, MetadataValue, PipelineOptions,
    Result, SampleType, Trace, TraceData, TraceHandle, TraceLayout, TraceRecord, TraceSetOptions,
    TraceSource,
};

// Storage
pub use tracedb_storage::{CacheStats, TraceCache, TraceSet, TraceSetHeader};

// Transforms
pub use tracedb_transform::{
    AccumulatorBank, Average, Criterion, DerivedTraceSet, ExtractPattern, PairAccumulator,
    PatternCorrelation, Pipeline, PipelineReport, RecordSink, Transform,
};
