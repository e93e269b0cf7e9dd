//! Convenient imports for tracedb.
//!
//! ```ignore
//! use tracedb::prelude::*;
//!
//! let set = TraceSet::open("capture.trs", TraceSetOptions::default())?;
//! let first = set.trace(0)?;
//! ```

// Errors
pub use crate::{Error, Result};

// Trace sets
pub use crate::{MemoryTraceSet, TraceSet, TraceSource};

// Trace values
pub use crate::{Metadata, MetadataValue, SampleType, Trace, TraceHandle, TraceLayout, TraceRecord};

// Transforms
pub use crate::{
    Average, Criterion, DerivedTraceSet, ExtractPattern, PatternCorrelation, Pipeline, Transform,
};

// Configuration
pub use crate::{LogConfig, PipelineOptions, TraceSetOptions};
