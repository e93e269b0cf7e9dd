//! Transform layer for tracedb
//!
//! This crate turns one trace set into another in a single streaming pass:
//! - accumulator: fixed-size running sums for mean and Pearson statistics
//! - transform: the staged `Transform` capability and block `Criterion`
//! - pipeline: the engine that drives a transform into a `RecordSink`
//! - derived: `DerivedTraceSet`, a materialized child of a parent set
//! - transforms: pattern correlation, pattern extraction, averaging

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

pub mod accumulator;
pub mod derived;
pub mod pipeline;
pub mod transform;
pub mod transforms;

pub use accumulator::{AccumulatorBank, PairAccumulator};
pub use derived::DerivedTraceSet;
pub use pipeline::{Pipeline, PipelineReport, RecordSink};
pub use transform::{Criterion, Transform};
pub use transforms::{Average, ExtractPattern, PatternCorrelation};
