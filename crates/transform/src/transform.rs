//! The transform capability trait
//!
//! A transform describes a staged, single-pass computation over a source
//! trace set. The pipeline engine drives the stages in this order:
//!
//! ```text
//! init(source)                      -> derived layout
//! for each trace in index order:
//!     interesting(trace)?           -> skip if false
//!     matches(trace, block)?        -> close block if false
//!     initialize_block(trace)       -> when no block is open
//!     accumulate(trace, block)
//! finalize(block)                   -> derived records, per closed block
//! exit()
//! ```
//!
//! Only `accumulate` reads raw samples, and it must not keep the trace past
//! the call. Block state is the only memory that grows with the source.

use serde_json::Value as JsonValue;
use tracedb_core::{Metadata, Result, Trace, TraceLayout, TraceRecord, TraceSource};

/// How blocks end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Criterion {
    /// Every interesting trace feeds the open block until it stops
    /// matching or the source is exhausted. With the default `matches`
    /// this is one block over the whole source.
    ExhaustList,
    /// Each interesting trace is its own block; nothing accumulates
    /// across traces.
    Singular,
}

/// A transform kind the pipeline can run.
pub trait Transform: Send {
    /// Per-block accumulator state.
    type Block;

    /// Short stable name, recorded in derived metadata.
    fn name(&self) -> &'static str;

    /// Block termination criterion.
    fn criterion(&self) -> Criterion;

    /// Parameters, recorded in derived metadata as JSON.
    fn config(&self) -> JsonValue {
        JsonValue::Null
    }

    /// Inspect the source and compute the derived layout.
    ///
    /// Fails if the source lacks something the transform needs.
    fn init(&mut self, source: &dyn TraceSource) -> Result<TraceLayout>;

    /// Extra metadata for the derived set.
    fn derived_metadata(&self, source: &dyn TraceSource) -> Metadata {
        let _ = source;
        Metadata::new()
    }

    /// Whether `trace` carries what `accumulate` needs.
    fn interesting(&self, trace: &Trace) -> bool {
        trace.has_samples()
    }

    /// Whether `trace` belongs to the open block. Only consulted under
    /// [`Criterion::ExhaustList`].
    fn matches(&self, trace: &Trace, block: &Self::Block) -> bool {
        let _ = (trace, block);
        true
    }

    /// Fresh block state, seeded from the block's first trace.
    fn initialize_block(&self, first: &Trace) -> Result<Self::Block>;

    /// Feed one trace into the block.
    fn accumulate(&self, trace: &Trace, block: &mut Self::Block) -> Result<()>;

    /// Turn a closed block into derived records.
    fn finalize(&self, block: Self::Block) -> Result<Vec<TraceRecord>>;

    /// Release transform-owned resources after the run.
    fn exit(&mut self) {}
}
