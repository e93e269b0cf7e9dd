//! The trace set read contract
//!
//! Anything that can hand out traces by index implements [`TraceSource`]:
//! file-backed root sets, derived sets, and ingestion adapters that
//! synthesize traces from other formats.

use crate::error::{Error, Result};
use crate::layout::TraceLayout;
use crate::metadata::Metadata;
use crate::trace::{Trace, TraceData, TraceRecord};
use std::sync::Arc;

/// Shared handle to a decoded trace. Dropping the last handle outside
/// the cache makes the entry eligible for eviction.
pub type TraceHandle = Arc<Trace>;

/// Read access to an ordered collection of traces sharing one layout.
pub trait TraceSource: Send + Sync {
    /// Layout shared by every trace.
    fn layout(&self) -> &TraceLayout;

    /// Number of readable traces.
    fn num_traces(&self) -> usize;

    /// Number of readable traces, or the reason the set cannot be read
    /// right now (for example a writer that has not been finalized).
    ///
    /// Consumers that scan the whole set use this instead of
    /// [`TraceSource::num_traces`] so an unreadable source is reported
    /// rather than treated as empty.
    fn readable_traces(&self) -> Result<usize> {
        Ok(self.num_traces())
    }

    /// Fetch the trace at `index`.
    ///
    /// Returns [`Error::OutOfBounds`] for `index >= num_traces()`.
    fn trace(&self, index: usize) -> Result<TraceHandle>;

    /// Metadata header entries, in file order.
    fn metadata(&self) -> &Metadata;

    /// Samples per trace.
    fn num_samples(&self) -> usize {
        self.layout().sample_count
    }
}

/// In-memory trace set.
///
/// This is the boundary an ingestion adapter targets: build records from
/// any external format, push them here, and hand the result to anything
/// that consumes a [`TraceSource`].
#[derive(Debug, Clone)]
pub struct MemoryTraceSet {
    layout: TraceLayout,
    metadata: Metadata,
    traces: Vec<TraceHandle>,
}

impl MemoryTraceSet {
    /// Empty set with the given layout.
    pub fn new(layout: TraceLayout) -> Self {
        Self {
            layout,
            metadata: Metadata::new(),
            traces: Vec::new(),
        }
    }

    /// Attach metadata entries.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Append a record, checking it against the layout.
    ///
    /// Samples are stored as given; no integer quantization happens here.
    pub fn push(&mut self, record: TraceRecord) -> Result<usize> {
        if self.layout.sample_type.size() > 0 && record.samples.len() != self.layout.sample_count
        {
            return Err(Error::Validation(format!(
                "expected {} samples, got {}",
                self.layout.sample_count,
                record.samples.len()
            )));
        }
        let data = match (record.data, self.layout.data_size) {
            (None, 0) => None,
            (Some(bytes), size) if bytes.len() == size => Some(TraceData::new(bytes, &self.layout)),
            (other, size) => {
                return Err(Error::Validation(format!(
                    "expected {} data bytes, got {}",
                    size,
                    other.map_or(0, |b| b.len())
                )))
            }
        };
        let title = if self.layout.title_size > 0 {
            Some(record.title.unwrap_or_default())
        } else {
            None
        };
        let samples = self.layout.decodes_samples().then_some(record.samples);

        let index = self.traces.len();
        self.traces
            .push(Arc::new(Trace::new(index, title, data, samples)));
        Ok(index)
    }

    /// Builder-style push of samples only.
    pub fn with_samples(mut self, samples: Vec<f32>) -> Result<Self> {
        self.push(TraceRecord::from_samples(samples))?;
        Ok(self)
    }
}

impl TraceSource for MemoryTraceSet {
    fn layout(&self) -> &TraceLayout {
        &self.layout
    }

    fn num_traces(&self) -> usize {
        self.traces.len()
    }

    fn trace(&self, index: usize) -> Result<TraceHandle> {
        self.traces.get(index).cloned().ok_or(Error::OutOfBounds {
            index,
            len: self.traces.len(),
        })
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}
