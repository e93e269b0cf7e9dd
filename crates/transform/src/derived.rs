//! Derived trace sets
//!
//! A [`DerivedTraceSet`] keeps its parent alive, owns the transform that
//! produced it, and reads its own traces from the file the pipeline wrote.
//! Once materialized it answers the same [`TraceSource`] contract as a
//! root set, so derived sets can themselves be transformed.

use crate::pipeline::{Pipeline, PipelineReport};
use crate::transform::Transform;
use std::path::Path;
use std::sync::Arc;
use tracedb_core::{
    Metadata, PipelineOptions, Result, TraceHandle, TraceLayout, TraceSetOptions, TraceSource,
};
use tracedb_storage::TraceSet;

/// A trace set computed from a parent by a transform.
pub struct DerivedTraceSet<T: Transform> {
    parent: Arc<dyn TraceSource>,
    transform: T,
    store: TraceSet,
    report: PipelineReport,
}

impl<T: Transform> DerivedTraceSet<T> {
    /// Run `transform` over `parent`, writing the result to `path`.
    ///
    /// On failure the partially written file keeps its pending trace count
    /// and cannot be opened; the caller should delete it.
    pub fn materialize(
        parent: Arc<dyn TraceSource>,
        mut transform: T,
        path: impl AsRef<Path>,
        options: TraceSetOptions,
        pipeline: PipelineOptions,
    ) -> Result<Self> {
        let path = path.as_ref();
        let (writer, report) = Pipeline::new(pipeline).run(
            parent.as_ref(),
            &mut transform,
            |layout, metadata| TraceSet::create(path, layout, metadata, options.clone()),
        )?;
        writer.close()?;
        let store = TraceSet::open(path, options)?;
        Ok(Self {
            parent,
            transform,
            store,
            report,
        })
    }

    /// The set this one was computed from.
    pub fn parent(&self) -> &Arc<dyn TraceSource> {
        &self.parent
    }

    /// The transform that produced this set.
    pub fn transform(&self) -> &T {
        &self.transform
    }

    /// Counters from the materializing run.
    pub fn report(&self) -> &PipelineReport {
        &self.report
    }

    /// Backing file-based set.
    pub fn store(&self) -> &TraceSet {
        &self.store
    }

    /// Release the cache and file handle. The parent reference is dropped
    /// with `self`.
    pub fn close(self) -> Result<()> {
        self.store.close()
    }
}

impl<T: Transform + Sync> TraceSource for DerivedTraceSet<T> {
    fn layout(&self) -> &TraceLayout {
        self.store.layout()
    }

    fn num_traces(&self) -> usize {
        self.store.num_traces()
    }

    fn readable_traces(&self) -> Result<usize> {
        self.store.readable_traces()
    }

    fn trace(&self, index: usize) -> Result<TraceHandle> {
        self.store.trace(index)
    }

    fn metadata(&self) -> &Metadata {
        self.store.metadata()
    }
}
