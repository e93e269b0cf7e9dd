//! Generic pipeline engine
//!
//! [`Pipeline::run`] drives any [`Transform`] over a [`TraceSource`] in a
//! single sequential pass, writing finalized blocks to a [`RecordSink`].
//! Each source trace is fetched once, handed to the transform, and dropped
//! before the next one is fetched.
//!
//! A source that cannot be read right now (an unfinalized writer) fails
//! the run before `init`. The first failing stage aborts the run. Records already appended stay
//! in the sink, which is dropped without `finish`, so a file-backed sink
//! keeps its pending trace count.

use crate::transform::{Criterion, Transform};
use tracedb_core::{
    Error, Metadata, PipelineOptions, Result, Trace, TraceLayout, TraceRecord, TraceSource,
};
use tracedb_storage::TraceSet;

/// Destination for derived records.
pub trait RecordSink {
    /// Append one record, returning its index.
    fn append(&mut self, record: &TraceRecord) -> Result<usize>;

    /// Called once after the last record of a successful run.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl RecordSink for TraceSet {
    fn append(&mut self, record: &TraceRecord) -> Result<usize> {
        self.append_trace(record)
    }

    fn finish(&mut self) -> Result<()> {
        self.finalize()
    }
}

impl RecordSink for Vec<TraceRecord> {
    fn append(&mut self, record: &TraceRecord) -> Result<usize> {
        self.push(record.clone());
        Ok(self.len() - 1)
    }
}

/// Counters from one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Source traces fetched
    pub traces_seen: usize,
    /// Traces rejected by `interesting`
    pub traces_skipped: usize,
    /// Blocks finalized
    pub blocks: usize,
    /// Derived records written
    pub outputs: usize,
    /// Most blocks open at once
    pub max_open_blocks: usize,
}

/// Runs transforms.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    /// Pipeline with the given options.
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    /// Run `transform` over `source`.
    ///
    /// `make_sink` receives the derived layout and metadata computed by
    /// `init` and returns the sink the finalized blocks are appended to.
    /// `exit` runs whether or not the run succeeds.
    pub fn run<T, S, F>(
        &self,
        source: &dyn TraceSource,
        transform: &mut T,
        make_sink: F,
    ) -> Result<(S, PipelineReport)>
    where
        T: Transform,
        S: RecordSink,
        F: FnOnce(TraceLayout, Metadata) -> Result<S>,
    {
        let result = self.run_stages(source, transform, make_sink);
        transform.exit();
        match &result {
            Ok((_, report)) => lifecycle!(
                self.options.verbose,
                transform = transform.name(),
                seen = report.traces_seen,
                skipped = report.traces_skipped,
                outputs = report.outputs,
                "transform finished"
            ),
            Err(e) => tracing::warn!(
                transform = transform.name(),
                error = %e,
                "transform aborted"
            ),
        }
        result
    }

    fn run_stages<T, S, F>(
        &self,
        source: &dyn TraceSource,
        transform: &mut T,
        make_sink: F,
    ) -> Result<(S, PipelineReport)>
    where
        T: Transform,
        S: RecordSink,
        F: FnOnce(TraceLayout, Metadata) -> Result<S>,
    {
        let total = source.readable_traces()?;
        let layout = stage("init", transform.init(source))?;
        let mut metadata = transform.derived_metadata(source);
        metadata.push("transform", transform.name());
        metadata.push("transform.config", transform.config().to_string());
        let mut sink = make_sink(layout, metadata)?;

        let transform = &*transform;
        let criterion = transform.criterion();
        let mut report = PipelineReport::default();
        let mut open: Option<T::Block> = None;
        let mut live = 0usize;

        for index in 0..total {
            let trace = source.trace(index)?;
            report.traces_seen += 1;
            if self.options.progress_interval > 0
                && report.traces_seen % self.options.progress_interval == 0
            {
                lifecycle!(
                    self.options.verbose,
                    seen = report.traces_seen,
                    total,
                    "transform progress"
                );
            }

            if !transform.interesting(&trace) {
                report.traces_skipped += 1;
                continue;
            }

            if criterion == Criterion::Singular {
                let mut block = open_block(transform, &trace, &mut live, &mut report)?;
                stage("accumulate", transform.accumulate(&trace, &mut block))?;
                close_block(transform, block, &mut sink, &mut live, &mut report)?;
                continue;
            }

            let mut block = match open.take() {
                Some(block) if transform.matches(&trace, &block) => block,
                Some(finished) => {
                    close_block(transform, finished, &mut sink, &mut live, &mut report)?;
                    open_block(transform, &trace, &mut live, &mut report)?
                }
                None => open_block(transform, &trace, &mut live, &mut report)?,
            };
            stage("accumulate", transform.accumulate(&trace, &mut block))?;
            open = Some(block);
        }

        if let Some(block) = open.take() {
            close_block(transform, block, &mut sink, &mut live, &mut report)?;
        }
        sink.finish()?;
        Ok((sink, report))
    }
}

/// Start a block seeded from `first` and count it as live.
fn open_block<T: Transform>(
    transform: &T,
    first: &Trace,
    live: &mut usize,
    report: &mut PipelineReport,
) -> Result<T::Block> {
    let block = stage("initialize_block", transform.initialize_block(first))?;
    *live += 1;
    report.max_open_blocks = report.max_open_blocks.max(*live);
    Ok(block)
}

fn close_block<T: Transform, S: RecordSink>(
    transform: &T,
    block: T::Block,
    sink: &mut S,
    live: &mut usize,
    report: &mut PipelineReport,
) -> Result<()> {
    let finalized = transform.finalize(block);
    *live = live.saturating_sub(1);
    let records = stage("finalize", finalized)?;
    for record in &records {
        sink.append(record)?;
        report.outputs += 1;
    }
    report.blocks += 1;
    Ok(())
}

/// Tag a transform callback failure with its stage.
fn stage<T>(name: &'static str, result: Result<T>) -> Result<T> {
    result.map_err(|e| match e {
        Error::Transform { .. } => e,
        other => Error::transform(name, other.to_string()),
    })
}
