//! Streaming Tests
//!
//! A single pass over a large source keeps one block open and block state
//! at a fixed size, however many traces flow through.

use crate::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracedb::{AccumulatorBank, Criterion, Trace, Transform};

const TRACES: usize = 12_000;
const SAMPLES: usize = 8;

/// Pattern correlation wrapper that records the largest bank it saw.
struct WidthRecorder {
    inner: PatternCorrelation,
    widest: AtomicUsize,
    fed: AtomicUsize,
}

impl Transform for WidthRecorder {
    type Block = AccumulatorBank;

    fn name(&self) -> &'static str {
        "width_recorder"
    }

    fn criterion(&self) -> Criterion {
        self.inner.criterion()
    }

    fn init(&mut self, source: &dyn TraceSource) -> Result<TraceLayout> {
        self.inner.init(source)
    }

    fn initialize_block(&self, first: &Trace) -> Result<AccumulatorBank> {
        self.inner.initialize_block(first)
    }

    fn accumulate(&self, trace: &Trace, block: &mut AccumulatorBank) -> Result<()> {
        self.inner.accumulate(trace, block)?;
        self.widest.fetch_max(block.len(), Ordering::Relaxed);
        self.fed.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn finalize(&self, block: AccumulatorBank) -> Result<Vec<TraceRecord>> {
        self.inner.finalize(block)
    }

    fn exit(&mut self) {
        self.inner.exit();
    }
}

fn synthetic_row(i: usize) -> Vec<f32> {
    let gain = 1.0 + (i % 97) as f32 / 10.0;
    (0..SAMPLES).map(|j| gain * (j + 1) as f32).collect()
}

#[test]
fn test_large_source_single_pass() {
    let (dir, path) = scratch("large.trs");
    let rows: Vec<Vec<f32>> = (0..TRACES).map(synthetic_row).collect();
    write_rows(&path, &rows, None);
    drop(rows);

    let parent = Arc::new(TraceSet::open(&path, TraceSetOptions::uncached()).unwrap());
    let mut recorder = WidthRecorder {
        inner: PatternCorrelation::new(0),
        widest: AtomicUsize::new(0),
        fed: AtomicUsize::new(0),
    };
    let out_path = dir.path().join("large.corr.trs");
    let (writer, report) = Pipeline::default()
        .run(parent.as_ref(), &mut recorder, |layout, metadata| {
            TraceSet::create(&out_path, layout, metadata, TraceSetOptions::default())
        })
        .unwrap();
    writer.close().unwrap();

    assert_eq!(report.traces_seen, TRACES);
    assert_eq!(report.blocks, 1);
    assert_eq!(report.outputs, 1);
    assert_eq!(report.max_open_blocks, 1);
    assert_eq!(recorder.fed.load(Ordering::Relaxed), TRACES);
    assert_eq!(recorder.widest.load(Ordering::Relaxed), SAMPLES);

    // Source traces were dropped as the scan moved on.
    assert!(parent.cache().len() <= 1);

    let out = TraceSet::open(&out_path, TraceSetOptions::default()).unwrap();
    assert_eq!(out.num_traces(), 1);
    assert_all_close(out.trace(0).unwrap().samples().unwrap(), 1.0);
}
