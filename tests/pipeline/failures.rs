//! Pipeline Failure Tests
//!
//! - A failing stage aborts the run and still calls exit
//! - The partially written output stays pending and is refused on open
//! - Sources missing what a transform needs fail in init

use crate::*;
use tracedb::{AccumulatorBank, Criterion, Trace, Transform};

/// Copies traces through one at a time, failing on `poison`.
struct FailAt {
    poison: usize,
    exited: bool,
}

impl Transform for FailAt {
    type Block = AccumulatorBank;

    fn name(&self) -> &'static str {
        "fail_at"
    }

    fn criterion(&self) -> Criterion {
        Criterion::Singular
    }

    fn init(&mut self, source: &dyn TraceSource) -> Result<TraceLayout> {
        Ok(TraceLayout::new(source.num_samples(), SampleType::Float32))
    }

    fn initialize_block(&self, first: &Trace) -> Result<AccumulatorBank> {
        Ok(AccumulatorBank::new(first.samples().map_or(0, <[f32]>::len)))
    }

    fn accumulate(&self, trace: &Trace, block: &mut AccumulatorBank) -> Result<()> {
        if trace.index() == self.poison {
            return Err(Error::Validation(format!("trace {} rejected", trace.index())));
        }
        for (k, &s) in trace.samples().unwrap_or(&[]).iter().enumerate() {
            block.accumulate_pair(k, s as f64, 0.0);
        }
        Ok(())
    }

    fn finalize(&self, block: AccumulatorBank) -> Result<Vec<TraceRecord>> {
        Ok(vec![TraceRecord::from_samples(block.mean_x())])
    }

    fn exit(&mut self) {
        self.exited = true;
    }
}

#[test]
fn test_failed_run_leaves_pending_output() {
    let (dir, path) = scratch("source.trs");
    let rows: Vec<Vec<f32>> = (0..10).map(|i| vec![i as f32; 2]).collect();
    write_rows(&path, &rows, None);

    let parent = open_parent(&path);
    let out_path = dir.path().join("failed.trs");

    // Run the pipeline directly so the transform can be inspected after.
    let mut transform = FailAt {
        poison: 6,
        exited: false,
    };
    let err = Pipeline::default()
        .run(parent.as_ref(), &mut transform, |layout, metadata| {
            TraceSet::create(&out_path, layout, metadata, TraceSetOptions::default())
        })
        .unwrap_err();
    assert!(matches!(err, Error::Transform { stage: "accumulate", .. }));
    assert!(transform.exited);

    let err = TraceSet::open(&out_path, TraceSetOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Pending { .. }), "got {:?}", err);
}

#[test]
fn test_failed_materialize_returns_error() {
    let (dir, path) = scratch("source.trs");
    write_rows(&path, &[vec![1.0], vec![2.0]], None);

    let out_path = dir.path().join("failed.trs");
    let result = DerivedTraceSet::materialize(
        open_parent(&path),
        FailAt {
            poison: 1,
            exited: false,
        },
        &out_path,
        TraceSetOptions::default(),
        PipelineOptions::default(),
    );
    assert!(result.err().unwrap().is_transform());
    assert!(TraceSet::open(&out_path, TraceSetOptions::default())
        .unwrap_err()
        .is_format());
}

#[test]
fn test_reference_out_of_range_fails_init() {
    let (dir, path) = scratch("short.trs");
    write_rows(&path, &[vec![1.0, 2.0]], None);

    let out_path = dir.path().join("never.trs");
    let err = DerivedTraceSet::materialize(
        open_parent(&path),
        PatternCorrelation::new(5),
        &out_path,
        TraceSetOptions::default(),
        PipelineOptions::default(),
    )
    .err()
    .unwrap();
    assert!(matches!(err, Error::Transform { stage: "init", .. }));
    assert!(!out_path.exists());
}

#[test]
fn test_grouping_without_input_fails_init() {
    let (dir, path) = scratch("noinput.trs");
    write_rows(&path, &[vec![1.0]], None);
    let err = DerivedTraceSet::materialize(
        open_parent(&path),
        Average::grouped_by_input(),
        dir.path().join("never.trs"),
        TraceSetOptions::default(),
        PipelineOptions::default(),
    )
    .err()
    .unwrap();
    assert!(err.is_transform());
}

#[test]
fn test_unfinalized_writer_is_not_a_source() {
    let (dir, path) = scratch("writer.trs");
    let mut writer = TraceSet::create(
        &path,
        TraceLayout::new(2, SampleType::Float32),
        Metadata::new(),
        TraceSetOptions::default(),
    )
    .unwrap();
    for i in 0..5 {
        writer
            .append_trace(&TraceRecord::from_samples(vec![i as f32, 0.0]))
            .unwrap();
    }
    assert!(matches!(writer.readable_traces(), Err(Error::InvalidState(_))));

    let out_path = dir.path().join("writer.avg.trs");
    let err = Pipeline::default()
        .run(&writer, &mut Average::new(), |layout, metadata| {
            TraceSet::create(&out_path, layout, metadata, TraceSetOptions::default())
        })
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)), "got {:?}", err);
    assert!(!out_path.exists());

    writer.finalize().unwrap();
    let (avg, report) = Pipeline::default()
        .run(&writer, &mut Average::new(), |_, _| Ok(Vec::<TraceRecord>::new()))
        .unwrap();
    assert_eq!(report.traces_seen, 5);
    assert_eq!(avg[0].samples, vec![2.0, 0.0]);
}
