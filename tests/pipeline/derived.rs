//! Derived Trace Set Tests
//!
//! - Averages over files, whole-set and grouped by input
//! - Chaining derived sets
//! - In-memory sources as ingestion boundary

use crate::*;

#[test]
fn test_average_grouped_by_input() {
    let (dir, path) = scratch("groups.trs");
    write_rows(
        &path,
        &[vec![1.0, 0.0], vec![3.0, 2.0], vec![10.0, 10.0], vec![20.0, 30.0]],
        Some(&[1, 1, 2, 2]),
    );

    let derived = DerivedTraceSet::materialize(
        open_parent(&path),
        Average::grouped_by_input(),
        dir.path().join("groups.avg.trs"),
        TraceSetOptions::default(),
        PipelineOptions::default(),
    )
    .unwrap();

    assert_eq!(derived.num_traces(), 2);
    assert_eq!(derived.report().blocks, 2);
    let a = derived.trace(0).unwrap();
    assert_eq!(a.samples(), Some(&[2.0f32, 1.0][..]));
    assert_eq!(a.input(), Some(&[1u8][..]));
    let b = derived.trace(1).unwrap();
    assert_eq!(b.samples(), Some(&[15.0f32, 20.0][..]));
    assert_eq!(b.input(), Some(&[2u8][..]));
}

#[test]
fn test_chained_derived_sets() {
    let (dir, path) = scratch("chain.trs");
    write_rows(
        &path,
        &[vec![1.0, 2.0, 3.0], vec![2.0, 4.0, 6.0], vec![3.0, 6.0, 9.0]],
        None,
    );

    let corr = DerivedTraceSet::materialize(
        open_parent(&path),
        PatternCorrelation::new(0),
        dir.path().join("chain.corr.trs"),
        TraceSetOptions::default(),
        PipelineOptions::default(),
    )
    .unwrap();
    let avg = DerivedTraceSet::materialize(
        Arc::new(corr),
        Average::new(),
        dir.path().join("chain.avg.trs"),
        TraceSetOptions::default(),
        PipelineOptions::default(),
    )
    .unwrap();

    assert_eq!(avg.parent().num_traces(), 1);
    assert_eq!(avg.num_traces(), 1);
    assert_all_close(avg.trace(0).unwrap().samples().unwrap(), 1.0);
    assert_eq!(
        avg.metadata().find("transform").and_then(|v| v.as_str()),
        Some("average")
    );
}

#[test]
fn test_memory_source_materializes_to_file() {
    let layout = TraceLayout::new(3, SampleType::Float32).with_title(8);
    let mut src = MemoryTraceSet::new(layout)
        .with_metadata(Metadata::new().with("origin", "adapter"));
    for i in 0..4 {
        src.push(TraceRecord::from_samples(vec![i as f32, 1.0, -(i as f32)]).with_title("scope"))
            .unwrap();
    }
    assert_eq!(src.trace(0).unwrap().title(), Some("scope"));

    let (_dir, path) = scratch("memory.avg.trs");
    let avg = DerivedTraceSet::materialize(
        Arc::new(src),
        Average::new(),
        &path,
        TraceSetOptions::default(),
        PipelineOptions::verbose(2),
    )
    .unwrap();
    assert_eq!(avg.trace(0).unwrap().samples(), Some(&[1.5f32, 1.0, -1.5][..]));
    assert_eq!(avg.store().path(), path.as_path());
    avg.close().unwrap();
}
