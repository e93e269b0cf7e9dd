//! Pattern Correlation Tests
//!
//! - Scaled traces correlate fully at every position
//! - Derived layout and provenance metadata
//! - Sliding extraction per trace

use crate::*;

#[test]
fn test_scaled_pair_correlates_to_one() {
    let (dir, path) = scratch("pair.trs");
    write_rows(
        &path,
        &[vec![1.0, 2.0, 3.0, 4.0], vec![2.0, 4.0, 6.0, 8.0]],
        None,
    );

    let out_path = dir.path().join("pair.corr.trs");
    let derived = DerivedTraceSet::materialize(
        open_parent(&path),
        PatternCorrelation::new(0),
        &out_path,
        TraceSetOptions::default(),
        PipelineOptions::default(),
    )
    .unwrap();

    assert_eq!(derived.num_traces(), 1);
    assert_eq!(derived.num_samples(), 4);
    assert_eq!(derived.layout().sample_type, SampleType::Float32);
    let t = derived.trace(0).unwrap();
    assert_all_close(t.samples().unwrap(), 1.0);
    assert_eq!(derived.report().traces_seen, 2);
    assert!(!derived.transform().has_pattern());
    drop(t);
    derived.close().unwrap();

    // The output file stands on its own.
    let reopened = TraceSet::open(&out_path, TraceSetOptions::default()).unwrap();
    assert_all_close(reopened.trace(0).unwrap().samples().unwrap(), 1.0);
    let meta = reopened.metadata();
    assert_eq!(
        meta.find("transform").and_then(|v| v.as_str()),
        Some("pattern_correlation")
    );
    let config: serde_json::Value =
        serde_json::from_str(meta.find("transform.config").and_then(|v| v.as_str()).unwrap())
            .unwrap();
    assert_eq!(config["reference"], 0);
}

#[test]
fn test_anticorrelated_position() {
    let mut src = MemoryTraceSet::new(TraceLayout::new(2, SampleType::Float32));
    for (a, b) in [(1.0, 9.0), (2.0, 8.0), (3.0, 7.0), (4.0, 6.0)] {
        src.push(TraceRecord::from_samples(vec![a, b])).unwrap();
    }
    let mut t = PatternCorrelation::new(0).with_window(0, 1);
    let (out, _): (Vec<TraceRecord>, _) = Pipeline::default()
        .run(&src, &mut t, |_, _| Ok(Vec::new()))
        .unwrap();
    assert_all_close(&out[0].samples[..1], 1.0);
    assert_all_close(&out[0].samples[1..], -1.0);
}

#[test]
fn test_extract_pattern_on_file() {
    let (dir, path) = scratch("extract.trs");
    write_rows(
        &path,
        &[
            vec![5.0, 1.0, 2.0, 3.0, 5.0, 5.0],
            vec![0.0, 0.0, 0.0, 2.0, 4.0, 6.0],
        ],
        Some(&[0x10, 0x20]),
    );

    let derived = DerivedTraceSet::materialize(
        open_parent(&path),
        ExtractPattern::new(0, 1, 4),
        dir.path().join("extract.out.trs"),
        TraceSetOptions::default(),
        PipelineOptions::default(),
    )
    .unwrap();

    assert_eq!(derived.num_traces(), 2);
    assert_eq!(derived.num_samples(), 4);
    let first = derived.trace(0).unwrap();
    assert!((first.samples().unwrap()[1] - 1.0).abs() < 1e-5);
    assert_eq!(first.input(), Some(&[0x10u8][..]));
    let second = derived.trace(1).unwrap();
    assert!((second.samples().unwrap()[3] - 1.0).abs() < 1e-5);
    assert_eq!(second.input(), Some(&[0x20u8][..]));
}
