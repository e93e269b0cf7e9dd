//! Trace Set Integration Tests
//!
//! File-backed trace sets end to end: create, append, finalize, reopen,
//! read through the cache, and reject damaged files.

mod cache;
mod concurrency;

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracedb::prelude::*;

/// Temporary directory plus a file path inside it.
pub fn scratch(name: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(name);
    (dir, path)
}

/// Layout used by most tests: 4-byte title, 16+16+16 data, float samples.
pub fn aes_layout(samples: usize) -> TraceLayout {
    TraceLayout::new(samples, SampleType::Float32)
        .with_title(4)
        .with_data(16, 16, 16)
}

/// Data blob whose input, output and key fields are filled with
/// `seed`, `seed + 1` and `seed + 2`.
pub fn blob(seed: u8) -> Vec<u8> {
    let mut v = vec![seed; 16];
    v.extend(vec![seed.wrapping_add(1); 16]);
    v.extend(vec![seed.wrapping_add(2); 16]);
    v
}

/// Write a finalized set of `rows` with [`aes_layout`].
pub fn write_set(path: &Path, rows: &[Vec<f32>], metadata: Metadata) {
    let layout = aes_layout(rows.first().map_or(0, Vec::len));
    let mut set = TraceSet::create(path, layout, metadata, TraceSetOptions::default()).unwrap();
    for (i, row) in rows.iter().enumerate() {
        let record = TraceRecord::from_samples(row.clone())
            .with_title(format!("t{}", i))
            .with_data(blob(i as u8 * 3));
        assert_eq!(set.append_trace(&record).unwrap(), i);
    }
    set.finalize().unwrap();
    set.close().unwrap();
}
