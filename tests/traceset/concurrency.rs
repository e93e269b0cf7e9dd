//! Trace Set Concurrency Tests
//!
//! Tests for thread safety:
//! - Concurrent reads of the same index converge on one trace
//! - Concurrent reads across the whole set return correct content

use crate::*;
use std::sync::{Arc, Barrier};
use std::thread;

/// Test concurrent reads of a single index
#[test]
fn test_concurrent_reads_same_index() {
    let (_dir, path) = scratch("same.trs");
    write_set(&path, &[vec![1.0, 2.0], vec![3.0, 4.0]], Metadata::new());
    let set = Arc::new(TraceSet::open(&path, TraceSetOptions::default()).unwrap());

    const NUM_THREADS: usize = 8;
    let barrier = Arc::new(Barrier::new(NUM_THREADS));
    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|_| {
            let set = Arc::clone(&set);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                set.trace(1).unwrap()
            })
        })
        .collect();

    let traces: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let resident = set.trace(1).unwrap();
    for t in &traces {
        assert!(Arc::ptr_eq(t, &resident));
    }
    assert_eq!(set.cache().ref_count(1), Some(NUM_THREADS + 1));
    assert_eq!(set.cache().len(), 1);
}

/// Test concurrent reads over every index
#[test]
fn test_concurrent_reads_all_indices() {
    let (_dir, path) = scratch("all.trs");
    let rows: Vec<Vec<f32>> = (0..64).map(|i| vec![i as f32, 2.0 * i as f32]).collect();
    write_set(&path, &rows, Metadata::new());
    let set = Arc::new(
        TraceSet::open(&path, TraceSetOptions::default().with_cache_capacity(8)).unwrap(),
    );

    const NUM_READERS: usize = 6;
    let barrier = Arc::new(Barrier::new(NUM_READERS));
    let handles: Vec<_> = (0..NUM_READERS)
        .map(|r| {
            let set = Arc::clone(&set);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for k in 0..64 {
                    let i = (k * 7 + r * 11) % 64;
                    let t = set.trace(i).unwrap();
                    assert_eq!(t.index(), i);
                    assert_eq!(t.samples(), Some(&[i as f32, 2.0 * i as f32][..]));
                    assert_eq!(t.title(), Some(format!("t{}", i).as_str()));
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
    let stats = set.cache_stats();
    assert_eq!(stats.hits + stats.misses, (NUM_READERS * 64) as u64);
}
