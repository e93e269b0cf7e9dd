//! Trace Cache Tests
//!
//! - Shared handles for repeated reads
//! - Reference counts follow outstanding handles
//! - Cooperative eviction past capacity

use crate::*;
use std::sync::Arc;

fn rows(n: usize) -> Vec<Vec<f32>> {
    (0..n).map(|i| vec![i as f32; 3]).collect()
}

#[test]
fn test_repeated_reads_share_one_trace() {
    let (_dir, path) = scratch("shared.trs");
    write_set(&path, &rows(4), Metadata::new());
    let set = TraceSet::open(&path, TraceSetOptions::default()).unwrap();

    let a = set.trace(2).unwrap();
    let b = set.trace(2).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(set.cache().ref_count(2), Some(2));

    let stats = set.cache_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.resident, 1);

    set.cache().release(a);
    assert_eq!(set.cache().ref_count(2), Some(1));
    drop(b);
    assert_eq!(set.cache().ref_count(2), Some(0));
    assert!(set.cache().contains(2));
}

#[test]
fn test_referenced_entries_survive_free_pass() {
    let (_dir, path) = scratch("pinned.trs");
    write_set(&path, &rows(5), Metadata::new());
    let set = TraceSet::open(&path, TraceSetOptions::default()).unwrap();

    let held = set.trace(0).unwrap();
    for i in 1..5 {
        set.trace(i).unwrap();
    }
    assert_eq!(set.cache().len(), 5);
    assert_eq!(set.cache().free_unreferenced(), 4);
    assert!(set.cache().contains(0));
    assert_eq!(held.samples(), Some(&[0.0f32; 3][..]));
}

#[test]
fn test_capacity_triggers_eviction() {
    let (_dir, path) = scratch("capacity.trs");
    write_set(&path, &rows(20), Metadata::new());
    let set = TraceSet::open(&path, TraceSetOptions::default().with_cache_capacity(4)).unwrap();

    for i in 0..20 {
        let t = set.trace(i).unwrap();
        assert_eq!(t.samples().unwrap()[0], i as f32);
        assert!(set.cache().len() <= 5);
    }
    assert!(set.cache_stats().evictions > 0);

    // Evicted traces decode again on demand with identical content.
    let again = set.trace(0).unwrap();
    assert_eq!(again.title(), Some("t0"));
}

#[test]
fn test_close_with_outstanding_handles() {
    let (_dir, path) = scratch("outstanding.trs");
    write_set(&path, &rows(2), Metadata::new());
    let set = TraceSet::open(&path, TraceSetOptions::default()).unwrap();
    let held = set.trace(1).unwrap();
    set.close().unwrap();
    assert_eq!(held.samples(), Some(&[1.0f32; 3][..]));
}
