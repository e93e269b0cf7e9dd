//! Reference-counted trace cache
//!
//! One cache sits in front of one trace set and maps trace index to a
//! shared [`TraceHandle`]. The reference count of an entry is the number
//! of handles held outside the cache; dropping a handle releases it.
//!
//! # Invariants
//!
//! - At most one physical `Trace` per index lives in the cache. When two
//!   concurrent misses both decode the same record, the first `store` wins
//!   and the loser's value is discarded in favour of the winner's handle.
//! - Entries whose count reaches zero stay resident until a free pass
//!   runs. `store` runs one when the cache grows past its capacity;
//!   callers may run one explicitly with [`TraceCache::free_unreferenced`].

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracedb_core::{Result, Trace, TraceHandle};
use tracing::warn;

/// Counters describing cache behaviour since creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that had to go to the store
    pub misses: u64,
    /// Entries dropped by free passes
    pub evictions: u64,
    /// Entries currently resident
    pub resident: usize,
}

/// Index-keyed cache of shared trace handles.
#[derive(Debug)]
pub struct TraceCache {
    entries: Mutex<FxHashMap<usize, TraceHandle>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl TraceCache {
    /// Create a cache that starts a free pass once it holds more than
    /// `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(FxHashMap::default()),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Capacity threshold for cooperative eviction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Return a new handle to the cached trace at `index`, if resident.
    pub fn lookup(&self, index: usize) -> Option<TraceHandle> {
        let found = self.entries.lock().get(&index).cloned();
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    /// Insert a freshly decoded trace and return a handle to the resident
    /// value for `index`.
    ///
    /// If another caller stored `index` first, `trace` is discarded and the
    /// existing entry's handle is returned instead.
    pub fn store(&self, index: usize, trace: Trace) -> TraceHandle {
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(&index) {
            return Arc::clone(existing);
        }
        let handle = Arc::new(trace);
        entries.insert(index, Arc::clone(&handle));
        if entries.len() > self.capacity {
            let evicted = evict_unreferenced(&mut entries);
            self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
        }
        handle
    }

    /// Look up `index`, decoding it with `load` on a miss.
    ///
    /// `load` runs without the cache lock held, so concurrent misses on the
    /// same index may both decode; `store` keeps exactly one result.
    pub fn get_or_load(
        &self,
        index: usize,
        load: impl FnOnce() -> Result<Trace>,
    ) -> Result<TraceHandle> {
        if let Some(handle) = self.lookup(index) {
            return Ok(handle);
        }
        let trace = load()?;
        Ok(self.store(index, trace))
    }

    /// Give back a handle. Equivalent to dropping it; an entry whose last
    /// outside handle goes away becomes eligible for the next free pass.
    pub fn release(&self, handle: TraceHandle) {
        drop(handle);
    }

    /// Number of handles held outside the cache for `index`.
    pub fn ref_count(&self, index: usize) -> Option<usize> {
        self.entries
            .lock()
            .get(&index)
            .map(|h| Arc::strong_count(h) - 1)
    }

    /// Drop every entry that no caller references. Returns how many went.
    pub fn free_unreferenced(&self) -> usize {
        let evicted = evict_unreferenced(&mut self.entries.lock());
        self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
        evicted
    }

    /// Drop every entry regardless of outstanding references.
    ///
    /// Only the owning trace set's close path calls this. Outstanding
    /// handles keep their traces alive but are no longer tracked; the
    /// number of such entries is returned and logged.
    pub fn free_all(&self) -> usize {
        let mut entries = self.entries.lock();
        let outstanding = entries
            .values()
            .filter(|h| Arc::strong_count(h) > 1)
            .count();
        if outstanding > 0 {
            warn!(
                outstanding,
                "freeing trace cache while handles are still held"
            );
        }
        self.evictions
            .fetch_add(entries.len() as u64, Ordering::Relaxed);
        entries.clear();
        outstanding
    }

    /// Whether `index` is resident.
    pub fn contains(&self, index: usize) -> bool {
        self.entries.lock().contains_key(&index)
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if no entries are resident.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            resident: self.len(),
        }
    }
}

fn evict_unreferenced(entries: &mut FxHashMap<usize, TraceHandle>) -> usize {
    let before = entries.len();
    // Holding the map lock means nobody can clone an entry whose only
    // reference is the map's own.
    entries.retain(|_, h| Arc::strong_count(h) > 1);
    before - entries.len()
}
