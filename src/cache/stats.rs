//! Group Statistics Module
//!
//! Per-group performance counters, updated from concurrent request paths.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Stat Counters ==
/// Live counters shared by the hot path, the eviction hook and the
/// background tasks.
#[derive(Debug, Default)]
pub struct StatCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    loads: AtomicU64,
    load_failures: AtomicU64,
    evictions: AtomicU64,
}

impl StatCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_load(&self) {
        self.loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_load_failure(&self) {
        self.load_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Point-in-time view of the counters plus store occupancy.
    pub fn snapshot(&self, entries: usize, used_bytes: u64) -> GroupStats {
        GroupStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            load_failures: self.load_failures.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entries,
            used_bytes,
        }
    }
}

// == Group Stats ==
/// Frozen counter values for one group.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupStats {
    /// Successful store retrievals
    pub hits: u64,
    /// Retrievals that fell through to the load path
    pub misses: u64,
    /// Loader executions that succeeded
    pub loads: u64,
    /// Loader executions that failed
    pub load_failures: u64,
    /// Entries evicted to satisfy the byte budget
    pub evictions: u64,
    /// Current number of entries
    pub entries: usize,
    /// Bytes currently held
    pub used_bytes: u64,
}

impl GroupStats {
    // == Hit Rate ==
    /// hits / (hits + misses), or 0.0 before any traffic.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
