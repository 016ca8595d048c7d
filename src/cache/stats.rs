//! Cache Statistics Module
//!
//! Tracks hit/miss/eviction counters and builds diagnostic snapshots.

use serde::Serialize;

// == Cache Counters ==
/// Cumulative access counters, updated by the store as it serves reads
/// and evicts entries.
#[derive(Debug, Clone, Default)]
pub struct CacheCounters {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key absent or expired)
    pub misses: u64,
    /// Number of entries evicted to satisfy the capacity bound
    pub evictions: u64,
}

impl CacheCounters {
    /// Creates counters with everything at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Hit rate as hits / (hits + misses), or 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Cache Stats ==
/// A point-in-time diagnostic snapshot of the cache table.
///
/// `expired_count` counts entries that are past their TTL but not yet
/// swept; `size` includes them. Building a snapshot never mutates the
/// table.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Raw entry count, stale-but-unswept entries included
    pub size: usize,
    /// Capacity bound the store enforces on insert
    pub max_size: usize,
    /// Entries currently past their TTL (left in place)
    pub expired_count: usize,
    /// Mean time since insertion across all entries, in milliseconds
    pub average_age_ms: u64,
    /// Cumulative hit count
    pub hits: u64,
    /// Cumulative miss count
    pub misses: u64,
    /// Cumulative eviction count
    pub evictions: u64,
    /// hits / (hits + misses)
    pub hit_rate: f64,
}
