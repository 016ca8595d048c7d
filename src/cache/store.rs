//! Cache Store Module
//!
//! Bounded key-value table with per-entry TTL expiry and oldest-insertion
//! eviction.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::cache::{CacheCounters, CacheEntry, CacheStats};

// == TTL Cache ==
/// In-memory cache bounded by entry count, with lazy TTL expiry.
///
/// Expired entries are removed when a lookup finds them or during the
/// full sweep that runs before every insert; there is no per-entry timer.
/// When the table is still at capacity after a sweep, the entry with the
/// oldest insertion time is evicted. Insertion time is never refreshed by
/// reads, so a hot entry ages like a cold one.
///
/// The sweep scans the whole table, which keeps inserts O(n) in the entry
/// count. Acceptable up to a few thousand entries; beyond that an indexed
/// expiry queue would be needed.
#[derive(Debug)]
pub struct TtlCache<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Access counters
    counters: CacheCounters,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// TTL applied when `set` is called without one
    default_ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    // == Constructor ==
    /// Creates an empty cache.
    ///
    /// # Arguments
    /// * `max_entries` - Capacity bound enforced on insert
    /// * `default_ttl` - TTL applied to entries stored without an explicit one
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            counters: CacheCounters::new(),
            max_entries,
            default_ttl,
        }
    }

    // == Set ==
    /// Stores a value under `key`, replacing any existing entry wholesale
    /// (value, insertion time, and TTL all reset).
    ///
    /// Runs a full expiry sweep first; if the table is still at capacity
    /// afterwards, the oldest-inserted entry is evicted to make room.
    /// A zero `ttl` falls back to the default rather than being rejected,
    /// so this operation cannot fail.
    pub fn set(&mut self, key: String, value: V, ttl: Option<Duration>) {
        self.sweep_expired();

        if self.entries.len() >= self.max_entries {
            self.evict_oldest();
        }

        let effective_ttl = match ttl {
            Some(t) if t > Duration::ZERO => t,
            _ => self.default_ttl,
        };

        debug!(key = %key, ttl_ms = effective_ttl.as_millis() as u64, "cache set");
        self.entries.insert(key, CacheEntry::new(value, effective_ttl));
    }

    // == Get ==
    /// Returns the value under `key` if present and fresh.
    ///
    /// A found-but-expired entry is deleted on the spot and reported as
    /// a miss; an expired entry is never returned even if no sweep has
    /// run since it lapsed.
    pub fn get(&mut self, key: &str) -> Option<V> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired() {
                self.entries.remove(key);
                self.counters.record_miss();
                debug!(key = %key, "cache expired");
                return None;
            }

            let value = entry.value.clone();
            self.counters.record_hit();
            debug!(key = %key, "cache hit");
            Some(value)
        } else {
            self.counters.record_miss();
            debug!(key = %key, "cache miss");
            None
        }
    }

    // == Has ==
    /// Presence check with the same freshness rules as `get`: a
    /// found-but-expired entry is deleted and reported absent.
    pub fn has(&mut self, key: &str) -> bool {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired() {
                self.entries.remove(key);
                return false;
            }
            true
        } else {
            false
        }
    }

    // == Delete ==
    /// Removes the entry under `key`; returns whether one was present.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            debug!(key = %key, "cache deleted");
        }
        removed
    }

    // == Clear ==
    /// Empties the table unconditionally.
    pub fn clear(&mut self) {
        self.entries.clear();
        info!("cache cleared");
    }

    // == Invalidate Pattern ==
    /// Deletes every entry whose key contains `pattern` as a substring
    /// and returns how many were removed.
    ///
    /// Intended for coarse write-path invalidation, e.g. dropping all
    /// cached route responses under a collection after an update.
    pub fn invalidate_pattern(&mut self, pattern: &str) -> usize {
        let matching: Vec<String> = self
            .entries
            .keys()
            .filter(|key| key.contains(pattern))
            .cloned()
            .collect();

        let count = matching.len();
        for key in matching {
            self.entries.remove(&key);
        }

        info!(count, pattern = %pattern, "invalidated cache entries");
        count
    }

    // == Length ==
    /// Raw entry count, including entries that are past their TTL but
    /// have not been swept yet.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Keys ==
    /// Snapshot of all stored keys, stale-but-unswept ones included.
    /// Order is unspecified.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    // == Stats ==
    /// Diagnostic snapshot: table size, how many entries are already past
    /// their TTL, and the mean entry age. Never mutates the table.
    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let mut expired_count = 0;
        let mut total_age = Duration::ZERO;

        for entry in self.entries.values() {
            if entry.is_expired_at(now) {
                expired_count += 1;
            }
            total_age += entry.age_at(now);
        }

        let average_age_ms = if self.entries.is_empty() {
            0
        } else {
            (total_age.as_millis() / self.entries.len() as u128) as u64
        };

        CacheStats {
            size: self.entries.len(),
            max_size: self.max_entries,
            expired_count,
            average_age_ms,
            hits: self.counters.hits,
            misses: self.counters.misses,
            evictions: self.counters.evictions,
            hit_rate: self.counters.hit_rate(),
        }
    }

    // == Sweep Expired ==
    /// Removes every entry whose TTL has elapsed; returns the count.
    fn sweep_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired.len();
        for key in expired {
            self.entries.remove(&key);
            debug!(key = %key, "cache expired");
        }

        count
    }

    // == Evict Oldest ==
    /// Removes the entry with the smallest insertion time. Ties are
    /// broken by iteration order.
    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.inserted_at)
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            self.entries.remove(&key);
            self.counters.record_eviction();
            debug!(key = %key, "cache evicted");
        }
    }

    // == Test Support ==
    /// Shifts an entry's insertion time into the past, so tests can age
    /// entries without sleeping.
    #[cfg(test)]
    pub(crate) fn backdate(&mut self, key: &str, by: Duration) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.inserted_at -= by;
                true
            }
            None => false,
        }
    }
}
