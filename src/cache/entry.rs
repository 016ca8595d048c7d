//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL metadata.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A single cache entry: the stored value plus the metadata needed to
/// decide expiry and eviction order.
///
/// `inserted_at` is recorded once at insertion and never updated on read,
/// so eviction order is insertion order, not access order.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// When the entry was inserted (monotonic clock)
    pub inserted_at: Instant,
    /// How long after insertion the entry stays readable
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry stamped with the current instant.
    pub fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
            ttl,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry's TTL has elapsed.
    ///
    /// An entry is expired once strictly more than `ttl` has passed since
    /// insertion; at exactly `ttl` it is still readable.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Expiry check against an explicit instant, so that a full-table scan
    /// can use a single consistent `now`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.age_at(now) > self.ttl
    }

    // == Age ==
    /// Time elapsed since insertion, as seen from `now`.
    pub fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.inserted_at)
    }
}
