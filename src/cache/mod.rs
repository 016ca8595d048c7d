//! Cache Module
//!
//! Bounded in-memory caching with per-entry TTL expiry, oldest-insertion
//! eviction, async memoization, and batch warming.

use std::sync::Arc;

use tokio::sync::RwLock;

mod entry;
mod memo;
mod stats;
mod store;
mod warm;


// Re-export public types
pub use entry::CacheEntry;
pub use memo::{cache_key, get_or_compute};
pub use stats::{CacheCounters, CacheStats};
pub use store::TtlCache;
pub use warm::{warm_cache, WarmOutcome};

/// Cache handle shared across call sites.
///
/// Every consumer of one logical cache (route middleware, memoized
/// operations, invalidation, warming) holds a clone of the same handle,
/// and the write lock makes the store's sweep-then-evict-then-insert
/// sequence atomic under a multithreaded runtime.
pub type SharedCache<V> = Arc<RwLock<TtlCache<V>>>;

/// Creates a [`SharedCache`] ready to hand out to collaborators.
pub fn shared<V: Clone>(cache: TtlCache<V>) -> SharedCache<V> {
    Arc::new(RwLock::new(cache))
}

// == Public Constants ==
/// Maximum allowed key length in bytes, enforced at the API surface
pub const MAX_KEY_LENGTH: usize = 256;
