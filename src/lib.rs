//! Memocache - an in-memory TTL cache service
//!
//! Bounded key-value caching with per-entry TTL expiry, oldest-insertion
//! eviction, async memoization, route response caching, and slow-operation
//! instrumentation.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod perf;
pub mod tasks;

pub use api::AppState;
pub use cache::{cache_key, get_or_compute, warm_cache, SharedCache, TtlCache};
pub use config::Config;
pub use perf::PerfMonitor;
pub use tasks::spawn_trim_task;
