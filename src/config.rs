//! Configuration Module
//!
//! Handles loading server and cache configuration from environment
//! variables.

use std::env;
use std::time::Duration;

/// Runtime configuration.
///
/// All values can be set via environment variables and fall back to
/// sensible defaults. Components receive these as constructor parameters;
/// nothing reads the environment after startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// TTL applied to entries stored without an explicit one
    pub default_ttl: Duration,
    /// TTL for cached route responses
    pub route_cache_ttl: Duration,
    /// HTTP server port
    pub server_port: u16,
    /// Queries slower than this are logged as slow
    pub slow_query_threshold: Duration,
    /// HTTP requests slower than this are logged as slow
    pub slow_request_threshold: Duration,
    /// Reported memory growth beyond this is logged
    pub high_memory_delta_bytes: u64,
    /// How long performance records are retained
    pub perf_retention: Duration,
    /// How often old performance records are trimmed
    pub perf_trim_interval: Duration,
}

impl Config {
    /// Creates a Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `DEFAULT_TTL_MS` - Default entry TTL in milliseconds (default: 300000)
    /// - `ROUTE_CACHE_TTL_MS` - Route response TTL in milliseconds (default: DEFAULT_TTL_MS)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SLOW_QUERY_MS` - Slow query threshold in milliseconds (default: 100)
    /// - `SLOW_REQUEST_MS` - Slow request threshold in milliseconds (default: 1000)
    /// - `HIGH_MEMORY_DELTA_BYTES` - High memory growth threshold (default: 52428800)
    /// - `PERF_RETENTION_SECS` - Performance record retention in seconds (default: 86400)
    /// - `PERF_TRIM_INTERVAL_SECS` - Trim frequency in seconds (default: 3600)
    pub fn from_env() -> Self {
        let default_ttl = Duration::from_millis(env_parse("DEFAULT_TTL_MS", 300_000));

        Self {
            max_entries: env_parse("MAX_ENTRIES", 1000),
            default_ttl,
            route_cache_ttl: env::var("ROUTE_CACHE_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(default_ttl),
            server_port: env_parse("SERVER_PORT", 3000),
            slow_query_threshold: Duration::from_millis(env_parse("SLOW_QUERY_MS", 100)),
            slow_request_threshold: Duration::from_millis(env_parse("SLOW_REQUEST_MS", 1000)),
            high_memory_delta_bytes: env_parse("HIGH_MEMORY_DELTA_BYTES", 50 * 1024 * 1024),
            perf_retention: Duration::from_secs(env_parse("PERF_RETENTION_SECS", 24 * 60 * 60)),
            perf_trim_interval: Duration::from_secs(env_parse("PERF_TRIM_INTERVAL_SECS", 60 * 60)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            default_ttl: Duration::from_secs(5 * 60),
            route_cache_ttl: Duration::from_secs(5 * 60),
            server_port: 3000,
            slow_query_threshold: Duration::from_millis(100),
            slow_request_threshold: Duration::from_millis(1000),
            high_memory_delta_bytes: 50 * 1024 * 1024,
            perf_retention: Duration::from_secs(24 * 60 * 60),
            perf_trim_interval: Duration::from_secs(60 * 60),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
