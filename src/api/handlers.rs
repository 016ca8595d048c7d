//! API Handlers
//!
//! HTTP request handlers for each cache service endpoint.

use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::{get_or_compute, shared, CacheStats, SharedCache, TtlCache};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{
    ClearResponse, DeleteResponse, EntryResponse, HealthResponse, InvalidateRequest,
    InvalidateResponse, SetEntryRequest, SetResponse,
};
use crate::perf::{self, PerfMonitor, PerfThresholds, SharedPerfMonitor};

/// Key under which the memoized performance summary is cached.
const PERF_SUMMARY_KEY: &str = "perf:summary";
/// The summary is recomputed at most this often.
const PERF_SUMMARY_TTL: Duration = Duration::from_secs(5);

/// Cached route responses for the entry endpoints carry this key prefix;
/// the write path invalidates them by it.
const ENTRY_ROUTE_PATTERN: &str = "route:/entries";

// == Application State ==
/// State shared across all handlers and middleware.
///
/// A single cache instance backs the key-value endpoints, the route
/// response middleware, and the memoized summary; every collaborator
/// holds the same handle.
#[derive(Clone)]
pub struct AppState {
    /// The one cache instance shared by every call site
    pub cache: SharedCache<Value>,
    /// Operation timing collector
    pub perf: SharedPerfMonitor,
    /// TTL for cached route responses
    pub route_cache_ttl: Duration,
}

impl AppState {
    /// Creates state around existing components.
    pub fn new(cache: TtlCache<Value>, monitor: PerfMonitor, route_cache_ttl: Duration) -> Self {
        Self {
            cache: shared(cache),
            perf: perf::shared(monitor),
            route_cache_ttl,
        }
    }

    /// Creates state with components built from configuration.
    pub fn from_config(config: &Config) -> Self {
        let cache = TtlCache::new(config.max_entries, config.default_ttl);
        let monitor = PerfMonitor::new(
            PerfThresholds {
                slow_query: config.slow_query_threshold,
                slow_request: config.slow_request_threshold,
                high_memory_delta_bytes: config.high_memory_delta_bytes,
            },
            config.perf_retention,
        );
        Self::new(cache, monitor, config.route_cache_ttl)
    }
}

/// Handler for PUT /entries
///
/// Stores a JSON value with optional TTL, then invalidates cached route
/// responses for the entry endpoints so readers observe the write.
pub async fn set_entry_handler(
    State(state): State<AppState>,
    Json(req): Json<SetEntryRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl_ms.map(Duration::from_millis);

    let mut cache = state.cache.write().await;
    cache.set(req.key.clone(), req.value, ttl);
    cache.invalidate_pattern(ENTRY_ROUTE_PATTERN);

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /entries/:key
///
/// Retrieves a value from the cache by key. Sits behind the route
/// response cache, so repeated reads of the same URL are served without
/// reaching this handler until the cached response expires or a write
/// invalidates it.
pub async fn get_entry_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<EntryResponse>> {
    // Write lock: a lookup may delete an expired entry and bumps counters
    let mut cache = state.cache.write().await;
    match cache.get(&key) {
        Some(value) => Ok(Json(EntryResponse::new(key, value))),
        None => Err(ApiError::NotFound(key)),
    }
}

/// Handler for DELETE /entries/:key
pub async fn delete_entry_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let mut cache = state.cache.write().await;
    if !cache.delete(&key) {
        return Err(ApiError::NotFound(key));
    }
    cache.invalidate_pattern(ENTRY_ROUTE_PATTERN);

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /entries
///
/// Empties the cache, route responses included.
pub async fn clear_entries_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.cache.write().await.clear();
    Json(ClearResponse::new())
}

/// Handler for POST /invalidate
///
/// Deletes every entry whose key contains the given substring and
/// reports how many were removed.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let removed = state.cache.write().await.invalidate_pattern(&req.pattern);

    Ok(Json(InvalidateResponse::new(req.pattern, removed)))
}

/// Handler for GET /stats
///
/// Returns the cache's diagnostic snapshot and access counters.
pub async fn stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    let stats = state.cache.read().await.stats();
    Json(stats)
}

/// Handler for GET /perf
///
/// Returns the performance summary for the trailing hour, memoized for a
/// few seconds so a dashboard polling this endpoint does not recompute
/// the aggregation on every request.
pub async fn perf_handler(State(state): State<AppState>) -> Result<Json<Value>> {
    let perf = state.perf.clone();
    let summary = get_or_compute(
        &state.cache,
        PERF_SUMMARY_KEY,
        Some(PERF_SUMMARY_TTL),
        || async move {
            let summary = perf.read().await.summary();
            serde_json::to_value(summary).map_err(anyhow::Error::from)
        },
    )
    .await
    .map_err(|err| ApiError::Internal(err.to_string()))?;

    Ok(Json(summary))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_state() -> AppState {
        AppState::from_config(&Config::default())
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = test_state();

        let req = SetEntryRequest {
            key: "test_key".to_string(),
            value: json!({"n": 1}),
            ttl_ms: None,
        };
        let result = set_entry_handler(State(state.clone()), Json(req)).await;
        assert!(result.is_ok());

        let result = get_entry_handler(State(state.clone()), Path("test_key".to_string())).await;
        let response = result.unwrap();
        assert_eq!(response.value, json!({"n": 1}));
    }

    #[tokio::test]
    async fn test_get_absent_key() {
        let state = test_state();

        let result = get_entry_handler(State(state), Path("nonexistent".to_string())).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_set_empty_key_rejected() {
        let state = test_state();

        let req = SetEntryRequest {
            key: String::new(),
            value: json!(1),
            ttl_ms: None,
        };
        let result = set_entry_handler(State(state), Json(req)).await;
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_delete_handler() {
        let state = test_state();

        let req = SetEntryRequest {
            key: "to_delete".to_string(),
            value: json!("v"),
            ttl_ms: None,
        };
        set_entry_handler(State(state.clone()), Json(req))
            .await
            .unwrap();

        let result =
            delete_entry_handler(State(state.clone()), Path("to_delete".to_string())).await;
        assert!(result.is_ok());

        let result = get_entry_handler(State(state), Path("to_delete".to_string())).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_absent_key() {
        let state = test_state();

        let result = delete_entry_handler(State(state), Path("nonexistent".to_string())).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_clear_handler() {
        let state = test_state();

        state
            .cache
            .write()
            .await
            .set("a".to_string(), json!(1), None);
        clear_entries_handler(State(state.clone())).await;

        assert!(state.cache.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_write_invalidates_cached_routes() {
        let state = test_state();

        // Simulate a cached route response for the read surface
        state.cache.write().await.set(
            "route:/entries/product_1".to_string(),
            json!({"key": "product_1", "value": 1}),
            None,
        );

        let req = SetEntryRequest {
            key: "product_1".to_string(),
            value: json!(2),
            ttl_ms: None,
        };
        set_entry_handler(State(state.clone()), Json(req))
            .await
            .unwrap();

        assert!(!state
            .cache
            .write()
            .await
            .has("route:/entries/product_1"));
    }

    #[tokio::test]
    async fn test_invalidate_handler() {
        let state = test_state();

        {
            let mut cache = state.cache.write().await;
            cache.set("user:1".to_string(), json!(1), None);
            cache.set("user:2".to_string(), json!(2), None);
            cache.set("order:1".to_string(), json!(3), None);
        }

        let req = InvalidateRequest {
            pattern: "user:".to_string(),
        };
        let response = invalidate_handler(State(state.clone()), Json(req))
            .await
            .unwrap();

        assert_eq!(response.removed, 2);
        assert_eq!(state.cache.read().await.keys(), vec!["order:1".to_string()]);
    }

    #[tokio::test]
    async fn test_invalidate_empty_pattern_rejected() {
        let state = test_state();

        let req = InvalidateRequest {
            pattern: String::new(),
        };
        let result = invalidate_handler(State(state), Json(req)).await;
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = test_state();

        let response = stats_handler(State(state)).await;
        assert_eq!(response.hits, 0);
        assert_eq!(response.misses, 0);
        assert_eq!(response.max_size, 1000);
    }

    #[tokio::test]
    async fn test_perf_handler_summary_is_memoized() {
        let state = test_state();

        state
            .perf
            .write()
            .await
            .record_query("initial", Duration::from_millis(10));

        let first = perf_handler(State(state.clone())).await.unwrap();
        assert_eq!(first.0["total_operations"], 1);

        // New records do not show up until the memoized summary expires
        state
            .perf
            .write()
            .await
            .record_query("later", Duration::from_millis(10));
        let second = perf_handler(State(state.clone())).await.unwrap();
        assert_eq!(second.0["total_operations"], 1);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
