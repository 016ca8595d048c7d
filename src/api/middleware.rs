//! API Middleware
//!
//! Route response caching for read requests, and request timing for the
//! performance monitor.

use std::time::Instant;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::debug;

use crate::api::AppState;
use crate::error::ApiError;

// == Route Response Cache ==
/// Serves cached JSON bodies for repeated GET requests.
///
/// The cache key is the request's full URL, path and query string
/// verbatim. No query normalization is applied, so `?a=1&b=2` and
/// `?b=2&a=1` occupy distinct entries.
///
/// Non-GET requests pass through untouched. On a hit the cached body is
/// written directly and the downstream handler never runs. On a miss the
/// downstream response is buffered, stored when it is a successful JSON
/// body, and forwarded unchanged. Handlers need no cooperation, and
/// failed responses are never cached.
pub async fn cache_layer(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if req.method() != Method::GET {
        return next.run(req).await;
    }

    let key = format!("route:{}", req.uri());

    if let Some(cached) = state.cache.write().await.get(&key) {
        return Json(cached).into_response();
    }

    let response = next.run(req).await;
    if !response.status().is_success() {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            return ApiError::Internal(format!("Failed to buffer response body: {}", err))
                .into_response();
        }
    };

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(value) => {
            state
                .cache
                .write()
                .await
                .set(key, value, Some(state.route_cache_ttl));
        }
        Err(_) => {
            // Not a JSON body; forward it uncached
            debug!(key = %key, "response body is not JSON, skipping route cache");
        }
    }

    Response::from_parts(parts, Body::from(bytes))
}

// == Request Timing ==
/// Times every request and feeds the performance monitor.
///
/// Memory deltas are left unset; the monitor accepts them from call
/// sites that can measure heap growth, which this layer does not.
pub async fn perf_layer(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    state.perf.write().await.record_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed(),
        None,
    );

    response
}
