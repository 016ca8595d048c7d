//! API Routes
//!
//! Configures the Axum router with all cache service endpoints and
//! middleware layers.

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_entries_handler, delete_entry_handler, get_entry_handler, health_handler,
    invalidate_handler, perf_handler, set_entry_handler, stats_handler, AppState,
};
use super::middleware::{cache_layer, perf_layer};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /entries` - Store a JSON value under a key
/// - `GET /entries/:key` - Retrieve a value (served through the route cache)
/// - `DELETE /entries/:key` - Delete a key
/// - `DELETE /entries` - Clear the cache
/// - `POST /invalidate` - Remove entries whose keys contain a substring
/// - `GET /stats` - Cache statistics snapshot
/// - `GET /perf` - Performance summary for the trailing hour
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - Route cache: layered over the entry endpoints only; it ignores
///   non-GET requests, so the write routes pass through it untouched
/// - Request timing: feeds the performance monitor for every request
/// - CORS: allows any origin (tighten for production)
/// - Tracing: logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let entry_routes = Router::new()
        .route("/entries", put(set_entry_handler).delete(clear_entries_handler))
        .route(
            "/entries/:key",
            get(get_entry_handler).delete(delete_entry_handler),
        )
        .route_layer(from_fn_with_state(state.clone(), cache_layer));

    Router::new()
        .merge(entry_routes)
        .route("/invalidate", post(invalidate_handler))
        .route("/stats", get(stats_handler))
        .route("/perf", get(perf_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(from_fn_with_state(state.clone(), perf_layer))
        .with_state(state)
}
