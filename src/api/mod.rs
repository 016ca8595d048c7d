//! API Module
//!
//! HTTP handlers, middleware, and routing for the cache service REST API.
//!
//! # Endpoints
//! - `PUT /entries` - Store a JSON value under a key
//! - `GET /entries/:key` - Retrieve a value (served through the route cache)
//! - `DELETE /entries/:key` - Delete a key
//! - `DELETE /entries` - Clear the cache
//! - `POST /invalidate` - Remove entries whose keys contain a substring
//! - `GET /stats` - Cache statistics snapshot
//! - `GET /perf` - Performance summary
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::AppState;
pub use middleware::{cache_layer, perf_layer};
pub use routes::create_router;
