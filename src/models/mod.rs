//! Request and Response models for the cache service API
//!
//! DTOs for serializing and deserializing HTTP request and response
//! bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{InvalidateRequest, SetEntryRequest};
pub use responses::{
    ClearResponse, DeleteResponse, EntryResponse, HealthResponse, InvalidateResponse, SetResponse,
};
