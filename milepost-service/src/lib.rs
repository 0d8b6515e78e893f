//! Milepost Service Library
//!
//! HTTP handlers and types for the road-mileage geocoding service.
//! This library is used by both the milepost-service binary and
//! integration tests.

pub mod handlers;

use milepost::MemoryStore;

/// Application state shared across handlers.
pub struct AppState {
    /// Loaded milestone store for position queries.
    pub store: MemoryStore,
}

// Re-export commonly used types for convenience
pub use handlers::{
    ErrorResponse, GeocodeParams, GeocodeResponse, HealthResponse, MilestoneEcho, StatsResponse,
};
