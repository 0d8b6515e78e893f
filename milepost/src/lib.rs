//! # Milepost — road-mileage geocoding
//!
//! Answers "where on the map is road R at distance D" for Taiwan's
//! numbered provincial highways. Positions are written in chainage
//! notation (`台27線45K+200`); the library parses the descriptor, finds
//! the two surveyed milestones that bracket the mileage, and linearly
//! interpolates their coordinates.
//!
//! ## Quick Start
//!
//! ```ignore
//! use milepost::{descriptor, resolver, MemoryStore};
//!
//! let store = MemoryStore::from_csv_path("milestones.csv")?;
//! let query = descriptor::parse("台1線1K")?;
//! let position = resolver::resolve(&store, &query).await?;
//! println!("{}, {}", position.latitude, position.longitude);
//! ```
//!
//! ## How a query resolves
//!
//! 1. [`descriptor::parse`] turns the free-text descriptor into a
//!    canonical `(road, mileage-in-meters)` query.
//! 2. [`resolver::resolve`] issues two concurrent store lookups — the
//!    nearest milestone at or before the mileage and the nearest at or
//!    after — and joins both before proceeding.
//! 3. With both endpoints in hand it interpolates latitude and longitude;
//!    when the query lands exactly on a recorded milestone, the stored
//!    coordinates are returned unchanged.
//!
//! A query outside the recorded range for its road resolves to a typed
//! "not found" outcome, never a one-sided extrapolation.
//!
//! ## Milestone Data
//!
//! Milestones load from a simple CSV format, one record per line:
//!
//! ```text
//! road/mileage,road,mileage,latitude,longitude
//! ```
//!
//! produced by the `milepost ingest` tool from KML survey annotations.

pub mod descriptor;
pub mod error;
pub mod milestone;
pub mod resolver;
pub mod store;

// Re-export main types at crate root for convenience
pub use error::{MilepostError, Result, StoreError};
pub use milestone::{Bracket, Milestone, PositionQuery, ResolvedPosition};
pub use resolver::resolve;
pub use store::{MemoryStore, MilestoneStore, RoadExtent, StoreStats};
