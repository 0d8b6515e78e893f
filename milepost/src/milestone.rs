//! Milestone and position types.
//!
//! A [`Milestone`] is a surveyed reference point: a road identifier, a
//! mileage in meters from the road's origin, and the coordinates measured
//! there. Milestones are produced by the ingestion tool and never modified
//! by this library; everything here reads them.

use serde::{Deserialize, Serialize};

/// A surveyed reference point on a numbered road.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    /// Road identifier (e.g., "台1線"). Not globally unique on its own.
    pub road: String,
    /// Meters along the road from its defined origin.
    pub mileage: u32,
    /// Latitude in decimal degrees.
    pub latitude: f32,
    /// Longitude in decimal degrees.
    pub longitude: f32,
}

/// A parsed road-position descriptor.
///
/// Only constructed by [`crate::descriptor::parse`]; a partially parsed
/// descriptor is rejected there, never defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionQuery {
    /// Normalized road name, always ending in the line-type suffix.
    pub road: String,
    /// Queried mileage in meters, always ≥ 0.
    pub mileage_meters: f64,
}

/// The pair of milestones surrounding a queried mileage.
///
/// Invariant: `lower.mileage <= upper.mileage` and both share the query's
/// road. When the query lands exactly on a recorded milestone, both sides
/// are that same record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bracket {
    /// Nearest milestone at or before the queried mileage.
    pub lower: Milestone,
    /// Nearest milestone at or after the queried mileage.
    pub upper: Milestone,
}

/// A resolved position: the query echoed back with interpolated
/// coordinates, plus the bracket that produced them for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPosition {
    /// Normalized road name from the query.
    pub road: String,
    /// Queried mileage truncated to whole meters.
    pub mileage: u32,
    /// Interpolated latitude in decimal degrees.
    pub latitude: f32,
    /// Interpolated longitude in decimal degrees.
    pub longitude: f32,
    /// The bracketing milestones the coordinates were derived from.
    pub bracket: Bracket,
}
