//! Bracket resolution and coordinate interpolation.
//!
//! Resolving a [`PositionQuery`] takes two milestone lookups — the nearest
//! record at or before the queried mileage and the nearest at or after it.
//! The lookups are independent reads, so they are issued together and
//! joined; neither waits on the other's submission. Only when both return
//! a record does interpolation run. A missing side means the mileage falls
//! outside everything recorded for that road, which is reported as
//! [`MilepostError::NotFound`] rather than extrapolated from one endpoint.

use crate::error::{MilepostError, Result};
use crate::milestone::{Bracket, PositionQuery, ResolvedPosition};
use crate::store::MilestoneStore;

/// Linear interpolation between `a` and `b`.
///
/// `fraction` is expected in `[0, 1]`; the bracket invariant guarantees
/// this and no clamping is performed.
pub fn lerp(a: f32, b: f32, fraction: f32) -> f32 {
    a + (b - a) * fraction
}

/// Resolve a position query to interpolated coordinates.
///
/// # Errors
///
/// [`MilepostError::NotFound`] when no bracketing pair exists (the queried
/// mileage lies outside the recorded milestones for the road, or the road
/// is unknown); [`MilepostError::Store`] when either lookup fails.
pub async fn resolve<S: MilestoneStore + ?Sized>(
    store: &S,
    query: &PositionQuery,
) -> Result<ResolvedPosition> {
    let mileage = query.mileage_meters as u32;

    let (lower, upper) = tokio::join!(
        store.nearest_at_or_before(&query.road, mileage),
        store.nearest_at_or_after(&query.road, mileage),
    );

    let (lower, upper) = match (lower?, upper?) {
        (Some(lower), Some(upper)) => (lower, upper),
        _ => {
            return Err(MilepostError::NotFound {
                road: query.road.clone(),
                mileage_meters: query.mileage_meters,
            })
        }
    };

    // Exact hit: both lookups converge on one record. Interpolating here
    // would divide by zero.
    if lower.mileage == upper.mileage {
        return Ok(ResolvedPosition {
            road: query.road.clone(),
            mileage,
            latitude: lower.latitude,
            longitude: lower.longitude,
            bracket: Bracket { lower, upper },
        });
    }

    let fraction = ((query.mileage_meters - f64::from(lower.mileage))
        / (f64::from(upper.mileage) - f64::from(lower.mileage))) as f32;
    let latitude = lerp(lower.latitude, upper.latitude, fraction);
    let longitude = lerp(lower.longitude, upper.longitude, fraction);

    Ok(ResolvedPosition {
        road: query.road.clone(),
        mileage,
        latitude,
        longitude,
        bracket: Bracket { lower, upper },
    })
}
