//! HTTP request handlers for the geocoding service.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use milepost::{descriptor, resolver, MilepostError, Milestone, ResolvedPosition};

use crate::AppState;

/// Query parameters for the geocode endpoint.
#[derive(Debug, Deserialize, IntoParams)]
pub struct GeocodeParams {
    /// Road-position descriptor, e.g. `台27線45K+200`.
    pub position: String,
    /// When non-empty, the response includes the bracketing milestones.
    pub debug: Option<String>,
    /// JSONP callback name; when non-empty the payload is wrapped as
    /// `<cb>(<json>);`.
    pub cb: Option<String>,
}

/// A milestone record echoed on the wire.
#[derive(Debug, Serialize, ToSchema)]
pub struct MilestoneEcho {
    /// Road identifier.
    pub road: String,
    /// Meters from the road's origin.
    pub mileage: u32,
    /// Latitude in decimal degrees.
    pub latitude: f32,
    /// Longitude in decimal degrees.
    pub longitude: f32,
}

impl From<Milestone> for MilestoneEcho {
    fn from(m: Milestone) -> Self {
        Self {
            road: m.road,
            mileage: m.mileage,
            latitude: m.latitude,
            longitude: m.longitude,
        }
    }
}

/// Successful geocode response.
#[derive(Debug, Serialize, ToSchema)]
pub struct GeocodeResponse {
    /// Normalized road name.
    pub road: String,
    /// Queried mileage in whole meters.
    pub mileage: u32,
    /// Interpolated latitude in decimal degrees.
    pub latitude: f32,
    /// Interpolated longitude in decimal degrees.
    pub longitude: f32,
    /// Lower bracketing milestone (debug only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower: Option<MilestoneEcho>,
    /// Upper bracketing milestone (debug only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper: Option<MilestoneEcho>,
}

impl GeocodeResponse {
    fn from_resolved(position: ResolvedPosition, debug: bool) -> Self {
        let (lower, upper) = if debug {
            (
                Some(position.bracket.lower.into()),
                Some(position.bracket.upper.into()),
            )
        } else {
            (None, None)
        };
        Self {
            road: position.road,
            mileage: position.mileage,
            latitude: position.latitude,
            longitude: position.longitude,
            lower,
            upper,
        }
    }
}

/// Error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Store statistics response.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    /// Number of distinct roads loaded.
    pub roads: usize,
    /// Total number of milestones loaded.
    pub milestones: usize,
}

/// Resolve a road-position descriptor to coordinates.
///
/// # Query Parameters
///
/// - `position`: road/mileage descriptor (e.g. `台27線45K+200`)
/// - `debug`: optional; any non-empty value includes the bracketing
///   milestones in the response
/// - `cb`: optional JSONP callback name
///
/// # Returns
///
/// - `200 OK` with coordinates on success
/// - `200 OK` with an `error` payload for unrecognized descriptors and
///   unresolvable positions (user-facing outcomes, not server faults)
/// - `500 Internal Server Error` when the milestone store fails
#[utoipa::path(
    get,
    path = "/geocode",
    params(GeocodeParams),
    responses(
        (status = 200, description = "Resolved position or user-facing error", body = GeocodeResponse),
        (status = 500, description = "Milestone store failure", body = ErrorResponse),
    ),
    tag = "geocode"
)]
pub async fn geocode(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GeocodeParams>,
) -> Response {
    let callback = params.cb.as_deref().filter(|cb| !cb.is_empty());
    let debug_requested = params.debug.as_deref().is_some_and(|d| !d.is_empty());

    tracing::debug!(position = %params.position, debug = debug_requested, "Geocode query");

    let query = match descriptor::parse(&params.position) {
        Ok(query) => query,
        Err(e) => return failure_response(&params.position, callback, &e),
    };

    match resolver::resolve(&state.store, &query).await {
        Ok(position) => {
            tracing::info!(
                road = %position.road,
                mileage = position.mileage,
                latitude = position.latitude,
                longitude = position.longitude,
                "Position resolved"
            );
            render(
                callback,
                StatusCode::OK,
                &GeocodeResponse::from_resolved(position, debug_requested),
            )
        }
        Err(e) => failure_response(&params.position, callback, &e),
    }
}

/// Shape an error into the wire payload.
///
/// Parse failures and unresolved brackets are expected outcomes and stay
/// non-5xx so JSONP clients still receive the payload; only store
/// failures surface as server errors.
fn failure_response(position: &str, callback: Option<&str>, e: &MilepostError) -> Response {
    let status = match e {
        MilepostError::UnrecognizedPattern { .. }
        | MilepostError::InvalidNumber { .. }
        | MilepostError::NotFound { .. } => StatusCode::OK,
        MilepostError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    match e {
        MilepostError::Store(_) => {
            tracing::warn!(position = position, error = %e, "Milestone store failure")
        }
        MilepostError::InvalidNumber { .. } => {
            // Grammar matched but conversion failed; worth investigating.
            tracing::warn!(position = position, error = %e, "Grammar/conversion mismatch")
        }
        _ => tracing::debug!(position = position, error = %e, "Geocode query unresolved"),
    }

    render(
        callback,
        status,
        &ErrorResponse {
            error: e.to_string(),
        },
    )
}

/// Serialize a payload as JSON, or as a JSONP call when a callback name
/// was supplied.
fn render<T: Serialize>(callback: Option<&str>, status: StatusCode, body: &T) -> Response {
    match callback {
        Some(cb) => match serde_json::to_string(body) {
            Ok(json) => (
                status,
                [(header::CONTENT_TYPE, "application/javascript")],
                format!("{cb}({json});"),
            )
                .into_response(),
            Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
        },
        None => (status, Json(body)).into_response(),
    }
}

/// Health check endpoint.
///
/// Returns service status and version.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is healthy", body = HealthResponse)),
    tag = "system"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Get milestone store statistics.
#[utoipa::path(
    get,
    path = "/stats",
    responses((status = 200, description = "Store statistics", body = StatsResponse)),
    tag = "system"
)]
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let stats = state.store.stats();

    Json(StatsResponse {
        roads: stats.roads,
        milestones: stats.milestones,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use milepost::StoreError;

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_store_failure_maps_to_server_error() {
        let err = MilepostError::Store(StoreError::Unavailable {
            message: "connection reset".to_string(),
        });

        let response = failure_response("台1線1K", None, &err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_not_found_stays_non_5xx() {
        let err = MilepostError::NotFound {
            road: "台1線".to_string(),
            mileage_meters: 99000.0,
        };

        let response = failure_response("台1線99K", None, &err);
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("台1線"));
    }

    #[tokio::test]
    async fn test_store_failure_keeps_jsonp_wrapping() {
        let err = MilepostError::Store(StoreError::Unavailable {
            message: "quota exceeded".to_string(),
        });

        let response = failure_response("台1線1K", Some("cb"), &err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("cb("));
        assert!(text.contains("quota exceeded"));
    }

    #[test]
    fn test_geocode_params_deserialize() {
        let params: GeocodeParams =
            serde_json::from_str(r#"{"position": "台1線1K", "debug": "1"}"#).unwrap();
        assert_eq!(params.position, "台1線1K");
        assert_eq!(params.debug.as_deref(), Some("1"));
        assert!(params.cb.is_none());
    }

    #[test]
    fn test_geocode_response_omits_bracket_without_debug() {
        let response = GeocodeResponse {
            road: "台1線".to_string(),
            mileage: 1000,
            latitude: 25.01,
            longitude: 121.01,
            lower: None,
            upper: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("台1線"));
        assert!(!json.contains("lower"));
        assert!(!json.contains("upper"));
    }

    #[test]
    fn test_health_response_serialize() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("0.1.0"));
    }
}
