//! Milepost Service - HTTP microservice for road-mileage geocoding.
//!
//! Resolves chainage descriptors (`台27線45K+200`) to interpolated
//! coordinates against a loaded milestone store.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `MILEPOST_DATA` | Milestone CSV file to load | Required |
//! | `MILEPOST_PORT` | HTTP server port | 8080 |
//! | `RUST_LOG` | Log level (e.g., "info", "debug") | "info" |
//!
//! ## Endpoints
//!
//! - `GET /geocode?position=台1線1K` - Resolve a descriptor to coordinates
//! - `GET /health` - Health check
//! - `GET /stats` - Store statistics
//! - `GET /docs` - OpenAPI documentation (Swagger UI)

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use milepost::MemoryStore;
use milepost_service::{handlers, AppState};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation for the milepost service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Milepost Geocoding Service",
        version = "0.1.0",
        description = "Resolves road-mileage descriptors to interpolated coordinates.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(handlers::geocode, handlers::health_check, handlers::get_stats),
    components(
        schemas(
            handlers::GeocodeResponse,
            handlers::MilestoneEcho,
            handlers::ErrorResponse,
            handlers::HealthResponse,
            handlers::StatsResponse,
        )
    ),
    tags(
        (name = "geocode", description = "Position resolution endpoints"),
        (name = "system", description = "System and health endpoints")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "milepost_service=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port: u16 = std::env::var("MILEPOST_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    let data_path = std::env::var("MILEPOST_DATA")
        .map_err(|_| "MILEPOST_DATA environment variable not set")?;

    let store = MemoryStore::from_csv_path(&data_path)?;
    let stats = store.stats();

    tracing::info!(
        data = %data_path,
        roads = stats.roads,
        milestones = stats.milestones,
        port = port,
        "Starting milepost service"
    );

    let state = Arc::new(AppState { store });

    // Build router
    let app = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/geocode", get(handlers::geocode))
        .route("/health", get(handlers::health_check))
        .route("/stats", get(handlers::get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
