//! Integration tests for the HTTP API.

use axum::{routing::get, Router};
use axum_test::TestServer;
use milepost::MemoryStore;
use milepost_service::{handlers, AppState};
use serde_json::Value;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Milestone fixture: 台1線 surveyed at 0m and 2000m.
fn fixture_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "台1線/0,台1線,0,25.0,121.0").unwrap();
    writeln!(file, "台1線/2000,台1線,2000,25.02,121.02").unwrap();
    file.flush().unwrap();
    file
}

fn test_server(store: MemoryStore) -> TestServer {
    let state = Arc::new(AppState { store });

    let app = Router::new()
        .route("/geocode", get(handlers::geocode))
        .route("/health", get(handlers::health_check))
        .route("/stats", get(handlers::get_stats))
        .with_state(state);

    TestServer::new(app).unwrap()
}

fn fixture_server() -> (NamedTempFile, TestServer) {
    let file = fixture_csv();
    let store = MemoryStore::from_csv_path(file.path()).unwrap();
    (file, test_server(store))
}

#[tokio::test]
async fn test_geocode_interpolates_midpoint() {
    let (_file, server) = fixture_server();

    let response = server
        .get("/geocode")
        .add_query_param("position", "台1線1k")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["road"], "台1線");
    assert_eq!(body["mileage"], 1000);
    assert!((body["latitude"].as_f64().unwrap() - 25.01).abs() < 1e-4);
    assert!((body["longitude"].as_f64().unwrap() - 121.01).abs() < 1e-4);

    // Bracket echo is debug-only
    assert!(body.get("lower").is_none());
    assert!(body.get("upper").is_none());
}

#[tokio::test]
async fn test_geocode_exact_milestone() {
    let (_file, server) = fixture_server();

    let response = server
        .get("/geocode")
        .add_query_param("position", "台1線2K")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["mileage"], 2000);
    assert!((body["latitude"].as_f64().unwrap() - 25.02).abs() < 1e-4);
}

#[tokio::test]
async fn test_geocode_debug_includes_bracket() {
    let (_file, server) = fixture_server();

    let response = server
        .get("/geocode")
        .add_query_param("position", "台1線1K")
        .add_query_param("debug", "1")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["lower"]["mileage"], 0);
    assert_eq!(body["upper"]["mileage"], 2000);
    assert_eq!(body["lower"]["road"], "台1線");
}

#[tokio::test]
async fn test_geocode_empty_debug_is_ignored() {
    let (_file, server) = fixture_server();

    let response = server
        .get("/geocode")
        .add_query_param("position", "台1線1K")
        .add_query_param("debug", "")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body.get("lower").is_none());
}

#[tokio::test]
async fn test_geocode_jsonp_wraps_payload() {
    let (_file, server) = fixture_server();

    let response = server
        .get("/geocode")
        .add_query_param("position", "台1線1K")
        .add_query_param("cb", "handleResult")
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.header("content-type"),
        "application/javascript"
    );

    let text = response.text();
    assert!(text.starts_with("handleResult("));
    assert!(text.ends_with(");"));

    let inner: Value =
        serde_json::from_str(&text["handleResult(".len()..text.len() - 2]).unwrap();
    assert_eq!(inner["road"], "台1線");
}

#[tokio::test]
async fn test_geocode_jsonp_wraps_errors_too() {
    let (_file, server) = fixture_server();

    let response = server
        .get("/geocode")
        .add_query_param("position", "nonsense")
        .add_query_param("cb", "cb")
        .await;

    response.assert_status_ok();
    let text = response.text();
    assert!(text.starts_with("cb("));
    assert!(text.contains("error"));
}

#[tokio::test]
async fn test_geocode_unrecognized_descriptor() {
    let (_file, server) = fixture_server();

    let response = server
        .get("/geocode")
        .add_query_param("position", "not a road")
        .await;

    // User-facing outcome, not a server fault
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("unrecognized pattern"));
}

#[tokio::test]
async fn test_geocode_out_of_range_is_not_found() {
    let (_file, server) = fixture_server();

    let response = server
        .get("/geocode")
        .add_query_param("position", "台1線99K")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("no milestones"));
}

#[tokio::test]
async fn test_geocode_unknown_road_is_not_found() {
    let (_file, server) = fixture_server();

    let response = server
        .get("/geocode")
        .add_query_param("position", "台99線1K")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("台99線"));
}

#[tokio::test]
async fn test_health() {
    let (_file, server) = fixture_server();

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].as_str().is_some());
}

#[tokio::test]
async fn test_stats() {
    let (_file, server) = fixture_server();

    let response = server.get("/stats").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["roads"], 1);
    assert_eq!(body["milestones"], 2);
}

#[tokio::test]
async fn test_repeated_queries_are_identical() {
    let (_file, server) = fixture_server();

    let first: Value = server
        .get("/geocode")
        .add_query_param("position", "台1線1K+500")
        .await
        .json();
    let second: Value = server
        .get("/geocode")
        .add_query_param("position", "台1線1K+500")
        .await
        .json();

    assert_eq!(first, second);
}
