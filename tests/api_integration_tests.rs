//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint, exercising the
//! router, handlers, group load path and miss queue together.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use flightcache::{
    api::create_router, cache::GroupSettings, AppState, Group, GroupRegistry, LoaderFn,
};

// == Helper Functions ==

/// Builds a router around a single "quotes" group whose loader resolves
/// every key except those starting with "missing".
fn create_test_app() -> Router {
    let registry = Arc::new(GroupRegistry::new());
    let loader = Arc::new(LoaderFn(|key: &str| {
        if key.starts_with("missing") {
            anyhow::bail!("upstream has no data for this key");
        }
        Ok(format!("loaded:{}", key).into_bytes())
    }));
    registry.register(Group::new(
        "quotes",
        loader,
        GroupSettings {
            max_bytes: 0,
            miss_capacity: 16,
            ..GroupSettings::default()
        },
    ));
    create_router(AppState::new(registry))
}

async fn body_to_bytes(body: Body) -> Vec<u8> {
    axum::body::to_bytes(body, usize::MAX).await.unwrap().to_vec()
}

async fn body_to_json(body: Body) -> Value {
    serde_json::from_slice(&body_to_bytes(body).await).unwrap()
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_get_loads_from_upstream_on_miss() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/cache/quotes?key=nvda")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_bytes(response.into_body()).await;
    assert_eq!(body, b"loaded:nvda");
}

#[tokio::test]
async fn test_get_serves_cached_value_on_hit() {
    let app = create_test_app();

    // First request fills the store
    let first = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/cache/quotes?key=amd")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    // Second request is a hit and must return the same bytes
    let second = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/cache/quotes?key=amd")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(body_to_bytes(second.into_body()).await, b"loaded:amd");

    // Stats reflect one miss then one hit
    let stats = app
        .oneshot(
            Request::builder()
                .uri("/stats/quotes")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_to_json(stats.into_body()).await;
    assert_eq!(json["hits"].as_u64().unwrap(), 1);
    assert_eq!(json["misses"].as_u64().unwrap(), 1);
    assert_eq!(json["loads"].as_u64().unwrap(), 1);
}

#[tokio::test]
async fn test_get_unknown_group() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/cache/unknown?key=x")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_get_without_key_param() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/cache/quotes")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_get_load_failure_returns_500() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/cache/quotes?key=missing_ticker")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}

// == Miss Queue Tests ==

#[tokio::test]
async fn test_failed_load_is_published_as_missed() {
    let app = create_test_app();

    // A failing load seeds the miss queue
    let _ = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/cache/quotes?key=missing_one")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Popping returns the failed key as a plain body
    let response = app
        .oneshot(
            Request::builder()
                .uri("/cache/quotes?missed=1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_bytes(response.into_body()).await, b"missing_one");
}

#[tokio::test]
async fn test_missed_pop_empty_queue() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/cache/quotes?missed=1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_to_bytes(response.into_body()).await.is_empty());
}

// == POST Endpoint Tests ==

#[tokio::test]
async fn test_update_then_get_roundtrip() {
    let app = create_test_app();

    let update = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/cache/quotes")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"key":"seeded","value":"peer value"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(update.status(), StatusCode::OK);

    // The populated value is served without touching the loader
    let get = app
        .oneshot(
            Request::builder()
                .uri("/cache/quotes?key=seeded")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(get.status(), StatusCode::OK);
    assert_eq!(body_to_bytes(get.into_body()).await, b"peer value");
}

#[tokio::test]
async fn test_update_overwrites_existing_value() {
    let app = create_test_app();

    // Fill via the loader first
    let _ = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/cache/quotes?key=tsla")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Overwrite via POST
    let update = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/cache/quotes")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"key":"tsla","value":"fresher"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(update.status(), StatusCode::OK);

    let get = app
        .oneshot(
            Request::builder()
                .uri("/cache/quotes?key=tsla")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_to_bytes(get.into_body()).await, b"fresher");
}

#[tokio::test]
async fn test_update_rejects_empty_key() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/cache/quotes")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"key":"","value":"v"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_update_invalid_json() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/cache/quotes")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"invalid json"#))
                .unwrap(),
        )
        .await
        .unwrap();

    // Axum returns 400 or 422 for JSON extraction failures
    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}

// == STATS Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint_counts_failures() {
    let app = create_test_app();

    // One successful load, one failed load
    let _ = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/cache/quotes?key=ok")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let _ = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/cache/quotes?key=missing_x")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/stats/quotes")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["group"].as_str().unwrap(), "quotes");
    assert_eq!(json["loads"].as_u64().unwrap(), 1);
    assert_eq!(json["load_failures"].as_u64().unwrap(), 1);
    assert_eq!(json["entries"].as_u64().unwrap(), 1);
    assert!(json.get("hit_rate").is_some());
}

#[tokio::test]
async fn test_stats_unknown_group() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/stats/unknown")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"].as_str().unwrap(), "healthy");
    assert!(json.get("timestamp").is_some());
}
