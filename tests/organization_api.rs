//! Organization API Tests
//!
//! Drives the full router (auth, logging, routes) against the fixture-backed
//! memory store:
//! - Building and activity filters return exactly the linked organizations
//! - Radius and rectangle searches are exact and inclusive
//! - Detail carries building, phones and activity names in order
//! - Missing or wrong API key is refused before any query runs
//! - Invalid parameters are 400, unknown ids are 404

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use orgdir::config::ServiceConfig;
use orgdir::http_server::HttpServer;
use orgdir::store::MemoryOrganizationStore;
use serde_json::{json, Value};
use tower::ServiceExt;

const API_KEY: &str = "test-key";

// =============================================================================
// Helper Functions
// =============================================================================

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/directory.json")
}

fn setup_router() -> Router {
    let mut config = ServiceConfig::default();
    config.api.key = API_KEY.to_string();

    let store = MemoryOrganizationStore::from_json_file(&fixture_path()).unwrap();
    HttpServer::new(&config, Arc::new(store)).unwrap().router()
}

async fn send(method: Method, uri: &str, key: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = key {
        builder = builder.header("X-API-KEY", key);
    }
    let request = builder.body(Body::empty()).unwrap();

    let response = setup_router().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(uri: &str) -> (StatusCode, Value) {
    send(Method::GET, uri, Some(API_KEY)).await
}

async fn post(uri: &str) -> (StatusCode, Value) {
    send(Method::POST, uri, Some(API_KEY)).await
}

fn ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|o| o["id"].as_i64().unwrap())
        .collect()
}

// =============================================================================
// List Tests
// =============================================================================

#[tokio::test]
async fn test_list_all_ordered_by_id() {
    let (status, body) = get("/organizations/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![1, 2, 3, 4, 5]);

    let (status, alias) = get("/organizations").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(alias, body);
}

#[tokio::test]
async fn test_summary_shape() {
    let (_, body) = get("/organizations/").await;
    assert_eq!(
        body[0],
        json!({"id": 1, "name": "Roga i Kopyta", "building_id": 1})
    );
}

#[tokio::test]
async fn test_name_filter_is_case_insensitive_substring() {
    let (status, body) = get("/organizations/?name=TRUCK").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![3]);

    let (_, none) = get("/organizations/?name=nobody").await;
    assert_eq!(none, json!([]));
}

#[tokio::test]
async fn test_building_filter_returns_only_that_building() {
    let (status, body) = get("/organizations/building/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![1, 2]);
    for org in body.as_array().unwrap() {
        assert_eq!(org["building_id"], 1);
    }

    let (status, empty) = get("/organizations/building/999").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(empty, json!([]));
}

#[tokio::test]
async fn test_activity_filter_uses_direct_links() {
    let (_, dairy) = get("/organizations/activity/3").await;
    assert_eq!(ids(&dairy), vec![1, 2]);

    let (_, parts) = get("/organizations/activity/6").await;
    assert_eq!(ids(&parts), vec![3, 5]);

    // Parent activity with no direct links
    let (status, food) = get("/organizations/activity/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(food, json!([]));
}

// =============================================================================
// Geographic Search Tests
// =============================================================================

#[tokio::test]
async fn test_radius_includes_building_at_center() {
    let (status, body) =
        post("/organizations/search/radius?latitude=55.75&longitude=37.62&radius=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![1, 2]);
}

#[tokio::test]
async fn test_radius_far_from_everything_is_empty() {
    let (status, body) = post("/organizations/search/radius?latitude=0&longitude=0&radius=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_radius_large_enough_reaches_saint_petersburg() {
    // Moscow to Saint Petersburg is roughly 634 km
    let (_, near) =
        post("/organizations/search/radius?latitude=55.75&longitude=37.62&radius=600000").await;
    assert_eq!(ids(&near), vec![1, 2]);

    let (_, far) =
        post("/organizations/search/radius?latitude=55.75&longitude=37.62&radius=700000").await;
    assert_eq!(ids(&far), vec![1, 2, 4]);
}

#[tokio::test]
async fn test_rectangle_includes_and_excludes() {
    let (status, body) = post(
        "/organizations/search/rectangle?min_latitude=55&max_latitude=56&min_longitude=37&max_longitude=38",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![1, 2]);
    assert!(!ids(&body).contains(&5));
}

#[tokio::test]
async fn test_rectangle_bounds_are_inclusive() {
    let (_, body) = post(
        "/organizations/search/rectangle?min_latitude=10&max_latitude=10&min_longitude=10&max_longitude=10",
    )
    .await;
    assert_eq!(ids(&body), vec![5]);
}

// =============================================================================
// Detail Tests
// =============================================================================

#[tokio::test]
async fn test_detail_includes_building_phones_and_activities() {
    let (status, body) = get("/organizations/1").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["name"], "Roga i Kopyta");
    assert_eq!(body["building"]["address"], "Moscow, Lenina 1, office 3");
    assert_eq!(
        body["phone_numbers"],
        json!(["2-222-222", "3-333-333", "8-923-666-13-13"])
    );
    assert_eq!(body["activities"], json!(["Meat products", "Dairy products"]));
}

#[tokio::test]
async fn test_detail_without_phones() {
    let (status, body) = get("/organizations/4").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phone_numbers"], json!([]));
}

#[tokio::test]
async fn test_detail_missing_is_404() {
    let (status, body) = get("/organizations/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
}

// =============================================================================
// Validation Tests
// =============================================================================

#[tokio::test]
async fn test_non_numeric_ids_are_400() {
    for uri in [
        "/organizations/abc",
        "/organizations/building/abc",
        "/organizations/activity/-1",
        "/organizations/0",
    ] {
        let (status, body) = get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri {}", uri);
        assert_eq!(body["code"], 400);
    }
}

#[tokio::test]
async fn test_radius_validation() {
    let (status, body) = post("/organizations/search/radius?latitude=55.75&longitude=37.62").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("radius"));

    let (status, _) =
        post("/organizations/search/radius?latitude=91&longitude=37.62&radius=10").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) =
        post("/organizations/search/radius?latitude=55&longitude=37&radius=-5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_inverted_rectangle_is_400() {
    let (status, body) = post(
        "/organizations/search/rectangle?min_latitude=56&max_latitude=55&min_longitude=37&max_longitude=38",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("latitude"));
}

// =============================================================================
// API Key Tests
// =============================================================================

#[tokio::test]
async fn test_missing_key_is_401() {
    let (status, body) = send(Method::GET, "/organizations/", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);
}

#[tokio::test]
async fn test_wrong_key_is_403() {
    let (status, body) = send(Method::GET, "/organizations/1", Some("nope")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 403);
}

#[tokio::test]
async fn test_auth_checked_before_validation() {
    let (status, _) = send(Method::GET, "/organizations/abc", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_and_metrics_need_no_key() {
    let (status, body) = send(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(Method::GET, "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["requests"].is_u64());
}

#[tokio::test]
async fn test_response_carries_request_id() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = setup_router().oneshot(request).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}
