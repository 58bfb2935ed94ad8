//! Snapshot API regression tests.
//!
//! Drives the full router the daemon serves against a store filled by
//! hand, and checks status codes and the JSON shape of every route.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use linkwatch_api::build_router;
use linkwatch_core::{Target, TargetRegistry};
use linkwatch_state::{HistoryStore, Outcome, UNREACHABLE_STATUS};

fn test_registry() -> TargetRegistry {
    TargetRegistry::new(vec![
        Target {
            id: 1,
            title: "Home".to_string(),
            description: "landing page".to_string(),
            address: "http://example.com/".to_string(),
            interval_override: None,
        },
        Target {
            id: 2,
            title: "API".to_string(),
            description: "backend".to_string(),
            address: "http://api.example.com/healthz".to_string(),
            interval_override: Some("5s".to_string()),
        },
    ])
    .unwrap()
}

async fn get_json(router: axum::Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = router.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn records_empty_before_any_probe() {
    let router = build_router(HistoryStore::new(10).unwrap(), test_registry());

    let (status, body) = get_json(router, "/api/v1/records").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], serde_json::json!({}));
}

#[tokio::test]
async fn record_not_found_before_first_probe() {
    let router = build_router(HistoryStore::new(10).unwrap(), test_registry());

    let (status, body) = get_json(router, "/api/v1/records/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "record not found");
}

#[tokio::test]
async fn record_with_invalid_id_is_bad_request() {
    let router = build_router(HistoryStore::new(10).unwrap(), test_registry());

    let (status, body) = get_json(router, "/api/v1/records/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid record id");
}

#[tokio::test]
async fn record_after_probes_has_full_shape() {
    let store = HistoryStore::new(10).unwrap();
    store
        .upsert(
            1,
            &Outcome::reachable(200, Duration::from_millis(40), 1_000),
            "landing page",
            "http://example.com/",
        )
        .unwrap();
    store
        .upsert(
            1,
            &Outcome::unreachable(Duration::from_millis(75), 2_000),
            "landing page",
            "http://example.com/",
        )
        .unwrap();
    let router = build_router(store, test_registry());

    let (status, body) = get_json(router, "/api/v1/records/1").await;
    assert_eq!(status, StatusCode::OK);

    let record = &body["data"];
    assert_eq!(record["id"], 1);
    assert_eq!(record["is_up"], false);
    assert_eq!(record["status_code"], UNREACHABLE_STATUS);
    assert_eq!(record["last_pinged"], 2_000);
    assert_eq!(record["description"], "landing page");
    assert_eq!(record["link"], "http://example.com/");
    assert_eq!(
        record["ping_times"],
        serde_json::json!([
            {"time_pinged": 1_000, "response_time": 40},
            {"time_pinged": 2_000, "response_time": 75},
        ])
    );
}

#[tokio::test]
async fn records_listing_keyed_by_id() {
    let store = HistoryStore::new(10).unwrap();
    for id in [1, 2] {
        store
            .upsert(
                id,
                &Outcome::reachable(204, Duration::from_millis(5), 1_000),
                "",
                "http://example.com/",
            )
            .unwrap();
    }
    let router = build_router(store, test_registry());

    let (status, body) = get_json(router, "/api/v1/records").await;
    assert_eq!(status, StatusCode::OK);
    let data = body["data"].as_object().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data["2"]["status_code"], 204);
}

#[tokio::test]
async fn legacy_data_is_bare_array() {
    let store = HistoryStore::new(10).unwrap();
    store
        .upsert(
            2,
            &Outcome::reachable(200, Duration::from_millis(5), 1_000),
            "backend",
            "http://api.example.com/healthz",
        )
        .unwrap();
    let router = build_router(store, test_registry());

    let (status, body) = get_json(router, "/data").await;
    assert_eq!(status, StatusCode::OK);
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], 2);
    assert_eq!(records[0]["is_up"], true);
}

#[tokio::test]
async fn targets_listing_shows_configuration() {
    let router = build_router(HistoryStore::new(10).unwrap(), test_registry());

    let (status, body) = get_json(router, "/api/v1/targets").await;
    assert_eq!(status, StatusCode::OK);
    let targets = body["data"].as_array().unwrap();
    assert_eq!(targets.len(), 2);
    assert_eq!(targets[0]["link"], "http://example.com/");
    assert!(targets[0].get("interval").is_none());
    assert_eq!(targets[1]["interval"], "5s");
}

#[tokio::test]
async fn healthz_reports_counts() {
    let router = build_router(HistoryStore::new(10).unwrap(), test_registry());

    let (status, body) = get_json(router, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["targets"], 2);
    assert_eq!(body["data"]["recorded"], 0);
}
