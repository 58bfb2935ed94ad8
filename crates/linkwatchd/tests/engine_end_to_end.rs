//! End-to-end engine tests.
//!
//! Real HTTP prober and scheduler against in-process responders, read
//! back through the snapshot API.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceExt;

use linkwatch_api::build_router;
use linkwatch_core::{LinkwatchConfig, Target, TargetRegistry};
use linkwatch_health::{HttpProber, Scheduler};
use linkwatch_state::{HistoryStore, UNREACHABLE_STATUS};

async fn always_ok_responder() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = Router::new().route("/", get(|| async { "ok" }));
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

fn target(id: u32, addr: SocketAddr, interval: &str) -> Target {
    Target {
        id,
        title: format!("target-{id}"),
        description: format!("responder {id}"),
        address: format!("http://{addr}/"),
        interval_override: Some(interval.to_string()),
    }
}

async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = router.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn reachable_target_fills_bounded_history() {
    let addr = always_ok_responder().await;
    let registry = TargetRegistry::new(vec![target(2, addr, "100ms")]).unwrap();
    let store = HistoryStore::new(3).unwrap();

    let scheduler = Scheduler::new(
        HttpProber::new(Duration::from_secs(1)).unwrap(),
        store.clone(),
        Duration::from_secs(60),
    );
    scheduler.start(&registry).await.unwrap();

    tokio::time::sleep(Duration::from_millis(700)).await;
    scheduler.stop_all().await;

    let router = build_router(store, registry);
    let (status, body) = get_json(router, "/api/v1/records/2").await;
    assert_eq!(status, StatusCode::OK);

    let record = &body["data"];
    assert_eq!(record["is_up"], true);
    assert_eq!(record["status_code"], 200);
    assert_eq!(record["ping_times"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn unreachable_target_recorded_as_down() {
    let addr = closed_port().await;
    let registry = TargetRegistry::new(vec![target(1, addr, "200ms")]).unwrap();
    let store = HistoryStore::new(100).unwrap();

    let scheduler = Scheduler::new(
        HttpProber::new(Duration::from_millis(500)).unwrap(),
        store.clone(),
        Duration::from_secs(60),
    );
    scheduler.start(&registry).await.unwrap();

    tokio::time::sleep(Duration::from_millis(700)).await;
    scheduler.stop_all().await;

    let record = store.get(1).unwrap().unwrap();
    assert!((2..=4).contains(&record.samples().len()));
    assert!(!record.is_reachable());
    assert_eq!(record.last_status_code(), UNREACHABLE_STATUS);
}

#[tokio::test]
async fn config_file_to_running_engine() {
    let up = always_ok_responder().await;
    let down = closed_port().await;
    let config = format!(
        r#"
interval = "150ms"
probe_timeout = "500ms"
history_capacity = 10

[[links]]
id = 10
title = "Up"
link = "http://{up}/"

[[links]]
id = 11
title = "Down"
link = "http://{down}/"
interval = "not a duration"
"#
    );
    let settings = LinkwatchConfig::from_toml_str(&config)
        .unwrap()
        .resolve()
        .unwrap();

    let store = HistoryStore::new(settings.history_capacity).unwrap();
    let scheduler = Scheduler::new(
        HttpProber::new(settings.probe_timeout).unwrap(),
        store.clone(),
        settings.default_interval,
    );
    scheduler.start(&settings.registry).await.unwrap();
    assert_eq!(
        scheduler.interval_for(11).await,
        Some(Duration::from_millis(150))
    );

    tokio::time::sleep(Duration::from_millis(500)).await;
    scheduler.stop_all().await;

    let router = build_router(store, settings.registry);
    let (status, body) = get_json(router, "/data").await;
    assert_eq!(status, StatusCode::OK);

    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["id"], 10);
    assert_eq!(records[0]["is_up"], true);
    assert_eq!(records[1]["id"], 11);
    assert_eq!(records[1]["is_up"], false);
}

#[tokio::test]
async fn https_link_is_accepted_and_probed() {
    let down = closed_port().await;
    let config = format!(
        r#"
interval = "100ms"
probe_timeout = "300ms"

[[links]]
id = 20
title = "Secure"
link = "https://{down}/"
"#
    );
    let settings = LinkwatchConfig::from_toml_str(&config)
        .unwrap()
        .resolve()
        .unwrap();

    let store = HistoryStore::new(settings.history_capacity).unwrap();
    let scheduler = Scheduler::new(
        HttpProber::new(settings.probe_timeout).unwrap(),
        store.clone(),
        settings.default_interval,
    );
    scheduler.start(&settings.registry).await.unwrap();
    tokio::time::sleep(Duration::from_millis(250)).await;
    scheduler.stop_all().await;

    let record = store.get(20).unwrap().expect("https target recorded");
    assert!(!record.is_reachable());
    assert_eq!(record.address(), format!("https://{down}/"));
}
