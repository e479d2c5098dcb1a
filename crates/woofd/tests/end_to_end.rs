//! End-to-end tests: configuration text through to HTTP responses and
//! the status file, with the daemon's crates wired together the way
//! woofd wires them.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;
use woof_api::{AppState, build_router};
use woof_core::status::load_status;
use woof_core::{ConfigFile, StatusFile};
use woof_watch::{SnapshotWriter, TokioClock, WatchRegistry};

const CONFIG: &str = r#"
[server]
listen_address = "127.0.0.1:0"
query_timeout = "2s"

[watches.backup]
trigger = "post"
interval = "1h"

[watches.button]
trigger = "manual"
interval = "10m"

[watches.heartbeat]
trigger = "periodic"
interval = "30s"
"#;

fn start(config: &ConfigFile, baseline: &StatusFile) -> AppState {
    let clock = TokioClock::starting_at(Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap());
    let registry = WatchRegistry::spawn_from_config(config, baseline, Arc::new(clock));
    AppState::new(registry, config.server.clone())
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_text(resp: axum::response::Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test(start_paused = true)]
async fn kick_rules_per_trigger() {
    let config = ConfigFile::from_toml_str(CONFIG).unwrap();
    let router = build_router(start(&config, &StatusFile::new()));

    let resp = router.clone().oneshot(request("POST", "/backup")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "Watchdog kicked\n");

    let resp = router.clone().oneshot(request("POST", "/button")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/");

    let resp = router
        .clone()
        .oneshot(request("POST", "/heartbeat"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = router.clone().oneshot(request("GET", "/backup")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(resp.headers()[header::ALLOW], "POST");

    let resp = router.oneshot(request("POST", "/nope")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test(start_paused = true)]
async fn status_page_lists_configured_watches() {
    let config = ConfigFile::from_toml_str(CONFIG).unwrap();
    let router = build_router(start(&config, &StatusFile::new()));

    let resp = router.oneshot(request("GET", "/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;

    let backup = html.find(">backup<").unwrap();
    let button = html.find("action=\"/button\"").unwrap();
    let heartbeat = html.find(">heartbeat<").unwrap();
    assert!(backup < button && button < heartbeat);
}

#[tokio::test(start_paused = true)]
async fn snapshot_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");
    let config = ConfigFile::from_toml_str(CONFIG).unwrap();

    let state = start(&config, &StatusFile::new());
    let router = build_router(state.clone());

    for _ in 0..2 {
        tokio::time::sleep(Duration::from_secs(60)).await;
        let resp = router.clone().oneshot(request("POST", "/backup")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let writer = SnapshotWriter::new(&state_path);
    let written = writer.write(&state.registry).await.unwrap();
    // backup was kicked; heartbeat has fired on its own; button never seen.
    assert_eq!(written, 2);

    let saved = load_status(&state_path).unwrap();
    assert!(saved.contains_key("backup"));
    assert!(saved.contains_key("heartbeat"));
    assert!(!saved.contains_key("button"));
    let backup = &saved["backup"];
    assert!(backup.last_seen.is_some());
    assert!(backup.interval_mean > Duration::ZERO);

    // A fresh registry resumes from the file.
    let resumed = start(&config, &saved);
    let status = resumed.registry.get("backup").unwrap().query().await.unwrap();
    assert_eq!(status.last_seen, backup.last_seen);
    assert_eq!(status.interval_mean, backup.interval_mean);
    assert_eq!(status.interval_std_dev, backup.interval_std_dev);
}

#[test]
fn json_config_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{
            "ServerConfig": { "ListenAddress": ":8181", "StateFile": "" },
            "Watches": { "ping": { "Trigger": "post", "Interval": "5m" } }
        }"#,
    )
    .unwrap();

    let config = ConfigFile::from_file(&path).unwrap();
    assert_eq!(config.server.listen_address, ":8181");
    assert!(config.server.state_file.is_none());
    assert_eq!(config.watches["ping"].interval, Duration::from_secs(300));
}
