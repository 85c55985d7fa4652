//! In-process stand-ins for the upstream video API and for the camview API.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use camview::api::{build_router, AppState};
use camview::config::Config;

pub const GOOD_TOKEN: &str = "good-token";
pub const CAMERA_ID: &str = "42";
/// Camera whose timeline is empty.
pub const QUIET_CAMERA_ID: &str = "7";
/// Camera whose stream lookup answers after [`SLOW_STREAM_DELAY`].
pub const SLOW_CAMERA_ID: &str = "13";
pub const SLOW_STREAM_DELAY: std::time::Duration = std::time::Duration::from_millis(400);
/// Token for which `/me/` fails with a long non-ASCII error body.
pub const GARBLED_TOKEN: &str = "garbled-token";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("PersonalAccessToken {GOOD_TOKEN}"))
        .unwrap_or(false)
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Invalid token."}))).into_response()
}

fn known_camera(id: &str) -> bool {
    id == CAMERA_ID || id == QUIET_CAMERA_ID || id == SLOW_CAMERA_ID
}

async fn me(headers: HeaderMap) -> Response {
    let garbled = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("PersonalAccessToken {GARBLED_TOKEN}"));
    if garbled {
        // 511 ASCII bytes followed by a two-byte character straddling byte 512.
        let body = format!("{}é", "a".repeat(511));
        return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
    }
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "id": 1001,
        "email": "ana@example.com",
        "first_name": "Ana",
        "last_name": "Silva",
        "language": "en"
    }))
    .into_response()
}

async fn shared_cameras(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "count": 2,
        "next": null,
        "results": [
            {"id": 42, "name": "Front door", "status": "online"},
            {"id": 7, "name": "Garage", "status": "offline"}
        ]
    }))
    .into_response()
}

/// Camera 42 reports three days of recording; the window must be cut to one.
async fn recording(headers: HeaderMap, Path(camera_id): Path<String>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if !known_camera(&camera_id) {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response();
    }
    Json(json!({
        "recording_start": "2024-01-01T00:00:00Z",
        "recording_end": "2024-01-04T00:00:00Z",
        "retention": 3
    }))
    .into_response()
}

async fn timeline(
    headers: HeaderMap,
    Path(camera_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if !(params.contains_key("start") && params.contains_key("end")) {
        return (StatusCode::BAD_REQUEST, "start and end required").into_response();
    }
    if camera_id == QUIET_CAMERA_ID {
        return Json(json!({"segments": []})).into_response();
    }
    // Deliberately out of order.
    Json(json!({
        "segments": [
            {"start": "2024-01-01T00:20:00Z", "end": "2024-01-01T00:30:00Z"},
            {"start": "2024-01-01T00:00:00Z", "end": "2024-01-01T00:10:00Z"},
            {"start": "2024-01-01T00:40:00Z", "end": "2024-01-01T00:50:00Z"}
        ]
    }))
    .into_response()
}

/// Echoes the requested range in the URL so tests can check it.
async fn stream(
    headers: HeaderMap,
    Path(camera_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let (Some(start), Some(end)) = (params.get("start"), params.get("end")) else {
        return (StatusCode::BAD_REQUEST, "start and end required").into_response();
    };
    if camera_id == SLOW_CAMERA_ID {
        tokio::time::sleep(SLOW_STREAM_DELAY).await;
    }
    Json(json!({
        "url": format!("https://cdn.example.com/{camera_id}/{start}/{end}/playlist.m3u8"),
        "format": "hls"
    }))
    .into_response()
}

fn upstream_router() -> Router {
    Router::new()
        .route("/me/", get(me))
        .route("/shared-cameras/", get(shared_cameras))
        .route("/shared-cameras/{camera_id}/recording/", get(recording))
        .route("/shared-cameras/{camera_id}/recording/timeline/", get(timeline))
        .route("/shared-cameras/{camera_id}/recording/stream/", get(stream))
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}")
}

/// Start the fake upstream API; returns its base URL.
pub async fn spawn_upstream() -> String {
    serve(upstream_router()).await
}

/// Config pointing at `upstream`.
pub fn config_for(upstream: &str) -> Config {
    let mut cfg = Config::default();
    cfg.upstream.base_url = upstream.to_string();
    cfg.upstream.timeout_secs = 5;
    cfg
}

/// Start the fake upstream plus a camview API in front of it; returns the
/// camview base URL.
pub async fn spawn_app() -> String {
    let upstream = spawn_upstream().await;
    let state = Arc::new(AppState::new(config_for(&upstream)).expect("app state"));
    serve(build_router(state)).await
}
