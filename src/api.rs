//! HTTP API — login sessions and recording playback as JSON.
//!
//! Endpoints:
//!   GET  /api/status                                → service status
//!   POST /api/login        {token}                  → session + profile + cameras
//!   POST /api/logout       (x-session-id)           → 204
//!   POST /api/cameras      {token}                  → shared cameras
//!   POST /api/recordings   {token, camId}           → raw recording window
//!   POST /api/playback/{camera_id}                  → open playback
//!   GET  /api/playback/{camera_id}                  → current playback state
//!   GET  /api/playback/{camera_id}/segments?order=  → segment list
//!   POST /api/playback/{camera_id}/sort             → toggle segment order
//!   GET  /api/playback/{camera_id}/layout           → timeline bar layout
//!   POST /api/playback/{camera_id}/locate {position}→ nearest segment + URL
//!   POST /api/playback/{camera_id}/segment {start, end} → segment URL
//!
//! Playback endpoints need the `x-session-id` header returned by login.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::client::VideoApiClient;
use crate::config::Config;
use crate::error::{CamviewError, Result};
use crate::models::{Camera, UserProfile};
use crate::playback::{PlaybackSession, PlaybackView, SegmentSelection};
use crate::session::{self, SessionRegistry};
use crate::timeline::{Segment, SegmentPlacement, SortDirection, WindowClamp};

/// Header carrying the session id on playback requests.
pub const SESSION_HEADER: &str = "x-session-id";

/// Shared state passed to all handlers.
pub struct AppState {
    pub client: VideoApiClient,
    pub sessions: SessionRegistry,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let client = VideoApiClient::new(&config.upstream)?;
        Ok(Self { client, sessions: SessionRegistry::new(), config })
    }

    fn clamp(&self) -> Result<WindowClamp> {
        Ok(WindowClamp::new(self.config.playback.max_span()?))
    }
}

// ──────────────── errors ──────────────────────────────────────────────────

/// Error response: `{"error": <user message>, "detail": <cause>}`.
pub struct ApiError {
    status: StatusCode,
    message: String,
    detail: String,
}

impl ApiError {
    fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.to_string(),
            detail: message.to_string(),
        }
    }
}

impl From<CamviewError> for ApiError {
    fn from(e: CamviewError) -> Self {
        let status = match &e {
            CamviewError::InvalidWindow { .. }
            | CamviewError::EmptySegments
            | CamviewError::DegenerateWindow { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            CamviewError::InvalidPosition(_) | CamviewError::MissingToken => {
                StatusCode::BAD_REQUEST
            }
            CamviewError::Unauthorized | CamviewError::SessionNotFound { .. } => {
                StatusCode::UNAUTHORIZED
            }
            CamviewError::NotFound(_) => StatusCode::NOT_FOUND,
            CamviewError::Upstream { .. } | CamviewError::Network(_) => StatusCode::BAD_GATEWAY,
            CamviewError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            CamviewError::Config(_) | CamviewError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %e, "Request failed");
        } else {
            warn!(error = %e, "Request rejected");
        }
        Self { status, message: e.user_message().to_string(), detail: e.to_string() }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "Malformed request body");
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "Invalid request body".to_string(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({"error": self.message, "detail": self.detail})),
        )
            .into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

// ──────────────── request / response types ────────────────────────────────

#[derive(Deserialize)]
pub struct TokenBody {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Deserialize)]
pub struct RecordingsBody {
    #[serde(default)]
    token: Option<String>,
    #[serde(default, rename = "camId")]
    cam_id: Option<String>,
}

#[derive(Deserialize)]
pub struct SegmentsParams {
    #[serde(default)]
    order: Option<SortDirection>,
}

#[derive(Deserialize)]
pub struct LocateBody {
    position: f64,
}

#[derive(Serialize)]
struct LoginResponse {
    session_id: String,
    user: UserProfile,
    cameras: Vec<Camera>,
}

#[derive(Serialize)]
struct CamerasResponse {
    results: Vec<Camera>,
}

#[derive(Serialize)]
struct SegmentsResponse {
    camera_id: String,
    order: SortDirection,
    sort_label: &'static str,
    segments: Vec<Segment>,
}

#[derive(Serialize)]
struct LayoutResponse {
    camera_id: String,
    placements: Vec<SegmentPlacement>,
}

#[derive(Serialize)]
struct StatusResponse {
    sessions: usize,
    upstream: String,
    max_span_hours: u64,
}

// ──────────────── router ──────────────────────────────────────────────────

/// Build the axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/status", get(handle_status))
        .route("/api/login", post(handle_login))
        .route("/api/logout", post(handle_logout))
        .route("/api/cameras", post(handle_cameras))
        .route("/api/recordings", post(handle_recordings))
        // Playback endpoints
        .route(
            "/api/playback/{camera_id}",
            get(handle_playback).post(handle_open_playback),
        )
        .route("/api/playback/{camera_id}/segments", get(handle_segments))
        .route("/api/playback/{camera_id}/sort", post(handle_sort))
        .route("/api/playback/{camera_id}/layout", get(handle_layout))
        .route("/api/playback/{camera_id}/locate", post(handle_locate))
        .route("/api/playback/{camera_id}/segment", post(handle_select_segment))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn start_server(state: Arc<AppState>, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr = format!("0.0.0.0:{}", port);
    info!(port, "HTTP API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

// ──────────────── helpers ─────────────────────────────────────────────────

fn session_id(headers: &HeaderMap) -> Result<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CamviewError::SessionNotFound { id: String::new() })
}

fn required_token(token: Option<String>, message: &str) -> ApiResult<String> {
    token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::bad_request(message))
}

/// Session token plus a copy of the open playback for `camera_id`.
/// The copy is read-only; changes go through [`SessionRegistry::update`] so
/// concurrent requests on the same playback are not overwritten.
fn playback_snapshot(
    state: &AppState,
    session_id: &str,
    camera_id: &str,
) -> Result<(String, PlaybackSession)> {
    let session = state.sessions.get(session_id)?;
    let playback = session
        .playbacks
        .get(camera_id)
        .cloned()
        .ok_or_else(|| CamviewError::NotFound(format!("no open playback for camera '{camera_id}'")))?;
    Ok((session.token, playback))
}

fn store_playback(state: &AppState, session_id: &str, playback: PlaybackSession) -> Result<()> {
    state.sessions.update(session_id, |s| {
        s.playbacks.insert(playback.camera_id.clone(), playback);
    })
}

/// Record `selection` on the playback currently stored for `camera_id`.
fn apply_selection(
    state: &AppState,
    session_id: &str,
    camera_id: &str,
    selection: &SegmentSelection,
) -> Result<()> {
    state.sessions.update(session_id, |s| {
        if let Some(playback) = s.playbacks.get_mut(camera_id) {
            playback.apply_selection(selection);
        }
    })
}

// ──────────────── handlers ────────────────────────────────────────────────

async fn handle_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(StatusResponse {
        sessions: state.sessions.len(),
        upstream: state.client.base_url().to_string(),
        max_span_hours: state.config.playback.max_span_hours,
    })
}

async fn handle_login(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<TokenBody>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(body) = body?;
    let token = required_token(body.token, "Token is required")?;
    let session = session::login(&state.client, &token).await?;

    let resp = LoginResponse {
        session_id: session.id.clone(),
        user: session.user.clone(),
        cameras: session.cameras.clone(),
    };
    state.sessions.insert(session);
    Ok(Json(resp))
}

async fn handle_logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let id = session_id(&headers)?;
    state.sessions.remove(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn handle_cameras(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<TokenBody>, JsonRejection>,
) -> ApiResult<Json<CamerasResponse>> {
    let Json(body) = body?;
    let token = required_token(body.token, "Token is required for this action")?;
    let results = state.client.shared_cameras(&token).await?;
    Ok(Json(CamerasResponse { results }))
}

async fn handle_recordings(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<RecordingsBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = body?;
    let token = required_token(body.token, "Token is required for this action")?;
    let cam_id = required_token(body.cam_id, "Camera ID is required for this action")?;
    let recording = state.client.recording(&token, &cam_id).await?;
    Ok(Json(recording))
}

async fn handle_open_playback(
    State(state): State<Arc<AppState>>,
    Path(camera_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<PlaybackView>> {
    let sid = session_id(&headers)?;
    let token = state.sessions.get(&sid)?.token;

    let playback = PlaybackSession::open(
        &state.client,
        &token,
        &camera_id,
        &state.clamp()?,
        state.config.playback.default_order,
    )
    .await?;

    let view = playback.view();
    store_playback(&state, &sid, playback)?;
    Ok(Json(view))
}

async fn handle_playback(
    State(state): State<Arc<AppState>>,
    Path(camera_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<PlaybackView>> {
    let sid = session_id(&headers)?;
    let (_, playback) = playback_snapshot(&state, &sid, &camera_id)?;
    Ok(Json(playback.view()))
}

async fn handle_segments(
    State(state): State<Arc<AppState>>,
    Path(camera_id): Path<String>,
    Query(params): Query<SegmentsParams>,
    headers: HeaderMap,
) -> ApiResult<Json<SegmentsResponse>> {
    let sid = session_id(&headers)?;
    let (_, playback) = playback_snapshot(&state, &sid, &camera_id)?;

    let order = params.order.unwrap_or_else(|| playback.store.direction());
    Ok(Json(SegmentsResponse {
        camera_id,
        order,
        sort_label: order.toggle_label(),
        segments: playback.store.sorted_view(order),
    }))
}

async fn handle_sort(
    State(state): State<Arc<AppState>>,
    Path(camera_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<SegmentsResponse>> {
    let sid = session_id(&headers)?;
    let resp = state.sessions.update(&sid, |s| {
        let playback = s.playbacks.get_mut(&camera_id).ok_or_else(|| {
            CamviewError::NotFound(format!("no open playback for camera '{camera_id}'"))
        })?;
        let order = playback.toggle_order();
        Ok::<_, CamviewError>(SegmentsResponse {
            camera_id: camera_id.clone(),
            order,
            sort_label: order.toggle_label(),
            segments: playback.store.segments().to_vec(),
        })
    })??;
    Ok(Json(resp))
}

async fn handle_layout(
    State(state): State<Arc<AppState>>,
    Path(camera_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<LayoutResponse>> {
    let sid = session_id(&headers)?;
    let (_, playback) = playback_snapshot(&state, &sid, &camera_id)?;
    let placements = playback.store.layout()?;
    Ok(Json(LayoutResponse { camera_id, placements }))
}

async fn handle_locate(
    State(state): State<Arc<AppState>>,
    Path(camera_id): Path<String>,
    headers: HeaderMap,
    body: std::result::Result<Json<LocateBody>, JsonRejection>,
) -> ApiResult<Json<SegmentSelection>> {
    let Json(body) = body?;
    let sid = session_id(&headers)?;
    let (token, playback) = playback_snapshot(&state, &sid, &camera_id)?;

    let segment = playback.store.locate(body.position)?;
    let selection =
        PlaybackSession::resolve_segment(&state.client, &token, &camera_id, segment).await?;
    apply_selection(&state, &sid, &camera_id, &selection)?;
    Ok(Json(selection))
}

async fn handle_select_segment(
    State(state): State<Arc<AppState>>,
    Path(camera_id): Path<String>,
    headers: HeaderMap,
    body: std::result::Result<Json<Segment>, JsonRejection>,
) -> ApiResult<Json<SegmentSelection>> {
    let Json(segment) = body?;
    let sid = session_id(&headers)?;
    let (token, _) = playback_snapshot(&state, &sid, &camera_id)?;

    let selection =
        PlaybackSession::resolve_segment(&state.client, &token, &camera_id, segment).await?;
    apply_selection(&state, &sid, &camera_id, &selection)?;
    Ok(Json(selection))
}
