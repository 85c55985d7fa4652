//! Upstream client, login and playback flow against a fake video API.

mod common;

use chrono::{Duration, TimeZone, Utc};

use camview::client::VideoApiClient;
use camview::error::CamviewError;
use camview::playback::PlaybackSession;
use camview::session::{self, SessionRegistry};
use camview::timeline::{Segment, SortDirection, WindowClamp};

use common::{
    config_for, spawn_upstream, CAMERA_ID, GARBLED_TOKEN, GOOD_TOKEN, QUIET_CAMERA_ID,
};

async fn client() -> VideoApiClient {
    let upstream = spawn_upstream().await;
    VideoApiClient::new(&config_for(&upstream).upstream).expect("client")
}

fn at(h: u32, m: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
}

#[tokio::test]
async fn test_me_and_cameras() {
    let client = client().await;

    let user = client.me(GOOD_TOKEN).await.expect("me");
    assert_eq!(user.id, "1001");
    assert_eq!(user.display_name(), "Ana Silva");
    assert_eq!(user.extra.get("language").and_then(|v| v.as_str()), Some("en"));

    let cameras = client.shared_cameras(GOOD_TOKEN).await.expect("cameras");
    assert_eq!(cameras.len(), 2);
    assert_eq!(cameras[0].id, "42");
    assert_eq!(cameras[0].name, "Front door");
    assert_eq!(cameras[1].status, "offline");
}

#[tokio::test]
async fn test_bad_token_is_unauthorized() {
    let client = client().await;
    assert!(matches!(client.me("wrong").await, Err(CamviewError::Unauthorized)));
    assert!(matches!(client.me("  ").await, Err(CamviewError::MissingToken)));
}

#[tokio::test]
async fn test_upstream_error_body_cut_on_char_boundary() {
    let client = client().await;
    match client.me(GARBLED_TOKEN).await {
        Err(CamviewError::Upstream { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body.len(), 511);
            assert!(body.chars().all(|c| c == 'a'));
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_stream_keeps_fractional_seconds() {
    let client = client().await;
    let start = at(0, 0) + Duration::milliseconds(900);
    let end = at(0, 0) + Duration::milliseconds(10_500);

    let stream = client.stream(GOOD_TOKEN, CAMERA_ID, start, end).await.expect("stream");
    assert_eq!(
        stream.url,
        "https://cdn.example.com/42/2024-01-01T00:00:00.900Z/2024-01-01T00:00:10.500Z/playlist.m3u8"
    );

    // Whole seconds stay without a fraction.
    let stream = client.stream(GOOD_TOKEN, CAMERA_ID, at(0, 0), at(0, 10)).await.expect("stream");
    assert!(stream.url.contains("/2024-01-01T00:00:00Z/2024-01-01T00:10:00Z/"));
}

#[tokio::test]
async fn test_unknown_camera_is_not_found() {
    let client = client().await;
    let err = client.recording(GOOD_TOKEN, "999").await.unwrap_err();
    assert!(matches!(err, CamviewError::NotFound(_)));
    assert_eq!(err.user_message(), "No recordings available for this camera.");
}

#[tokio::test]
async fn test_unreachable_upstream_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = VideoApiClient::new(&config_for(&format!("http://{addr}")).upstream).expect("client");
    assert!(matches!(client.me(GOOD_TOKEN).await, Err(CamviewError::Network(_))));
}

#[tokio::test]
async fn test_login_builds_session() {
    let client = client().await;
    let registry = SessionRegistry::new();

    let session = session::login(&client, GOOD_TOKEN).await.expect("login");
    assert_eq!(session.cameras.len(), 2);
    assert!(session.camera(CAMERA_ID).is_some());
    let id = session.id.clone();
    registry.insert(session);

    assert_eq!(registry.get(&id).expect("get").token, GOOD_TOKEN);
    registry.remove(&id).expect("logout");
    assert!(registry.is_empty());
    assert!(matches!(registry.get(&id), Err(CamviewError::SessionNotFound { .. })));
}

#[tokio::test]
async fn test_login_rejects_bad_token() {
    let client = client().await;
    assert!(matches!(
        session::login(&client, "wrong").await,
        Err(CamviewError::Unauthorized)
    ));
}

#[tokio::test]
async fn test_playback_open_clamps_and_orders() {
    let client = client().await;
    let clamp = WindowClamp::new(Duration::days(1));

    let playback =
        PlaybackSession::open(&client, GOOD_TOKEN, CAMERA_ID, &clamp, SortDirection::Descending)
            .await
            .expect("open");

    let window = playback.clamped.window;
    assert_eq!(window.start, at(0, 0));
    assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
    assert_eq!(
        playback.clamped.truncated_from,
        Some(Utc.with_ymd_and_hms(2024, 1, 4, 0, 0, 0).unwrap())
    );
    assert_eq!(
        playback.stream_url,
        "https://cdn.example.com/42/2024-01-01T00:00:00Z/2024-01-02T00:00:00Z/playlist.m3u8"
    );

    let starts: Vec<_> = playback.store.segments().iter().map(|s| s.start).collect();
    assert_eq!(starts, vec![at(0, 40), at(0, 20), at(0, 0)]);
}

#[tokio::test]
async fn test_playback_select_at_position() {
    let client = client().await;
    let mut playback = PlaybackSession::open(
        &client,
        GOOD_TOKEN,
        CAMERA_ID,
        &WindowClamp::default(),
        SortDirection::Descending,
    )
    .await
    .expect("open");

    let first = playback.select_at(&client, GOOD_TOKEN, 0.0).await.expect("select");
    assert_eq!(first.segment, Segment::new(at(0, 0), at(0, 10)).unwrap());
    assert_eq!(
        first.stream_url,
        "https://cdn.example.com/42/2024-01-01T00:00:00Z/2024-01-01T00:10:00Z/playlist.m3u8"
    );
    assert_eq!(playback.stream_url, first.stream_url);

    let middle = playback.select_at(&client, GOOD_TOKEN, 0.5).await.expect("select");
    assert_eq!(middle.segment.start, at(0, 20));
    assert_eq!(playback.selected, Some(middle.segment));

    assert!(matches!(
        playback.select_at(&client, GOOD_TOKEN, -0.1).await,
        Err(CamviewError::InvalidPosition(_))
    ));
}

#[tokio::test]
async fn test_playback_with_empty_timeline() {
    let client = client().await;
    let mut playback = PlaybackSession::open(
        &client,
        GOOD_TOKEN,
        QUIET_CAMERA_ID,
        &WindowClamp::default(),
        SortDirection::Ascending,
    )
    .await
    .expect("open");

    assert!(playback.store.is_empty());
    assert!(playback.stream_url.starts_with("https://cdn.example.com/7/"));
    assert!(matches!(
        playback.select_at(&client, GOOD_TOKEN, 0.5).await,
        Err(CamviewError::EmptySegments)
    ));
}
