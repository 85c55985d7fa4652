// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! HTTP client for the upstream video API.
//!
//! Every call is authenticated with `Authorization: PersonalAccessToken <token>`.
//! The client holds no credentials itself; the token travels with each call
//! so one client can serve every session.

use chrono::SecondsFormat;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::UpstreamConfig;
use crate::error::{CamviewError, Result};
use crate::models::{Camera, CameraPage, RecordingInfo, StreamInfo, TimelineResponse, UserProfile};
use crate::timeline::{RecordingWindow, Segment, Timestamp};

/// Longest error body kept in [`CamviewError::Upstream`].
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Clone)]
pub struct VideoApiClient {
    http: reqwest::Client,
    base_url: String,
}

fn format_ts(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Cut `s` to at most `max` bytes without splitting a character.
fn truncate_on_char_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let cut = (0..=max).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0);
    s.truncate(cut);
}

impl VideoApiClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        if token.trim().is_empty() {
            return Err(CamviewError::MissingToken);
        }

        let url = format!("{}{}", self.base_url, path);
        debug!(url, "Upstream request");

        let resp = self
            .http
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, format!("PersonalAccessToken {token}"))
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json::<T>().await?);
        }

        let mut body = resp.text().await.unwrap_or_default();
        truncate_on_char_boundary(&mut body, MAX_ERROR_BODY);
        warn!(url, status = status.as_u16(), "Upstream request failed");

        match status.as_u16() {
            401 | 403 => Err(CamviewError::Unauthorized),
            404 => Err(CamviewError::NotFound(path.to_string())),
            code => Err(CamviewError::Upstream { status: code, body }),
        }
    }

    /// Profile of the token owner. Used to validate a token at login.
    pub async fn me(&self, token: &str) -> Result<UserProfile> {
        self.get_json(token, "/me/", &[]).await
    }

    /// Cameras shared with the token owner.
    pub async fn shared_cameras(&self, token: &str) -> Result<Vec<Camera>> {
        let page: CameraPage = self.get_json(token, "/shared-cameras/", &[]).await?;
        Ok(page.results)
    }

    /// Raw (unclamped) recording window of a camera.
    pub async fn recording(&self, token: &str, camera_id: &str) -> Result<RecordingInfo> {
        self.get_json(token, &format!("/shared-cameras/{camera_id}/recording/"), &[])
            .await
    }

    /// Recorded segments inside `window`, in upstream order.
    pub async fn timeline(
        &self,
        token: &str,
        camera_id: &str,
        window: &RecordingWindow,
    ) -> Result<Vec<Segment>> {
        let resp: TimelineResponse = self
            .get_json(
                token,
                &format!("/shared-cameras/{camera_id}/recording/timeline/"),
                &[("start", format_ts(window.start)), ("end", format_ts(window.end))],
            )
            .await?;
        Ok(resp.segments)
    }

    /// Playable stream URL for `[start, end]`.
    pub async fn stream(
        &self,
        token: &str,
        camera_id: &str,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<StreamInfo> {
        self.get_json(
            token,
            &format!("/shared-cameras/{camera_id}/recording/stream/"),
            &[("start", format_ts(start)), ("end", format_ts(end))],
        )
        .await
    }
}
