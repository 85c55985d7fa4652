// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Playback: resolve recorded video for a camera into stream URLs.
//!
//! Opening a playback runs, in order:
//!   1. recording lookup  → raw window
//!   2. `WindowClamp`     → bounded window
//!   3. stream lookup     → URL for the whole window
//!   4. timeline lookup   → `SegmentStore`
//!
//! Afterwards a segment (picked from the list or located from a timeline
//! click) is turned into its own stream URL.

use serde::Serialize;
use tracing::{info, warn};

use crate::client::VideoApiClient;
use crate::error::{CamviewError, Result};
use crate::timeline::{ClampedWindow, Segment, SegmentStore, SortDirection, WindowClamp};

/// Playback state of one camera within a session.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    pub camera_id: String,
    pub clamped: ClampedWindow,
    /// URL currently handed to the player.
    pub stream_url: String,
    pub store: SegmentStore,
    pub selected: Option<Segment>,
}

/// Serializable snapshot of a [`PlaybackSession`].
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackView {
    pub camera_id: String,
    #[serde(flatten)]
    pub clamped: ClampedWindow,
    pub stream_url: String,
    pub order: SortDirection,
    pub sort_label: &'static str,
    pub selected: Option<Segment>,
    pub segments: Vec<Segment>,
}

/// Segment chosen for playback with its stream URL.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentSelection {
    pub segment: Segment,
    pub stream_url: String,
}

impl PlaybackSession {
    /// Fetch and clamp the recording window of `camera_id`, then load its
    /// stream URL and timeline.
    pub async fn open(
        client: &VideoApiClient,
        token: &str,
        camera_id: &str,
        clamp: &WindowClamp,
        order: SortDirection,
    ) -> Result<Self> {
        let recording = client.recording(token, camera_id).await?;
        let clamped = clamp.clamp(recording.recording_start, recording.recording_end)?;
        let window = clamped.window;

        let stream = client.stream(token, camera_id, window.start, window.end).await?;
        let segments = client.timeline(token, camera_id, &window).await?;

        let mut store = SegmentStore::new(order);
        match store.load(segments) {
            Ok(()) => {}
            Err(CamviewError::EmptySegments) => {
                warn!(camera = camera_id, "Timeline is empty, only the full window is playable");
            }
            Err(e) => return Err(e),
        }

        info!(
            camera = camera_id,
            start = %window.start,
            end = %window.end,
            truncated = clamped.is_truncated(),
            segments = store.len(),
            "Playback opened"
        );

        Ok(Self {
            camera_id: camera_id.to_string(),
            clamped,
            stream_url: stream.url,
            store,
            selected: None,
        })
    }

    /// Fetch the stream URL for `segment` of `camera_id` without touching
    /// any playback state.
    pub async fn resolve_segment(
        client: &VideoApiClient,
        token: &str,
        camera_id: &str,
        segment: Segment,
    ) -> Result<SegmentSelection> {
        segment.validate()?;
        let stream = client.stream(token, camera_id, segment.start, segment.end).await?;
        info!(
            camera = camera_id,
            start = %segment.start,
            end = %segment.end,
            "Segment resolved"
        );
        Ok(SegmentSelection { segment, stream_url: stream.url })
    }

    /// Make `selection` the segment handed to the player.
    pub fn apply_selection(&mut self, selection: &SegmentSelection) {
        self.stream_url = selection.stream_url.clone();
        self.selected = Some(selection.segment);
    }

    /// Fetch the stream URL for `segment` and make it the current selection.
    pub async fn select_segment(
        &mut self,
        client: &VideoApiClient,
        token: &str,
        segment: Segment,
    ) -> Result<SegmentSelection> {
        let selection = Self::resolve_segment(client, token, &self.camera_id, segment).await?;
        self.apply_selection(&selection);
        Ok(selection)
    }

    /// Locate the segment nearest to timeline position `position` and select it.
    pub async fn select_at(
        &mut self,
        client: &VideoApiClient,
        token: &str,
        position: f64,
    ) -> Result<SegmentSelection> {
        let segment = self.store.locate(position)?;
        self.select_segment(client, token, segment).await
    }

    pub fn toggle_order(&mut self) -> SortDirection {
        self.store.toggle_direction()
    }

    pub fn view(&self) -> PlaybackView {
        let order = self.store.direction();
        PlaybackView {
            camera_id: self.camera_id.clone(),
            clamped: self.clamped,
            stream_url: self.stream_url.clone(),
            order,
            sort_label: order.toggle_label(),
            selected: self.selected,
            segments: self.store.segments().to_vec(),
        }
    }
}
