// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Recording window clamp.
//!
//! The upstream recording lookup may report a window spanning several days.
//! Timeline and stream queries are bounded to `max_span` from the window
//! start; the remainder of the recording is simply not queried.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CamviewError, Result};
use crate::timeline::segment::Timestamp;

/// Time range used for timeline and stream queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl RecordingWindow {
    pub fn span(&self) -> Duration {
        self.end - self.start
    }
}

/// Output of [`WindowClamp::clamp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClampedWindow {
    pub window: RecordingWindow,
    /// Raw end timestamp the window was cut from, if it was cut.
    pub truncated_from: Option<Timestamp>,
}

impl ClampedWindow {
    pub fn is_truncated(&self) -> bool {
        self.truncated_from.is_some()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WindowClamp {
    max_span: Duration,
}

impl Default for WindowClamp {
    fn default() -> Self {
        Self { max_span: Duration::days(1) }
    }
}

impl WindowClamp {
    pub fn new(max_span: Duration) -> Self {
        Self { max_span }
    }

    pub fn max_span(&self) -> Duration {
        self.max_span
    }

    /// Bound `[start, end]` to at most `max_span`, keeping `start`.
    pub fn clamp(&self, start: Timestamp, end: Timestamp) -> Result<ClampedWindow> {
        if end < start {
            return Err(CamviewError::InvalidWindow { start, end });
        }

        if end - start > self.max_span {
            let clamped_end = start + self.max_span;
            warn!(
                %start,
                raw_end = %end,
                clamped_end = %clamped_end,
                max_span_secs = self.max_span.num_seconds(),
                "Recording window exceeds max span, truncating"
            );
            return Ok(ClampedWindow {
                window: RecordingWindow { start, end: clamped_end },
                truncated_from: Some(end),
            });
        }

        Ok(ClampedWindow {
            window: RecordingWindow { start, end },
            truncated_from: None,
        })
    }
}
