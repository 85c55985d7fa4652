// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CamviewError, Result};

/// Instant on the recording timeline.
pub type Timestamp = DateTime<Utc>;

/// A contiguous range of recorded video, as reported by the timeline endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Segment {
    /// Build a segment, rejecting `end < start`.
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self> {
        let seg = Segment { start, end };
        seg.validate()?;
        Ok(seg)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.end < self.start {
            return Err(CamviewError::InvalidWindow { start: self.start, end: self.end });
        }
        Ok(())
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }

    /// Human-readable range, e.g. `Start: Sat 01/02/2021, 13:04:05, End: ...`.
    pub fn label(&self) -> String {
        format!("Start: {}, End: {}", format_timestamp(self.start), format_timestamp(self.end))
    }
}

/// Weekday, month/day/year and 24h clock.
pub fn format_timestamp(ts: Timestamp) -> String {
    ts.format("%a %m/%d/%Y, %H:%M:%S").to_string()
}
