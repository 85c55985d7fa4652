// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Segment store — the loaded timeline of one recording window.
//!
//! The stored sequence is always ordered by `start` in the store's current
//! direction. Sorting is stable, so segments sharing a `start` keep their
//! relative order across any number of direction flips.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CamviewError, Result};
use crate::timeline::locator::{layout, locate_nearest, SegmentPlacement};
use crate::timeline::segment::Segment;

/// Chronological order of a segment list, keyed on `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    /// Oldest first.
    #[serde(rename = "asc", alias = "ascending")]
    Ascending,
    /// Newest first.
    #[serde(rename = "desc", alias = "descending")]
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Label for a button that switches away from this order.
    pub fn toggle_label(self) -> &'static str {
        match self {
            SortDirection::Ascending => "Sort by Newest",
            SortDirection::Descending => "Sort by Oldest",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => f.write_str("asc"),
            SortDirection::Descending => f.write_str("desc"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" | "oldest" => Ok(SortDirection::Ascending),
            "desc" | "descending" | "newest" => Ok(SortDirection::Descending),
            other => Err(format!("unknown sort order '{other}', expected asc or desc")),
        }
    }
}

fn sort_segments(segments: &mut [Segment], direction: SortDirection) {
    match direction {
        SortDirection::Ascending => segments.sort_by(|a, b| a.start.cmp(&b.start)),
        SortDirection::Descending => segments.sort_by(|a, b| b.start.cmp(&a.start)),
    }
}

#[derive(Debug, Clone)]
pub struct SegmentStore {
    segments: Vec<Segment>,
    direction: SortDirection,
}

impl Default for SegmentStore {
    fn default() -> Self {
        Self::new(SortDirection::Ascending)
    }
}

impl SegmentStore {
    pub fn new(direction: SortDirection) -> Self {
        Self { segments: Vec::new(), direction }
    }

    /// Replace the stored segments with `segments`, ordered by the current
    /// direction. On error the previous contents are kept.
    pub fn load(&mut self, mut segments: Vec<Segment>) -> Result<()> {
        if segments.is_empty() {
            return Err(CamviewError::EmptySegments);
        }
        for seg in &segments {
            seg.validate()?;
        }
        sort_segments(&mut segments, self.direction);
        debug!(count = segments.len(), order = %self.direction, "Segments loaded");
        self.segments = segments;
        Ok(())
    }

    /// Drop all segments, keeping the direction.
    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Copy of the segments ordered by `direction`. The store is not changed.
    pub fn sorted_view(&self, direction: SortDirection) -> Vec<Segment> {
        let mut view = self.segments.clone();
        sort_segments(&mut view, direction);
        view
    }

    /// Flip the direction and reorder in place. Returns the new direction.
    pub fn toggle_direction(&mut self) -> SortDirection {
        self.set_direction(self.direction.flipped());
        self.direction
    }

    /// Persist `direction` and reorder in place.
    pub fn set_direction(&mut self, direction: SortDirection) {
        self.direction = direction;
        sort_segments(&mut self.segments, direction);
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Segments in stored order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Nearest segment to fractional position `position` along the
    /// chronological timeline, regardless of the display direction.
    pub fn locate(&self, position: f64) -> Result<Segment> {
        let chronological = self.sorted_view(SortDirection::Ascending);
        locate_nearest(&chronological, position).copied()
    }

    /// Chronological placement of every segment on a 0–100 % timeline bar.
    pub fn layout(&self) -> Result<Vec<SegmentPlacement>> {
        layout(&self.sorted_view(SortDirection::Ascending))
    }
}
