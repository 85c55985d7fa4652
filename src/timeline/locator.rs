// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Nearest-segment lookup and timeline bar layout.
//!
//! A timeline control spans from the first segment's start to the last
//! segment's end. A click at fraction `p` of its width maps to
//! `first.start + p * total`; the chosen segment is the one whose start or
//! end boundary lies closest to that instant.

use serde::Serialize;

use crate::error::{CamviewError, Result};
use crate::timeline::segment::Segment;

/// Total span covered by `segments`, in milliseconds.
fn total_span_ms(segments: &[Segment]) -> Result<(i64, i64)> {
    let (first, last) = match (segments.first(), segments.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return Err(CamviewError::EmptySegments),
    };
    let origin = first.start.timestamp_millis();
    let total = last.end.timestamp_millis() - origin;
    if total <= 0 {
        return Err(CamviewError::DegenerateWindow { duration_ms: total });
    }
    Ok((origin, total))
}

/// Return the segment closest to fractional position `position` (0 = first
/// start, 1 = last end). Ties keep the first segment encountered.
pub fn locate_nearest(segments: &[Segment], position: f64) -> Result<&Segment> {
    if !position.is_finite() || !(0.0..=1.0).contains(&position) {
        return Err(CamviewError::InvalidPosition(position));
    }
    let (origin, total) = total_span_ms(segments)?;
    let click = origin as f64 + position * total as f64;

    let distance = |seg: &Segment| {
        let to_start = (seg.start.timestamp_millis() as f64 - click).abs();
        let to_end = (seg.end.timestamp_millis() as f64 - click).abs();
        to_start.min(to_end)
    };

    let mut closest = &segments[0];
    let mut smallest = distance(closest);
    for seg in &segments[1..] {
        let d = distance(seg);
        if d < smallest {
            smallest = d;
            closest = seg;
        }
    }
    Ok(closest)
}

/// Position of one segment on the timeline bar, in percent of its width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentPlacement {
    pub segment: Segment,
    pub left_pct: f64,
    pub width_pct: f64,
}

/// Compute left offset and width of each segment, in the order given.
pub fn layout(segments: &[Segment]) -> Result<Vec<SegmentPlacement>> {
    let (origin, total) = total_span_ms(segments)?;
    let total = total as f64;
    Ok(segments
        .iter()
        .map(|seg| {
            let start = seg.start.timestamp_millis();
            let end = seg.end.timestamp_millis();
            SegmentPlacement {
                segment: *seg,
                left_pct: (start - origin) as f64 / total * 100.0,
                width_pct: (end - start) as f64 / total * 100.0,
            }
        })
        .collect())
}
