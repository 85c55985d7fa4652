// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Segment timeline model — window clamp, segment store, nearest lookup.
//!
//! ```text
//! recording window ──→ WindowClamp ──→ timeline fetch
//!                                          │
//!                                          ▼
//!                                    SegmentStore ──→ locate(p) ──→ Segment
//! ```
//!
//! Everything here is synchronous and side-effect free apart from the
//! store's own state.

pub mod locator;
pub mod segment;
pub mod store;
pub mod window;

pub use locator::{layout, locate_nearest, SegmentPlacement};
pub use segment::{Segment, Timestamp};
pub use store::{SegmentStore, SortDirection};
pub use window::{ClampedWindow, RecordingWindow, WindowClamp};
