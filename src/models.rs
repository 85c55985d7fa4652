// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Records exchanged with the upstream video API.
//!
//! Only the fields the viewer reads are typed; everything else the API sends
//! is kept in `extra` and passed through untouched.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::timeline::{Segment, Timestamp};

/// Account owning the access token (`GET /me/`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Camera shared with the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Paginated camera list (`GET /shared-cameras/`).
#[derive(Debug, Clone, Deserialize)]
pub struct CameraPage {
    #[serde(default)]
    pub count: Option<u64>,
    pub results: Vec<Camera>,
}

/// Raw recording window of a camera (`GET /shared-cameras/{id}/recording/`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingInfo {
    pub recording_start: Timestamp,
    pub recording_end: Timestamp,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Recorded segments within a window (`.../recording/timeline/`).
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineResponse {
    #[serde(default)]
    pub segments: Vec<Segment>,
}

/// Playable media URL (`.../recording/stream/`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamInfo {
    pub url: String,
}

/// Upstream ids are integers; accept strings too.
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("expected id, got {other}"))),
    }
}
