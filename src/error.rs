use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CamviewError {
    #[error("Invalid window: end {end} precedes start {start}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("No segments to load")]
    EmptySegments,

    #[error("Degenerate window: total duration {duration_ms} ms")]
    DegenerateWindow { duration_ms: i64 },

    #[error("Invalid timeline position {0}, expected a value in [0, 1]")]
    InvalidPosition(f64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Access token is required")]
    MissingToken,

    #[error("Upstream rejected the access token")]
    Unauthorized,

    #[error("Upstream resource not found: {0}")]
    NotFound(String),

    #[error("Upstream returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream request timed out")]
    Timeout,

    #[error("Session '{id}' not found")]
    SessionNotFound { id: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CamviewError {
    /// Message suitable for showing to the person using the viewer.
    pub fn user_message(&self) -> &'static str {
        match self {
            CamviewError::InvalidWindow { .. }
            | CamviewError::EmptySegments
            | CamviewError::DegenerateWindow { .. } => "No recordings available",
            CamviewError::InvalidPosition(_) => "Invalid timeline position.",
            CamviewError::MissingToken => "Token is required",
            CamviewError::Unauthorized => "Invalid token or unable to fetch user data.",
            CamviewError::NotFound(_) => "No recordings available for this camera.",
            CamviewError::Upstream { .. } => "Error fetching the recording or stream.",
            CamviewError::Network(_) | CamviewError::Timeout => "Network error or other issue.",
            CamviewError::SessionNotFound { .. } => "Session expired, please log in again.",
            CamviewError::Config(_) | CamviewError::Io(_) => "Internal error.",
        }
    }
}

impl From<reqwest::Error> for CamviewError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CamviewError::Timeout
        } else {
            CamviewError::Network(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, CamviewError>;
