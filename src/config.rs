use std::time::Duration;

use serde::Deserialize;

use crate::error::{CamviewError, Result};
use crate::timeline::SortDirection;

/// Upper bound for `playback.max_span_hours` (one leap year).
pub const MAX_SPAN_HOURS_LIMIT: u64 = 24 * 366;

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Upstream video API.
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// HTTP API configuration.
    #[serde(default)]
    pub api: ApiConfig,
    /// Playback / timeline behaviour.
    #[serde(default)]
    pub playback: PlaybackConfig,
}

/// Upstream video API connection settings.
#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    /// Base URL of the REST API, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self { base_url: default_base_url(), timeout_secs: default_timeout_secs() }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// HTTP API configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Port to listen on.
    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { port: default_api_port() }
    }
}

/// Playback parameters.
#[derive(Debug, Deserialize, Clone)]
pub struct PlaybackConfig {
    /// Longest recording window queried at once, in hours.
    /// Longer windows reported upstream are cut to this span.
    #[serde(default = "default_max_span_hours")]
    pub max_span_hours: u64,
    /// Segment list order used when a playback is opened.
    #[serde(default = "default_order")]
    pub default_order: SortDirection,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { max_span_hours: default_max_span_hours(), default_order: default_order() }
    }
}

impl PlaybackConfig {
    pub fn max_span(&self) -> Result<chrono::Duration> {
        i64::try_from(self.max_span_hours)
            .ok()
            .and_then(chrono::Duration::try_hours)
            .ok_or_else(|| {
                CamviewError::Config(format!(
                    "playback.max_span_hours {} is out of range",
                    self.max_span_hours
                ))
            })
    }
}

fn default_base_url() -> String { "https://api.angelcam.com/v1".into() }
fn default_timeout_secs() -> u64 { 15 }
fn default_api_port() -> u16 { 8000 }
fn default_max_span_hours() -> u64 { 24 }
fn default_order() -> SortDirection { SortDirection::Descending }

impl Config {
    /// Load configuration from a TOML file at `path`.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CamviewError::Config(format!("Cannot read config file: {e}")))?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| CamviewError::Config(format!("Invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        let base = &self.upstream.base_url;
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(CamviewError::Config(format!(
                "upstream.base_url must be an http(s) URL, got '{base}'"
            )));
        }
        if self.upstream.timeout_secs == 0 {
            return Err(CamviewError::Config("upstream.timeout_secs must be > 0".into()));
        }
        if self.playback.max_span_hours == 0 {
            return Err(CamviewError::Config("playback.max_span_hours must be > 0".into()));
        }
        if self.playback.max_span_hours > MAX_SPAN_HOURS_LIMIT {
            return Err(CamviewError::Config(format!(
                "playback.max_span_hours must be <= {MAX_SPAN_HOURS_LIMIT}"
            )));
        }
        Ok(())
    }
}
