//! Controller settings and validation.
//!
//! Pure configuration types with no infrastructure dependencies. Every field
//! has a default so partial JSON documents load cleanly.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::FeedEndpoint;

/// Default backend origin.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Default TTS voice.
pub const DEFAULT_TTS_VOICE: &str = "am_michael";

/// Default TTS speed multiplier.
pub const DEFAULT_TTS_SPEED: f32 = 1.2;

/// Messages must be longer than this (trimmed, in characters) to be spoken.
pub const DEFAULT_MIN_SPOKEN_CHARS: usize = 10;

/// Identifier of the scripted welcome message.
pub const DEFAULT_BOOTSTRAP_MESSAGE_ID: &str = "1";

/// Location of the pre-recorded welcome clip.
pub const DEFAULT_BOOTSTRAP_ASSET: &str = "/intro.wav";

const DEFAULT_BOOTSTRAP_TEXT: &str =
    "Hello, I'm at your service. What are we working on today, boss?";

/// A camera shown on the feed wall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Backend camera index.
    pub index: u32,
    /// Display label.
    pub label: String,
}

/// Automatic feed retry with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffSettings {
    /// Delay before the first automatic retry.
    pub base_delay_ms: u64,
    /// Upper bound for any single delay.
    pub max_delay_ms: u64,
    /// Automatic retries before giving up (manual retry still works).
    pub max_attempts: u32,
}

impl Default for BackoffSettings {
    fn default() -> Self {
        Self {
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
            max_attempts: 5,
        }
    }
}

/// Controller settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Backend origin, e.g. `http://localhost:8000`.
    pub backend_url: String,
    /// Path of the TTS endpoint.
    pub tts_path: String,
    /// Path of the feed status endpoint.
    pub feed_status_path: String,
    /// Path of the feed stream endpoint.
    pub feed_stream_path: String,
    /// Path of the upload endpoint.
    pub upload_path: String,

    /// TTS voice identifier.
    pub tts_voice: String,
    /// TTS speed multiplier.
    pub tts_speed: f32,
    /// Minimum trimmed message length (exclusive) worth synthesizing.
    pub min_spoken_chars: usize,

    /// Identifier of the scripted welcome message, never synthesized.
    pub bootstrap_message_id: String,
    /// Text of the welcome message (fingerprint of the bootstrap clip).
    pub bootstrap_text: String,
    /// Asset path of the welcome clip.
    pub bootstrap_asset: String,
    /// Delay before the welcome clip plays.
    pub bootstrap_delay_ms: u64,
    /// Delay between message finalization and the synthesis request.
    pub synthesis_delay_ms: u64,

    /// Delay between a connectivity recovery and the feed reload.
    pub online_retry_delay_ms: u64,
    /// Automatic feed retry; `None` disables it.
    pub feed_backoff: Option<BackoffSettings>,
    /// Cameras on the feed wall.
    pub cameras: Vec<CameraSettings>,

    /// HTTP request timeout.
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Settings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            tts_path: "/api/chat/tts".to_string(),
            feed_status_path: "/api/video/status".to_string(),
            feed_stream_path: "/api/video/stream".to_string(),
            upload_path: "/chat/upload".to_string(),
            tts_voice: DEFAULT_TTS_VOICE.to_string(),
            tts_speed: DEFAULT_TTS_SPEED,
            min_spoken_chars: DEFAULT_MIN_SPOKEN_CHARS,
            bootstrap_message_id: DEFAULT_BOOTSTRAP_MESSAGE_ID.to_string(),
            bootstrap_text: DEFAULT_BOOTSTRAP_TEXT.to_string(),
            bootstrap_asset: DEFAULT_BOOTSTRAP_ASSET.to_string(),
            bootstrap_delay_ms: 1_000,
            synthesis_delay_ms: 200,
            online_retry_delay_ms: 1_000,
            feed_backoff: None,
            cameras: vec![
                CameraSettings {
                    index: 0,
                    label: "local wrist view".to_string(),
                },
                CameraSettings {
                    index: 1,
                    label: "global top view".to_string(),
                },
            ],
            request_timeout_secs: 30,
        }
    }

    /// Parse settings from a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| SettingsError::Parse(e.to_string()))?;
        validate_settings(&settings)?;
        Ok(settings)
    }

    /// Full URL of an endpoint path on the backend.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        backend_endpoint(&self.backend_url, path)
    }

    /// Endpoint addresses of one camera feed.
    #[must_use]
    pub fn feed_endpoint(&self, camera: &CameraSettings) -> FeedEndpoint {
        FeedEndpoint {
            camera_index: Some(camera.index),
            label: camera.label.clone(),
            status_url: self.endpoint(&self.feed_status_path),
            stream_url: format!(
                "{}?camera_index={}",
                self.endpoint(&self.feed_stream_path),
                camera.index
            ),
        }
    }

    /// Delay before the bootstrap clip.
    #[must_use]
    pub const fn bootstrap_delay(&self) -> Duration {
        Duration::from_millis(self.bootstrap_delay_ms)
    }

    /// Delay before a synthesis request.
    #[must_use]
    pub const fn synthesis_delay(&self) -> Duration {
        Duration::from_millis(self.synthesis_delay_ms)
    }

    /// Delay before reloading a feed after connectivity returns.
    #[must_use]
    pub const fn online_retry_delay(&self) -> Duration {
        Duration::from_millis(self.online_retry_delay_ms)
    }

    /// HTTP request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Errors from settings validation.
#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    /// The settings document is malformed.
    #[error("Invalid settings document: {0}")]
    Parse(String),

    /// The backend URL is not an http(s) URL.
    #[error("Backend URL must start with http:// or https://, got '{0}'")]
    InvalidBackendUrl(String),

    /// The TTS speed is outside the accepted range.
    #[error("TTS speed must be within 0.5..=2.0, got {0}")]
    InvalidSpeed(f32),

    /// A required text field is empty.
    #[error("Setting '{0}' must not be empty")]
    Empty(&'static str),

    /// Backoff bounds are inconsistent.
    #[error("Backoff base delay ({base_ms} ms) exceeds max delay ({max_ms} ms)")]
    InvalidBackoff {
        /// Base delay.
        base_ms: u64,
        /// Max delay.
        max_ms: u64,
    },
}

/// Append `path` to the backend URL. Any path already on the backend URL is
/// kept, so a backend mounted under a prefix works.
#[must_use]
pub fn backend_endpoint(backend_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        backend_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    let url = settings.backend_url.as_str();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(SettingsError::InvalidBackendUrl(url.to_string()));
    }

    if !(0.5..=2.0).contains(&settings.tts_speed) {
        return Err(SettingsError::InvalidSpeed(settings.tts_speed));
    }

    if settings.tts_voice.trim().is_empty() {
        return Err(SettingsError::Empty("tts_voice"));
    }
    if settings.bootstrap_asset.trim().is_empty() {
        return Err(SettingsError::Empty("bootstrap_asset"));
    }
    if settings.bootstrap_message_id.is_empty() {
        return Err(SettingsError::Empty("bootstrap_message_id"));
    }

    if let Some(backoff) = settings.feed_backoff {
        if backoff.base_delay_ms > backoff.max_delay_ms {
            return Err(SettingsError::InvalidBackoff {
                base_ms: backoff.base_delay_ms,
                max_ms: backoff.max_delay_ms,
            });
        }
    }

    Ok(())
}
