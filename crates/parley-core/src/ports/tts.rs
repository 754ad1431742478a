//! Text-to-speech service port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A synthesis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TtsRequest {
    /// Text to speak.
    pub text: String,
    /// Voice identifier (e.g. `"am_michael"`).
    pub voice: String,
    /// Speed multiplier.
    pub speed: f32,
}

/// Response of the TTS service.
///
/// A reply with `success == false` is not an error at the transport level;
/// it simply means no audio is available for this text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TtsReply {
    /// Whether synthesis succeeded.
    #[serde(default)]
    pub success: bool,
    /// Base64-encoded WAV audio.
    #[serde(default)]
    pub audio_data: Option<String>,
    /// Audio duration in seconds.
    #[serde(default)]
    pub duration: Option<f64>,
    /// Error message reported by the service.
    #[serde(default)]
    pub error: Option<String>,
}

impl TtsReply {
    /// The audio payload, if the reply carries usable audio.
    #[must_use]
    pub fn audio(&self) -> Option<&str> {
        if !self.success {
            return None;
        }
        self.audio_data.as_deref().filter(|a| !a.is_empty())
    }
}

/// Errors from a TTS request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TtsPortError {
    /// The service could not be reached.
    #[error("TTS service unreachable: {0}")]
    Network(String),

    /// The service answered with an error status.
    #[error("TTS service returned status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The response body could not be understood.
    #[error("Invalid TTS response: {0}")]
    InvalidResponse(String),
}

/// Client for the external speech synthesis service.
#[async_trait]
pub trait TtsClientPort: Send + Sync {
    /// Synthesize `request.text`.
    async fn synthesize(&self, request: &TtsRequest) -> Result<TtsReply, TtsPortError>;
}
