//! Playback error types.

use parley_core::AudioOutputError;

/// Errors that end a playback session with an `Error` event.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum PlaybackError {
    /// The audio payload was empty.
    #[error("Audio payload is empty")]
    EmptyPayload,

    /// The audio payload was not valid base64.
    #[error("Audio payload is not valid base64: {0}")]
    Decode(String),

    /// The output backend rejected the source or the play request.
    #[error(transparent)]
    Output(#[from] AudioOutputError),

    /// Playback started but the media pipeline failed.
    #[error("Playback failed mid-stream: {0}")]
    Media(String),
}

impl From<base64::DecodeError> for PlaybackError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Decode(err.to_string())
    }
}
