//! Audio chunk types and deduplication fingerprints.

use std::fmt;

use serde::{Deserialize, Serialize};

/// MIME type of synthesized speech and of the bootstrap clip.
pub const WAV_MIME: &str = "audio/wav";

/// Deduplication key of an audio chunk: spoken text plus reported duration.
///
/// The message identifier is deliberately not part of the key; the same
/// text can reach playback through different paths (scripted greeting vs.
/// synthesized reply).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    text: String,
    // f64 is not Hash; the bit pattern is, once -0.0 is folded into 0.0.
    duration_bits: u64,
}

impl Fingerprint {
    /// Build a fingerprint from spoken text and duration in seconds.
    pub fn new(text: impl Into<String>, duration: f64) -> Self {
        let duration = if duration == 0.0 { 0.0 } else { duration };
        Self {
            text: text.into(),
            duration_bits: duration.to_bits(),
        }
    }

    /// Spoken text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Reported duration in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        f64::from_bits(self.duration_bits)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.text, self.duration())
    }
}

/// Where the audio bytes of a chunk come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AudioPayload {
    /// Base64-encoded audio returned by the TTS service.
    Inline(String),
    /// Static asset served by the application (the bootstrap clip).
    Asset(String),
}

/// One unit of speech to be played.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioChunk {
    /// The spoken content.
    pub text: String,
    /// Duration in seconds as reported by the producer (informational).
    pub duration: f64,
    /// Encoded audio or asset location.
    pub payload: AudioPayload,
    /// Whether this is the last chunk of its utterance.
    pub is_final: bool,
    /// Position within the utterance, when the producer reports it.
    pub chunk_index: Option<u32>,
}

impl AudioChunk {
    /// A single, final chunk carrying inline base64 audio.
    pub fn inline(text: impl Into<String>, duration: f64, audio_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            duration,
            payload: AudioPayload::Inline(audio_data.into()),
            is_final: true,
            chunk_index: Some(0),
        }
    }

    /// A chunk backed by a static asset URL.
    pub fn asset(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            duration: 0.0,
            payload: AudioPayload::Asset(url.into()),
            is_final: true,
            chunk_index: None,
        }
    }

    /// Deduplication key of this chunk.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::new(self.text.clone(), self.duration)
    }
}

/// A playable source handed to the audio output after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioSource {
    /// Decoded audio bytes.
    Bytes {
        /// Raw encoded audio (e.g. a WAV file).
        data: Vec<u8>,
        /// MIME type of `data`.
        mime: &'static str,
    },
    /// A location the output resolves itself.
    Url(String),
}

impl AudioSource {
    /// Short label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bytes { .. } => "bytes",
            Self::Url(_) => "url",
        }
    }
}
