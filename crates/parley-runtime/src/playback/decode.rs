//! Audio payload decoding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use parley_core::{AudioPayload, AudioSource, WAV_MIME};

use crate::error::PlaybackError;

/// Remove a `data:audio/<subtype>;base64,` prefix, if present.
pub fn strip_data_url(payload: &str) -> &str {
    let Some(rest) = payload.strip_prefix("data:audio/") else {
        return payload;
    };
    match rest.split_once(";base64,") {
        Some((subtype, body)) if !subtype.is_empty() && !subtype.contains(';') => body,
        _ => payload,
    }
}

/// Turn a chunk payload into a playable source.
///
/// Inline payloads are base64-decoded; asset payloads pass through as URLs.
pub fn decode_payload(payload: &AudioPayload) -> Result<AudioSource, PlaybackError> {
    match payload {
        AudioPayload::Inline(data) => {
            let cleaned = strip_data_url(data.trim());
            if cleaned.is_empty() {
                return Err(PlaybackError::EmptyPayload);
            }
            let bytes = STANDARD.decode(cleaned)?;
            if bytes.is_empty() {
                return Err(PlaybackError::EmptyPayload);
            }
            Ok(AudioSource::Bytes {
                data: bytes,
                mime: WAV_MIME,
            })
        }
        AudioPayload::Asset(url) => {
            if url.trim().is_empty() {
                return Err(PlaybackError::EmptyPayload);
            }
            Ok(AudioSource::Url(url.clone()))
        }
    }
}
