//! Parsing of backend JSON payloads.

use parley_core::{FeedResolution, FeedStatus};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{HttpError, HttpResult};

/// Single-camera status document.
#[derive(Debug, Deserialize)]
struct SingleCameraStatus {
    webcam_available: bool,
    #[serde(default)]
    resolution: Option<FeedResolution>,
}

/// One entry of the per-camera status map (`"camera_0": {...}`).
#[derive(Debug, Deserialize)]
struct CameraEntry {
    #[serde(default)]
    available: bool,
    width: Option<u32>,
    height: Option<u32>,
    fps: Option<u32>,
}

impl CameraEntry {
    fn into_status(self) -> FeedStatus {
        let resolution = match (self.width, self.height) {
            (Some(width), Some(height)) if self.available => Some(FeedResolution {
                width,
                height,
                fps: self.fps.unwrap_or(0),
            }),
            _ => None,
        };
        FeedStatus {
            available: self.available,
            resolution,
        }
    }
}

/// Interpret a feed status document.
///
/// Accepts either `{webcam_available, resolution?}` or the per-camera map
/// keyed `camera_<index>`. A camera missing from the map is unavailable.
pub fn parse_feed_status(body: &Value, camera_index: Option<u32>) -> HttpResult<FeedStatus> {
    let Some(object) = body.as_object() else {
        return Err(HttpError::InvalidResponse {
            message: "feed status is not a JSON object".to_string(),
        });
    };

    if object.contains_key("webcam_available") {
        let single: SingleCameraStatus = serde_json::from_value(body.clone())?;
        return Ok(FeedStatus {
            available: single.webcam_available,
            resolution: single.resolution,
        });
    }

    let key = format!("camera_{}", camera_index.unwrap_or(0));
    match object.get(&key) {
        Some(entry) => {
            let entry: CameraEntry = serde_json::from_value(entry.clone())?;
            Ok(entry.into_status())
        }
        None if object.keys().any(|k| k.starts_with("camera_")) => Ok(FeedStatus::unavailable()),
        None => Err(HttpError::InvalidResponse {
            message: format!("feed status has neither 'webcam_available' nor '{key}'"),
        }),
    }
}
