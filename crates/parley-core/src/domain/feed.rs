//! Video feed connection types.

use serde::{Deserialize, Serialize};

/// Connection state of one video feed.
///
/// Mutated only by the stream reconnector. Initial state is `Connecting`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum FeedConnectionState {
    /// Probing the status endpoint or waiting for the stream to load.
    Connecting,
    /// Frames are arriving.
    Live,
    /// The feed failed; `reason` is shown to the user.
    Error {
        /// Human-readable failure reason.
        reason: String,
    },
}

impl FeedConnectionState {
    /// Build an error state.
    pub fn error(reason: impl Into<String>) -> Self {
        Self::Error {
            reason: reason.into(),
        }
    }

    /// Check if the feed is live.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }

    /// Check if the feed is in the error state.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// The error reason, if any.
    #[must_use]
    pub fn error_reason(&self) -> Option<&str> {
        match self {
            Self::Error { reason } => Some(reason),
            _ => None,
        }
    }

    /// Whether the failure is connectivity related.
    ///
    /// Only these errors are retried automatically when the host comes back
    /// online. Matching is a plain substring test on `"connect"`.
    #[must_use]
    pub fn is_connectivity_error(&self) -> bool {
        self.error_reason().is_some_and(|r| r.contains("connect"))
    }
}

/// Frame geometry reported by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedResolution {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second.
    pub fps: u32,
}

/// Result of a feed status probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedStatus {
    /// Whether the camera behind the feed is available.
    pub available: bool,
    /// Informational descriptor, only used for display.
    pub resolution: Option<FeedResolution>,
}

impl FeedStatus {
    /// An available feed without a resolution descriptor.
    #[must_use]
    pub const fn available() -> Self {
        Self {
            available: true,
            resolution: None,
        }
    }

    /// A feed whose resource is confirmed absent.
    #[must_use]
    pub const fn unavailable() -> Self {
        Self {
            available: false,
            resolution: None,
        }
    }

    /// Display label like `1280x720 @ 30fps`.
    #[must_use]
    pub fn resolution_label(&self) -> Option<String> {
        self.resolution
            .map(|r| format!("{}x{} @ {}fps", r.width, r.height, r.fps))
    }
}

/// Addresses of one video feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEndpoint {
    /// Camera index on the backend, if the feed selects one.
    pub camera_index: Option<u32>,
    /// Human-readable label (e.g. "global top view").
    pub label: String,
    /// URL of the status endpoint.
    pub status_url: String,
    /// URL assigned to the media surface.
    pub stream_url: String,
}
