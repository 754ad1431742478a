//! Video feed ports: status probe and media surface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{FeedEndpoint, FeedStatus};

/// Errors from the feed status probe.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeedProbeError {
    /// The status endpoint could not be reached.
    #[error("Feed status endpoint unreachable: {0}")]
    Unreachable(String),

    /// The status endpoint answered with an error status.
    #[error("Feed status endpoint returned status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The status body could not be parsed.
    #[error("Invalid feed status response: {0}")]
    InvalidResponse(String),
}

/// Queries whether a feed's resource exists before loading it.
#[async_trait]
pub trait FeedStatusPort: Send + Sync {
    /// Probe the status endpoint of `endpoint`.
    async fn probe(&self, endpoint: &FeedEndpoint) -> Result<FeedStatus, FeedProbeError>;
}

/// The element that displays a feed (the browser `<img>` source attribute).
///
/// Load and error outcomes are reported back as [`FeedMediaEvent`]s.
pub trait FeedSurfacePort: Send + Sync {
    /// Assign `url` as the surface source and begin loading.
    fn attach(&self, url: &str);

    /// Clear the surface source, releasing the underlying stream.
    fn detach(&self);
}

/// Load outcome reported by a feed surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedMediaEvent {
    /// The stream delivered data.
    Loaded,
    /// The stream failed to load.
    Failed {
        /// Backend explanation, for logs only.
        detail: String,
    },
}

/// Host network connectivity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityEvent {
    /// The host regained network connectivity.
    Online,
    /// The host lost network connectivity.
    Offline,
}
