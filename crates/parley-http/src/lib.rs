//! HTTP adapters for the parley ports.
//!
//! - [`HttpTtsClient`] implements `TtsClientPort` (form POST to the TTS endpoint)
//! - [`HttpFeedStatusProbe`] implements `FeedStatusPort`
//! - [`HttpFeedSurface`] implements `FeedSurfacePort` over the MJPEG stream
//! - [`HttpUploadClient`] implements `UploadPort` (multipart POST)
//!
//! Internal [`HttpError`]s are mapped to the core port errors at the
//! boundary.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

mod config;
mod error;
mod feed;
mod parsing;
mod tts;
mod upload;

// ============================================================================
// Public API
// ============================================================================

// Configuration
pub use config::HttpClientConfig;

// Errors
pub use error::{HttpError, HttpResult};

// Adapters
pub use feed::{HttpFeedStatusProbe, HttpFeedSurface};
pub use tts::HttpTtsClient;
pub use upload::HttpUploadClient;

// Parsing
pub use parsing::parse_feed_status;
