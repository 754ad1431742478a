//! Domain types shared across parley crates.
//!
//! These are plain data types with serde support. They carry no behavior
//! beyond small helpers and never touch the network or the audio device.

mod audio;
mod chat;
mod feed;
mod upload;

pub use audio::{AudioChunk, AudioPayload, AudioSource, Fingerprint, WAV_MIME};
pub use chat::{ChatMessage, MessageRole};
pub use feed::{FeedConnectionState, FeedEndpoint, FeedResolution, FeedStatus};
pub use upload::{UploadAnnotation, UploadFile};
