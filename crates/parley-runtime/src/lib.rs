//! Client-side synchronization of chat, speech and video feeds.
//!
//! The runtime turns three independent asynchronous sources into one
//! coherent experience:
//!
//! ```text
//!   chat messages ──► MessageAudioBinder ──► TTS ──► PlaybackController ──► SpeakingState
//!                          │                          ▲        │
//!                          └── bootstrap clip ────────┘        └── AudioChunkDeduplicator
//!
//!   feed status + surface ──► StreamReconnector (one per camera, see FeedWall)
//! ```
//!
//! All state is owned by a [`ChatView`] or [`FeedWall`] instance; nothing is
//! process-global, so several views (or tests) never interfere.

pub mod binder;
pub mod dedup;
pub mod error;
pub mod feed;
pub mod playback;
pub mod speaking;
pub mod tray;
pub mod view;

// Re-export key types for convenience
pub use binder::{BinderConfig, BinderDecision, BootstrapClip, MessageAudioBinder, ProcessedMessageSet};
pub use dedup::AudioChunkDeduplicator;
pub use error::PlaybackError;
pub use feed::{BackoffPolicy, FeedWall, ReconnectorConfig, StreamReconnector, reasons};
pub use playback::{PlayOutcome, PlaybackController};
pub use speaking::SpeakingState;
pub use tray::AttachmentTray;
pub use view::{ChatView, ChatViewPorts};
