//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces the controller expects from its collaborators.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `reqwest` types in any signature
//! - No audio device or media element details
//! - Async traits use `async_trait` so they stay dyn-compatible behind `Arc<dyn _>`

pub mod audio_output;
pub mod feed;
pub mod tts;
pub mod upload;

pub use audio_output::{
    AudioOutputError, AudioOutputPort, CompletionSender, LoadedAudio, MediaEnd, PlayRequest,
    PlaybackCompletion,
};
pub use feed::{ConnectivityEvent, FeedMediaEvent, FeedProbeError, FeedStatusPort, FeedSurfacePort};
pub use tts::{TtsClientPort, TtsPortError, TtsReply, TtsRequest};
pub use upload::{UploadError, UploadPort};
