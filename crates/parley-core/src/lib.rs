//! Core domain types and port definitions for parley.
//!
//! This crate holds the pieces every other parley crate agrees on:
//!
//! - `domain` - chat messages, audio chunks and fingerprints, feed state
//! - `ports` - trait abstractions over the external collaborators
//!   (TTS service, audio output, feed status endpoint, feed surface, uploads)
//! - `events` - playback lifecycle events and emitters
//! - `settings` - controller configuration and validation
//!
//! Nothing here performs I/O. Adapters live in `parley-http` and the
//! binary; the state machines live in `parley-runtime`.

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod events;
pub mod ports;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    AudioChunk, AudioPayload, AudioSource, ChatMessage, FeedConnectionState, FeedEndpoint,
    FeedResolution, FeedStatus, Fingerprint, MessageRole, UploadAnnotation, UploadFile, WAV_MIME,
};
pub use events::{ChannelEmitter, FanoutEmitter, PlaybackEvent, PlaybackEventEmitter};
pub use ports::{
    AudioOutputError, AudioOutputPort, CompletionSender, ConnectivityEvent, FeedMediaEvent,
    FeedProbeError, FeedStatusPort, FeedSurfacePort, LoadedAudio, MediaEnd, PlayRequest,
    PlaybackCompletion, TtsClientPort, TtsPortError, TtsReply, TtsRequest, UploadError,
    UploadPort,
};
pub use settings::{
    BackoffSettings, CameraSettings, DEFAULT_BACKEND_URL, DEFAULT_BOOTSTRAP_ASSET, DEFAULT_BOOTSTRAP_MESSAGE_ID,
    DEFAULT_MIN_SPOKEN_CHARS, DEFAULT_TTS_SPEED, DEFAULT_TTS_VOICE, Settings, SettingsError,
    backend_endpoint, validate_settings,
};
