//! Audio output port - the playback backend behind the controller.
//!
//! Models the browser media element as an explicit API so the playback
//! state machine works with any backend:
//!
//! ```text
//!   load(source) ──► play(&audio) ──► Started(completion) ──► Ended | Failed
//!                                  └► Blocked
//!   release(audio)   (always, after the terminal outcome)
//! ```

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::oneshot;

use crate::domain::AudioSource;

/// Handle to a resource created by [`AudioOutputPort::load`].
///
/// Not `Clone`: every handle is released exactly once.
#[derive(Debug, PartialEq, Eq)]
pub struct LoadedAudio {
    /// Backend-assigned identifier.
    pub id: u64,
    /// Whether the resource was created for this play call only
    /// (decoded bytes) rather than referencing a shared asset.
    pub transient: bool,
}

impl LoadedAudio {
    /// Create a handle.
    #[must_use]
    pub const fn new(id: u64, transient: bool) -> Self {
        Self { id, transient }
    }
}

/// How a started playback finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaEnd {
    /// Playback reached the end of the clip.
    Ended,
    /// The media pipeline failed mid-playback.
    Failed(String),
}

/// Sending half of a playback completion, held by the backend.
#[derive(Debug)]
pub struct CompletionSender(oneshot::Sender<MediaEnd>);

impl CompletionSender {
    /// Report how playback finished. Ignored if nobody is waiting anymore.
    pub fn finish(self, end: MediaEnd) {
        let _ = self.0.send(end);
    }
}

/// Receiving half of a playback completion, returned with [`PlayRequest::Started`].
#[derive(Debug)]
pub struct PlaybackCompletion(oneshot::Receiver<MediaEnd>);

impl PlaybackCompletion {
    /// Create a linked sender/completion pair.
    #[must_use]
    pub fn channel() -> (CompletionSender, Self) {
        let (tx, rx) = oneshot::channel();
        (CompletionSender(tx), Self(rx))
    }

    /// A completion that has already ended naturally.
    #[must_use]
    pub fn ended() -> Self {
        let (tx, completion) = Self::channel();
        tx.finish(MediaEnd::Ended);
        completion
    }

    /// Wait for playback to finish.
    ///
    /// A backend that drops the sender without reporting is treated as a
    /// media failure.
    pub async fn wait(self) -> MediaEnd {
        self.0
            .await
            .unwrap_or_else(|_| MediaEnd::Failed("playback backend dropped the session".to_string()))
    }
}

/// Resolution of a play request.
#[derive(Debug)]
pub enum PlayRequest {
    /// Playback started; `completion` resolves when it finishes.
    Started(PlaybackCompletion),
    /// The host refused to start playback (autoplay policy). Recoverable.
    Blocked {
        /// Backend-provided explanation.
        reason: String,
    },
}

/// Errors raised by an audio output backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AudioOutputError {
    /// The source could not be turned into a playable resource.
    #[error("Failed to load audio: {0}")]
    Load(String),

    /// The play request failed outright.
    #[error("Playback failed: {0}")]
    Playback(String),

    /// The backend cannot play this kind of source.
    #[error("Unsupported audio source: {0}")]
    Unsupported(String),
}

/// Backend-agnostic audio output.
#[async_trait]
pub trait AudioOutputPort: Send + Sync {
    /// Create a playable resource from `source`.
    fn load(&self, source: AudioSource) -> Result<LoadedAudio, AudioOutputError>;

    /// Request playback of a loaded resource.
    async fn play(&self, audio: &LoadedAudio) -> Result<PlayRequest, AudioOutputError>;

    /// Interrupt playback of `audio`. The pending completion may never fire.
    fn stop(&self, audio: &LoadedAudio);

    /// Release a resource created by [`load`](Self::load).
    fn release(&self, audio: LoadedAudio);
}
