//! Playback controller - owns the single playback slot.
//!
//! Each admitted chunk becomes one playback session:
//!
//! ```text
//!   Idle ──► Playing ──► Terminal { Ended | Error | Blocked | Stopped }
//! ```
//!
//! At most one session holds the output at a time. A chunk admitted while
//! another session is active queues behind it (the slot is a FIFO-fair async
//! mutex) and starts once the earlier session reaches its terminal event.
//! Queued sessions have already emitted `AttemptStarted`.

mod decode;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use parley_core::{
    AudioChunk, AudioOutputPort, LoadedAudio, MediaEnd, PlayRequest, PlaybackEvent,
    PlaybackEventEmitter,
};
use tokio_util::sync::CancellationToken;

use crate::dedup::AudioChunkDeduplicator;
use crate::error::PlaybackError;

pub use decode::{decode_payload, strip_data_url};

/// Result of [`PlaybackController::play`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The chunk was already played; nothing happened.
    Skipped,
    /// Playback completed naturally.
    Ended,
    /// The host refused to start playback. Not an error.
    Blocked {
        /// Backend explanation.
        reason: String,
    },
    /// Decode or playback failed.
    Failed(PlaybackError),
    /// Interrupted by `stop` or teardown.
    Stopped,
}

impl PlayOutcome {
    /// The terminal event for a session that ended with this outcome.
    fn terminal_event(&self, session: u64) -> Option<PlaybackEvent> {
        match self {
            Self::Skipped => None,
            Self::Ended => Some(PlaybackEvent::Ended { session }),
            Self::Blocked { reason } => Some(PlaybackEvent::Blocked {
                session,
                reason: reason.clone(),
            }),
            Self::Failed(err) => Some(PlaybackEvent::Error {
                session,
                reason: err.to_string(),
            }),
            Self::Stopped => Some(PlaybackEvent::Stopped { session }),
        }
    }
}

/// A resource created by the output for one session; released on drop.
struct TransientResource {
    output: Arc<dyn AudioOutputPort>,
    audio: Option<LoadedAudio>,
}

impl TransientResource {
    fn new(output: Arc<dyn AudioOutputPort>, audio: LoadedAudio) -> Self {
        Self {
            output,
            audio: Some(audio),
        }
    }

    fn audio(&self) -> &LoadedAudio {
        self.audio.as_ref().expect("audio is only taken on drop")
    }
}

impl Drop for TransientResource {
    fn drop(&mut self) {
        if let Some(audio) = self.audio.take() {
            tracing::trace!(id = audio.id, transient = audio.transient, "Releasing audio resource");
            self.output.release(audio);
        }
    }
}

#[derive(Debug)]
struct ActiveSession {
    id: u64,
    cancel: CancellationToken,
}

/// Plays audio chunks one at a time and reports their lifecycle.
pub struct PlaybackController {
    dedup: Arc<AudioChunkDeduplicator>,
    output: Arc<dyn AudioOutputPort>,
    emitter: Arc<dyn PlaybackEventEmitter>,
    slot: tokio::sync::Mutex<()>,
    next_session: AtomicU64,
    active: Mutex<Option<ActiveSession>>,
    shutdown: CancellationToken,
}

impl PlaybackController {
    /// Create a controller.
    pub fn new(
        dedup: Arc<AudioChunkDeduplicator>,
        output: Arc<dyn AudioOutputPort>,
        emitter: Arc<dyn PlaybackEventEmitter>,
    ) -> Self {
        Self {
            dedup,
            output,
            emitter,
            slot: tokio::sync::Mutex::new(()),
            next_session: AtomicU64::new(1),
            active: Mutex::new(None),
            shutdown: CancellationToken::new(),
        }
    }

    /// Play `chunk` and wait for its terminal outcome.
    ///
    /// Chunks whose fingerprint was already admitted return
    /// [`PlayOutcome::Skipped`] without emitting events. Otherwise the call
    /// emits `AttemptStarted` at admission, waits for the playback slot,
    /// then emits optionally `PlayStarted` and exactly one terminal event.
    ///
    /// A queued chunk is outstanding from admission on, so the speaking
    /// flag stays up across the gap between two queued sessions.
    pub async fn play(&self, chunk: AudioChunk) -> PlayOutcome {
        let fingerprint = chunk.fingerprint();
        // Admission marks the fingerprint played even if the chunk is later
        // refused by `shutdown` while queued; a shut-down controller never
        // plays again.
        if !self.dedup.admit(&fingerprint) {
            tracing::debug!(%fingerprint, "Skipping already played chunk");
            return PlayOutcome::Skipped;
        }

        let session = self.next_session.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(session, text = %chunk.text, "Playback attempt started");
        self.emitter.emit(&PlaybackEvent::AttemptStarted {
            session,
            text: chunk.text.clone(),
        });

        let _slot = tokio::select! {
            biased;
            () = self.shutdown.cancelled() => {
                tracing::debug!(session, "Queued chunk refused, controller shut down");
                self.emitter.emit(&PlaybackEvent::Stopped { session });
                return PlayOutcome::Stopped;
            }
            guard = self.slot.lock() => guard,
        };

        let cancel = self.shutdown.child_token();
        self.set_active(Some(ActiveSession {
            id: session,
            cancel: cancel.clone(),
        }));

        let (outcome, resource) = self.run_session(session, &chunk, &cancel).await;

        if let Some(event) = outcome.terminal_event(session) {
            self.emitter.emit(&event);
        }
        // Released after the terminal event, whether or not play ever started.
        drop(resource);
        self.set_active(None);

        match &outcome {
            PlayOutcome::Failed(err) => tracing::warn!(session, error = %err, "Playback failed"),
            PlayOutcome::Blocked { reason } => {
                tracing::info!(session, %reason, "Playback blocked by host, waiting for user interaction");
            }
            other => tracing::debug!(session, outcome = ?other, "Playback finished"),
        }
        outcome
    }

    async fn run_session(
        &self,
        session: u64,
        chunk: &AudioChunk,
        cancel: &CancellationToken,
    ) -> (PlayOutcome, Option<TransientResource>) {
        let source = match decode_payload(&chunk.payload) {
            Ok(source) => source,
            Err(err) => return (PlayOutcome::Failed(err), None),
        };
        tracing::trace!(session, kind = source.kind(), "Decoded audio source");

        let loaded = match self.output.load(source) {
            Ok(loaded) => loaded,
            Err(err) => return (PlayOutcome::Failed(err.into()), None),
        };
        let resource = TransientResource::new(Arc::clone(&self.output), loaded);

        let request = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            request = self.output.play(resource.audio()) => Some(request),
        };
        let Some(request) = request else {
            self.output.stop(resource.audio());
            return (PlayOutcome::Stopped, Some(resource));
        };

        let completion = match request {
            Ok(PlayRequest::Started(completion)) => completion,
            Ok(PlayRequest::Blocked { reason }) => {
                return (PlayOutcome::Blocked { reason }, Some(resource));
            }
            Err(err) => return (PlayOutcome::Failed(err.into()), Some(resource)),
        };

        self.emitter.emit(&PlaybackEvent::PlayStarted { session });

        let end = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            end = completion.wait() => Some(end),
        };
        let outcome = match end {
            Some(MediaEnd::Ended) => PlayOutcome::Ended,
            Some(MediaEnd::Failed(reason)) => PlayOutcome::Failed(PlaybackError::Media(reason)),
            None => {
                self.output.stop(resource.audio());
                PlayOutcome::Stopped
            }
        };
        (outcome, Some(resource))
    }

    /// Identifier of the session currently holding the slot.
    pub fn active_session(&self) -> Option<u64> {
        self.lock_active().as_ref().map(|s| s.id)
    }

    /// Interrupt the active session, if any. Queued chunks still play.
    pub fn stop(&self) {
        if let Some(active) = self.lock_active().as_ref() {
            tracing::debug!(session = active.id, "Stopping playback");
            active.cancel.cancel();
        }
    }

    /// Stop the active session and refuse every queued or future chunk.
    pub fn shutdown(&self) {
        tracing::debug!("Shutting down playback controller");
        self.shutdown.cancel();
    }

    /// Whether [`shutdown`](Self::shutdown) was called.
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    fn set_active(&self, session: Option<ActiveSession>) {
        *self.lock_active() = session;
    }

    fn lock_active(&self) -> std::sync::MutexGuard<'_, Option<ActiveSession>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
