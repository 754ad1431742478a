//! Message-to-speech binding.
//!
//! Watches the chat transcript and decides which finalized assistant
//! messages are spoken. Admission marks the message processed first, so a
//! message is synthesized at most once no matter how often the transcript
//! is re-delivered.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use parley_core::{AudioChunk, ChatMessage, Settings, TtsClientPort, TtsRequest};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::playback::{PlayOutcome, PlaybackController};

/// Message ids already routed to synthesis.
#[derive(Debug, Default)]
pub struct ProcessedMessageSet {
    ids: Mutex<HashSet<String>>,
}

impl ProcessedMessageSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `id`; returns `false` if it was already present.
    pub fn insert(&self, id: &str) -> bool {
        self.lock().insert(id.to_string())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Binder tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct BinderConfig {
    pub voice: String,
    pub speed: f32,
    /// Trimmed content must be strictly longer than this to be spoken.
    pub min_spoken_chars: usize,
    /// Id of the scripted welcome message; never synthesized.
    pub bootstrap_message_id: String,
    pub synthesis_delay: Duration,
}

impl BinderConfig {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            voice: settings.tts_voice.clone(),
            speed: settings.tts_speed,
            min_spoken_chars: settings.min_spoken_chars,
            bootstrap_message_id: settings.bootstrap_message_id.clone(),
            synthesis_delay: settings.synthesis_delay(),
        }
    }
}

/// The pre-recorded welcome clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapClip {
    /// Greeting text, used as the clip's fingerprint text.
    pub text: String,
    /// Asset location handed to the audio output.
    pub asset: String,
    pub delay: Duration,
}

impl BootstrapClip {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            text: settings.bootstrap_text.clone(),
            asset: settings.bootstrap_asset.clone(),
            delay: settings.bootstrap_delay(),
        }
    }
}

/// What the binder did with a transcript update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinderDecision {
    /// Synthesis was scheduled for this message id.
    Admitted(String),
    /// The transcript is empty.
    Empty,
    /// The trailing message is not from the assistant.
    NotAssistant,
    /// The assistant is still generating.
    Generating,
    /// The trailing message was already routed to synthesis.
    AlreadyProcessed,
    /// The trailing message is the scripted welcome message.
    Bootstrap,
    /// The trailing message is too short to be worth speaking.
    TooShort { len: usize },
}

impl BinderDecision {
    #[must_use]
    pub const fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted(_))
    }
}

/// Routes finalized assistant messages to the TTS service and the
/// resulting audio to the playback controller.
pub struct MessageAudioBinder {
    config: BinderConfig,
    bootstrap: BootstrapClip,
    tts: Arc<dyn TtsClientPort>,
    controller: Arc<PlaybackController>,
    processed: Arc<ProcessedMessageSet>,
    bootstrapped: AtomicBool,
    tracker: TaskTracker,
    cancel: CancellationToken,
}

impl MessageAudioBinder {
    pub fn new(
        config: BinderConfig,
        bootstrap: BootstrapClip,
        tts: Arc<dyn TtsClientPort>,
        controller: Arc<PlaybackController>,
        processed: Arc<ProcessedMessageSet>,
    ) -> Self {
        Self {
            config,
            bootstrap,
            tts,
            controller,
            processed,
            bootstrapped: AtomicBool::new(false),
            tracker: TaskTracker::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// React to a transcript update.
    ///
    /// Only the trailing message is inspected. Must be called from within a
    /// tokio runtime when it may admit a message.
    pub fn on_messages(&self, messages: &[ChatMessage], is_generating: bool) -> BinderDecision {
        let decision = self.decide(messages, is_generating);
        if let BinderDecision::Admitted(id) = &decision {
            if let Some(message) = messages.last() {
                self.schedule_synthesis(id.clone(), message.trimmed().to_string());
            }
        }
        decision
    }

    fn decide(&self, messages: &[ChatMessage], is_generating: bool) -> BinderDecision {
        let Some(last) = messages.last() else {
            return BinderDecision::Empty;
        };
        if !last.is_assistant() {
            return BinderDecision::NotAssistant;
        }
        if is_generating {
            return BinderDecision::Generating;
        }
        if self.processed.contains(&last.id) {
            return BinderDecision::AlreadyProcessed;
        }
        if last.id == self.config.bootstrap_message_id {
            return BinderDecision::Bootstrap;
        }
        let len = last.spoken_len();
        if len <= self.config.min_spoken_chars {
            tracing::trace!(message_id = %last.id, len, "Message too short to speak");
            return BinderDecision::TooShort { len };
        }
        if !self.processed.insert(&last.id) {
            return BinderDecision::AlreadyProcessed;
        }
        BinderDecision::Admitted(last.id.clone())
    }

    fn schedule_synthesis(&self, message_id: String, text: String) {
        let request = TtsRequest {
            text,
            voice: self.config.voice.clone(),
            speed: self.config.speed,
        };
        let delay = self.config.synthesis_delay;
        let tts = Arc::clone(&self.tts);
        let controller = Arc::clone(&self.controller);
        let cancel = self.cancel.clone();

        tracing::debug!(message_id = %message_id, ?delay, "Scheduling speech synthesis");
        self.tracker.spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::debug!(message_id = %message_id, "Synthesis cancelled before request");
                    return;
                }
                () = tokio::time::sleep(delay) => {}
            }

            let reply = match tts.synthesize(&request).await {
                Ok(reply) => reply,
                Err(err) => {
                    tracing::warn!(message_id = %message_id, error = %err, "Speech synthesis failed");
                    return;
                }
            };
            let Some(audio) = reply.audio() else {
                tracing::debug!(
                    message_id = %message_id,
                    reason = reply.error.as_deref().unwrap_or("no audio"),
                    "TTS reply carried no playable audio"
                );
                return;
            };
            if cancel.is_cancelled() {
                tracing::debug!(message_id = %message_id, "Dropping synthesized audio after teardown");
                return;
            }

            let chunk = AudioChunk::inline(request.text, reply.duration.unwrap_or(0.0), audio);
            let outcome = controller.play(chunk).await;
            tracing::debug!(message_id = %message_id, ?outcome, "Spoken message finished");
        });
    }

    /// Schedule the welcome clip. Returns `false` if it was already scheduled.
    pub fn start_bootstrap(&self) -> bool {
        if self.bootstrapped.swap(true, Ordering::SeqCst) {
            return false;
        }

        let clip = self.bootstrap.clone();
        let controller = Arc::clone(&self.controller);
        let cancel = self.cancel.clone();

        tracing::info!(asset = %clip.asset, delay = ?clip.delay, "Scheduling welcome clip");
        self.tracker.spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return,
                () = tokio::time::sleep(clip.delay) => {}
            }
            let outcome = controller.play(AudioChunk::asset(clip.text, clip.asset)).await;
            if let PlayOutcome::Blocked { reason } = &outcome {
                tracing::info!(%reason, "Welcome clip blocked, user needs to interact first");
            } else {
                tracing::debug!(?outcome, "Welcome clip finished");
            }
        });
        true
    }

    /// Cancel pending delayed work. Tasks already past their delay finish
    /// their in-flight request but play nothing.
    pub fn teardown(&self) {
        self.cancel.cancel();
        self.tracker.close();
    }

    /// Whether [`teardown`](Self::teardown) was called.
    pub fn is_torn_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait for every outstanding binder task.
    pub async fn settle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        if !self.cancel.is_cancelled() {
            self.tracker.reopen();
        }
    }

    /// Number of binder tasks still running.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }
}

impl Drop for MessageAudioBinder {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
