//! Chat view composition root.
//!
//! A [`ChatView`] owns every piece of per-view state: the played-chunk set,
//! the processed-message set, the speaking flag, the playback controller and
//! the binder. Dropping or tearing down the view cancels pending work.

use std::sync::Arc;

use parley_core::{
    AudioOutputPort, ChatMessage, FanoutEmitter, PlaybackEventEmitter, Settings, TtsClientPort,
    UploadPort,
};
use tokio::sync::watch;

use crate::binder::{BinderConfig, BinderDecision, BootstrapClip, MessageAudioBinder, ProcessedMessageSet};
use crate::dedup::AudioChunkDeduplicator;
use crate::playback::PlaybackController;
use crate::speaking::SpeakingState;
use crate::tray::AttachmentTray;

/// External collaborators of a chat view.
pub struct ChatViewPorts {
    pub tts: Arc<dyn TtsClientPort>,
    pub output: Arc<dyn AudioOutputPort>,
    pub upload: Option<Arc<dyn UploadPort>>,
    /// Extra listener for playback events, after the speaking flag.
    pub observer: Option<Arc<dyn PlaybackEventEmitter>>,
}

impl ChatViewPorts {
    pub fn new(tts: Arc<dyn TtsClientPort>, output: Arc<dyn AudioOutputPort>) -> Self {
        Self {
            tts,
            output,
            upload: None,
            observer: None,
        }
    }

    #[must_use]
    pub fn with_upload(mut self, upload: Arc<dyn UploadPort>) -> Self {
        self.upload = Some(upload);
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn PlaybackEventEmitter>) -> Self {
        self.observer = Some(observer);
        self
    }
}

/// One chat view with speech output.
pub struct ChatView {
    dedup: Arc<AudioChunkDeduplicator>,
    processed: Arc<ProcessedMessageSet>,
    speaking: SpeakingState,
    controller: Arc<PlaybackController>,
    binder: MessageAudioBinder,
    tray: Option<AttachmentTray>,
}

impl ChatView {
    pub fn new(settings: &Settings, ports: ChatViewPorts) -> Self {
        let dedup = Arc::new(AudioChunkDeduplicator::new());
        let processed = Arc::new(ProcessedMessageSet::new());
        let speaking = SpeakingState::new();

        let mut emitter = FanoutEmitter::new(vec![Arc::new(speaking.clone())]);
        if let Some(observer) = ports.observer {
            emitter.push(observer);
        }

        let controller = Arc::new(PlaybackController::new(
            Arc::clone(&dedup),
            ports.output,
            Arc::new(emitter),
        ));
        let binder = MessageAudioBinder::new(
            BinderConfig::from_settings(settings),
            BootstrapClip::from_settings(settings),
            ports.tts,
            Arc::clone(&controller),
            Arc::clone(&processed),
        );

        Self {
            dedup,
            processed,
            speaking,
            controller,
            binder,
            tray: ports.upload.map(AttachmentTray::new),
        }
    }

    /// Feed a transcript update to the binder.
    pub fn on_messages(&self, messages: &[ChatMessage], is_generating: bool) -> BinderDecision {
        self.binder.on_messages(messages, is_generating)
    }

    /// Schedule the welcome clip once.
    pub fn start_bootstrap(&self) -> bool {
        self.binder.start_bootstrap()
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking.is_speaking()
    }

    pub fn subscribe_speaking(&self) -> watch::Receiver<bool> {
        self.speaking.subscribe()
    }

    pub fn controller(&self) -> &Arc<PlaybackController> {
        &self.controller
    }

    pub fn dedup(&self) -> &AudioChunkDeduplicator {
        &self.dedup
    }

    pub fn processed(&self) -> &ProcessedMessageSet {
        &self.processed
    }

    /// Attachment tray, when an upload port was provided.
    pub fn tray(&self) -> Option<&AttachmentTray> {
        self.tray.as_ref()
    }

    /// Wait until every scheduled synthesis and playback has finished.
    pub async fn settle(&self) {
        self.binder.settle().await;
    }

    /// Cancel pending work and stop playback.
    pub fn teardown(&self) {
        tracing::debug!("Tearing down chat view");
        self.binder.teardown();
        self.controller.shutdown();
    }
}

impl Drop for ChatView {
    fn drop(&mut self) {
        self.teardown();
    }
}
