//! Hand-written fakes shared by the runtime integration tests.
//!
//! The fakes record every call so tests can assert on ordering, resource
//! release and concurrency without real audio or network access.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use parley_core::{
    AudioOutputError, AudioOutputPort, AudioSource, CompletionSender, FeedSurfacePort, LoadedAudio,
    MediaEnd, PlayRequest, PlaybackCompletion, PlaybackEvent, PlaybackEventEmitter, TtsClientPort,
    TtsPortError, TtsReply, TtsRequest,
};

/// `"RIFF"` in base64, a valid non-empty payload.
pub const WAV_B64: &str = "UklGRg==";

// ── Audio output ───────────────────────────────────────────────────

/// How the fake output answers a play request.
#[derive(Debug, Clone)]
pub enum PlayBehavior {
    /// Start, then end naturally after the given time.
    Complete(Duration),
    /// Refuse to start (autoplay policy).
    Block(String),
    /// Reject the play request.
    Reject(String),
    /// Start, then fail mid-stream after the given time.
    FailAfter(Duration, String),
    /// Start and never finish on its own.
    Hold,
}

#[derive(Debug, Default)]
struct OutputLog {
    next_id: u64,
    live: usize,
    max_live: usize,
    loaded: Vec<AudioSource>,
    played: Vec<u64>,
    stopped: Vec<u64>,
    released: Vec<u64>,
    held: Vec<CompletionSender>,
}

/// Audio output that records everything and plays nothing.
pub struct FakeOutput {
    script: Mutex<VecDeque<PlayBehavior>>,
    fallback: PlayBehavior,
    log: Mutex<OutputLog>,
}

impl FakeOutput {
    /// Every play completes after `duration`.
    pub fn completing(duration: Duration) -> Arc<Self> {
        Self::with_fallback(PlayBehavior::Complete(duration))
    }

    pub fn with_fallback(fallback: PlayBehavior) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            log: Mutex::new(OutputLog::default()),
        })
    }

    /// Plays take behaviors from `script` in order, then the fallback.
    pub fn scripted(script: Vec<PlayBehavior>, fallback: PlayBehavior) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback,
            log: Mutex::new(OutputLog::default()),
        })
    }

    pub fn loads(&self) -> usize {
        self.log.lock().unwrap().loaded.len()
    }

    pub fn loaded_sources(&self) -> Vec<AudioSource> {
        self.log.lock().unwrap().loaded.clone()
    }

    pub fn plays(&self) -> usize {
        self.log.lock().unwrap().played.len()
    }

    pub fn stops(&self) -> usize {
        self.log.lock().unwrap().stopped.len()
    }

    pub fn released(&self) -> Vec<u64> {
        self.log.lock().unwrap().released.clone()
    }

    /// Resources loaded and not yet released.
    pub fn live(&self) -> usize {
        self.log.lock().unwrap().live
    }

    /// Highest number of simultaneously loaded resources.
    pub fn max_live(&self) -> usize {
        self.log.lock().unwrap().max_live
    }

    fn next_behavior(&self) -> PlayBehavior {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

fn finish_after(tx: CompletionSender, after: Duration, end: MediaEnd) {
    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        tx.finish(end);
    });
}

#[async_trait]
impl AudioOutputPort for FakeOutput {
    fn load(&self, source: AudioSource) -> Result<LoadedAudio, AudioOutputError> {
        let mut log = self.log.lock().unwrap();
        log.next_id += 1;
        log.live += 1;
        log.max_live = log.max_live.max(log.live);
        let transient = matches!(source, AudioSource::Bytes { .. });
        log.loaded.push(source);
        Ok(LoadedAudio::new(log.next_id, transient))
    }

    async fn play(&self, audio: &LoadedAudio) -> Result<PlayRequest, AudioOutputError> {
        self.log.lock().unwrap().played.push(audio.id);
        match self.next_behavior() {
            PlayBehavior::Complete(after) => {
                let (tx, completion) = PlaybackCompletion::channel();
                finish_after(tx, after, MediaEnd::Ended);
                Ok(PlayRequest::Started(completion))
            }
            PlayBehavior::Block(reason) => Ok(PlayRequest::Blocked { reason }),
            PlayBehavior::Reject(reason) => Err(AudioOutputError::Playback(reason)),
            PlayBehavior::FailAfter(after, reason) => {
                let (tx, completion) = PlaybackCompletion::channel();
                finish_after(tx, after, MediaEnd::Failed(reason));
                Ok(PlayRequest::Started(completion))
            }
            PlayBehavior::Hold => {
                let (tx, completion) = PlaybackCompletion::channel();
                self.log.lock().unwrap().held.push(tx);
                Ok(PlayRequest::Started(completion))
            }
        }
    }

    fn stop(&self, audio: &LoadedAudio) {
        self.log.lock().unwrap().stopped.push(audio.id);
    }

    fn release(&self, audio: LoadedAudio) {
        let mut log = self.log.lock().unwrap();
        log.live -= 1;
        log.released.push(audio.id);
    }
}

// ── Events ─────────────────────────────────────────────────────────

/// Emitter that keeps every event.
#[derive(Default)]
pub struct RecordingEmitter {
    events: Mutex<Vec<PlaybackEvent>>,
}

impl RecordingEmitter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<PlaybackEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Event names in order, e.g. `["attempt_started", "play_started", "ended"]`.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events().iter().map(kind).collect()
    }
}

impl PlaybackEventEmitter for RecordingEmitter {
    fn emit(&self, event: &PlaybackEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub fn kind(event: &PlaybackEvent) -> &'static str {
    match event {
        PlaybackEvent::AttemptStarted { .. } => "attempt_started",
        PlaybackEvent::PlayStarted { .. } => "play_started",
        PlaybackEvent::Ended { .. } => "ended",
        PlaybackEvent::Error { .. } => "error",
        PlaybackEvent::Blocked { .. } => "blocked",
        PlaybackEvent::Stopped { .. } => "stopped",
    }
}

// ── TTS ────────────────────────────────────────────────────────────

/// TTS client answering every request the same way.
pub struct FakeTts {
    reply: Result<TtsReply, TtsPortError>,
    requests: Mutex<Vec<TtsRequest>>,
    calls: AtomicUsize,
}

impl FakeTts {
    /// Successful replies carrying [`WAV_B64`].
    pub fn speaking(duration: f64) -> Arc<Self> {
        Self::replying(Ok(TtsReply {
            success: true,
            audio_data: Some(WAV_B64.to_string()),
            duration: Some(duration),
            error: None,
        }))
    }

    pub fn replying(reply: Result<TtsReply, TtsPortError>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<TtsRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TtsClientPort for FakeTts {
    async fn synthesize(&self, request: &TtsRequest) -> Result<TtsReply, TtsPortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.reply.clone()
    }
}

// ── Feed surface ───────────────────────────────────────────────────

/// Surface that records attach and detach calls.
#[derive(Default)]
pub struct FakeSurface {
    attached: Mutex<Vec<String>>,
    detaches: AtomicUsize,
}

impl FakeSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn attached(&self) -> Vec<String> {
        self.attached.lock().unwrap().clone()
    }

    pub fn attaches(&self) -> usize {
        self.attached.lock().unwrap().len()
    }

    pub fn detaches(&self) -> usize {
        self.detaches.load(Ordering::SeqCst)
    }
}

impl FeedSurfacePort for FakeSurface {
    fn attach(&self, url: &str) {
        self.attached.lock().unwrap().push(url.to_string());
    }

    fn detach(&self) {
        self.detaches.fetch_add(1, Ordering::SeqCst);
    }
}
