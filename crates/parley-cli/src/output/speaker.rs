//! Speaker output via `rodio`.
//!
//! `rodio::OutputStream` is `!Send` on some platforms, so the stream lives on
//! a dedicated thread and every sink operation is routed through a command
//! channel. [`SpeakerOutput`] is the `Send + Sync` proxy the controller holds.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, mpsc};
use std::thread;

use async_trait::async_trait;
use parley_core::{
    AudioOutputError, AudioOutputPort, AudioSource, CompletionSender, LoadedAudio, MediaEnd,
    PlayRequest, PlaybackCompletion,
};
use rodio::{Decoder, OutputStream, Sink};
use tokio::sync::oneshot;

use super::read_asset;

// ── Commands ───────────────────────────────────────────────────────

enum SpeakerCommand {
    Play {
        id: u64,
        bytes: Vec<u8>,
        done: CompletionSender,
        reply: oneshot::Sender<Result<(), AudioOutputError>>,
    },
    Stop {
        id: u64,
    },
    Shutdown,
}

// ── Handle ─────────────────────────────────────────────────────────

pub struct SpeakerOutput {
    assets_dir: PathBuf,
    next_id: AtomicU64,
    clips: Mutex<HashMap<u64, Vec<u8>>>,
    cmd_tx: mpsc::Sender<SpeakerCommand>,
    thread: Option<thread::JoinHandle<()>>,
}

impl SpeakerOutput {
    /// Open the default output device on a dedicated thread.
    pub fn spawn(assets_dir: impl Into<PathBuf>) -> Result<Self, AudioOutputError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (init_tx, init_rx) = mpsc::channel();

        let thread = thread::Builder::new()
            .name("parley-speaker".into())
            .spawn(move || run(cmd_rx, init_tx))
            .map_err(|e| AudioOutputError::Load(format!("failed to spawn speaker thread: {e}")))?;

        init_rx
            .recv()
            .map_err(|_| AudioOutputError::Load("speaker thread died during init".to_string()))??;

        Ok(Self::with_device(assets_dir.into(), cmd_tx, Some(thread)))
    }

    fn with_device(
        assets_dir: PathBuf,
        cmd_tx: mpsc::Sender<SpeakerCommand>,
        thread: Option<thread::JoinHandle<()>>,
    ) -> Self {
        Self {
            assets_dir,
            next_id: AtomicU64::new(1),
            clips: Mutex::new(HashMap::new()),
            cmd_tx,
            thread,
        }
    }

    fn send(&self, command: SpeakerCommand) {
        if self.cmd_tx.send(command).is_err() {
            tracing::warn!("Speaker thread is gone");
        }
    }
}

#[async_trait]
impl AudioOutputPort for SpeakerOutput {
    fn load(&self, source: AudioSource) -> Result<LoadedAudio, AudioOutputError> {
        let (bytes, transient) = match source {
            AudioSource::Bytes { data, .. } => (data, true),
            AudioSource::Url(url) => (read_asset(&self.assets_dir, &url)?, false),
        };
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.clips
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, bytes);
        Ok(LoadedAudio::new(id, transient))
    }

    async fn play(&self, audio: &LoadedAudio) -> Result<PlayRequest, AudioOutputError> {
        let bytes = self
            .clips
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&audio.id)
            .cloned()
            .ok_or_else(|| AudioOutputError::Playback(format!("unknown clip {}", audio.id)))?;

        let (done, completion) = PlaybackCompletion::channel();
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SpeakerCommand::Play {
            id: audio.id,
            bytes,
            done,
            reply: reply_tx,
        });
        reply_rx
            .await
            .map_err(|_| AudioOutputError::Playback("speaker thread died".to_string()))??;

        Ok(PlayRequest::Started(completion))
    }

    fn stop(&self, audio: &LoadedAudio) {
        self.send(SpeakerCommand::Stop { id: audio.id });
    }

    fn release(&self, audio: LoadedAudio) {
        self.send(SpeakerCommand::Stop { id: audio.id });
        self.clips
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&audio.id);
    }
}

impl Drop for SpeakerOutput {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(SpeakerCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

// ── Speaker thread ─────────────────────────────────────────────────

struct ActiveSink {
    sink: Arc<Sink>,
    stopped: Arc<AtomicBool>,
}

fn run(cmd_rx: mpsc::Receiver<SpeakerCommand>, init_tx: mpsc::Sender<Result<(), AudioOutputError>>) {
    let (_stream, handle) = match OutputStream::try_default() {
        Ok(pair) => pair,
        Err(e) => {
            let _ = init_tx.send(Err(AudioOutputError::Load(e.to_string())));
            return;
        }
    };
    let _ = init_tx.send(Ok(()));
    tracing::info!("Speaker output initialized on default device");

    let mut sinks: HashMap<u64, ActiveSink> = HashMap::new();
    while let Ok(command) = cmd_rx.recv() {
        match command {
            SpeakerCommand::Play {
                id,
                bytes,
                done,
                reply,
            } => {
                let started = Sink::try_new(&handle)
                    .map_err(|e| AudioOutputError::Playback(e.to_string()))
                    .and_then(|sink| {
                        let decoder = Decoder::new(Cursor::new(bytes))
                            .map_err(|e| AudioOutputError::Load(e.to_string()))?;
                        sink.append(decoder);
                        Ok(Arc::new(sink))
                    });

                match started {
                    Ok(sink) => {
                        let stopped = Arc::new(AtomicBool::new(false));
                        watch_completion(Arc::clone(&sink), Arc::clone(&stopped), done);
                        sinks.insert(id, ActiveSink { sink, stopped });
                        let _ = reply.send(Ok(()));
                    }
                    Err(e) => {
                        let _ = reply.send(Err(e));
                    }
                }
            }
            SpeakerCommand::Stop { id } => {
                if let Some(active) = sinks.remove(&id) {
                    active.stopped.store(true, Ordering::SeqCst);
                    active.sink.stop();
                }
            }
            SpeakerCommand::Shutdown => break,
        }
    }

    for active in sinks.into_values() {
        active.stopped.store(true, Ordering::SeqCst);
        active.sink.stop();
    }
    tracing::debug!("Speaker thread exiting");
}

/// Block a helper thread on the sink and report natural completion.
fn watch_completion(sink: Arc<Sink>, stopped: Arc<AtomicBool>, done: CompletionSender) {
    thread::spawn(move || {
        sink.sleep_until_end();
        // A stopped sink drains immediately; the controller is not waiting.
        if !stopped.load(Ordering::SeqCst) {
            done.finish(MediaEnd::Ended);
        }
    });
}
