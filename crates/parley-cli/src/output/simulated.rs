//! Audio output that only keeps time.
//!
//! Clips are "played" by sleeping for their duration, read from the WAV
//! header when there is one. Useful on headless machines and for watching
//! the controller's ordering in the logs.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use parley_core::{
    AudioOutputError, AudioOutputPort, AudioSource, LoadedAudio, MediaEnd, PlayRequest,
    PlaybackCompletion,
};
use tokio::task::JoinHandle;

use super::read_asset;

/// Duration assumed for clips without a readable WAV header.
const FALLBACK_CLIP_DURATION: Duration = Duration::from_secs(1);

struct Clip {
    duration: Duration,
    timer: Option<JoinHandle<()>>,
}

pub struct SimulatedOutput {
    assets_dir: PathBuf,
    next_id: AtomicU64,
    clips: Mutex<HashMap<u64, Clip>>,
}

impl SimulatedOutput {
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            next_id: AtomicU64::new(1),
            clips: Mutex::new(HashMap::new()),
        }
    }

    fn clips(&self) -> std::sync::MutexGuard<'_, HashMap<u64, Clip>> {
        self.clips.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn abort_timer(&self, id: u64) {
        if let Some(timer) = self.clips().get_mut(&id).and_then(|clip| clip.timer.take()) {
            timer.abort();
        }
    }
}

#[async_trait]
impl AudioOutputPort for SimulatedOutput {
    fn load(&self, source: AudioSource) -> Result<LoadedAudio, AudioOutputError> {
        let (bytes, transient) = match source {
            AudioSource::Bytes { data, .. } => (data, true),
            AudioSource::Url(url) => (read_asset(&self.assets_dir, &url)?, false),
        };
        let duration = wav_duration(&bytes).unwrap_or(FALLBACK_CLIP_DURATION);

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.clips().insert(
            id,
            Clip {
                duration,
                timer: None,
            },
        );
        tracing::debug!(id, ?duration, transient, "Clip loaded");
        Ok(LoadedAudio::new(id, transient))
    }

    async fn play(&self, audio: &LoadedAudio) -> Result<PlayRequest, AudioOutputError> {
        let (done, completion) = PlaybackCompletion::channel();
        let mut clips = self.clips();
        let clip = clips
            .get_mut(&audio.id)
            .ok_or_else(|| AudioOutputError::Playback(format!("unknown clip {}", audio.id)))?;

        let duration = clip.duration;
        clip.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            done.finish(MediaEnd::Ended);
        }));
        tracing::info!(id = audio.id, ?duration, "▶ Playing clip");
        Ok(PlayRequest::Started(completion))
    }

    fn stop(&self, audio: &LoadedAudio) {
        self.abort_timer(audio.id);
        tracing::info!(id = audio.id, "■ Clip stopped");
    }

    fn release(&self, audio: LoadedAudio) {
        self.abort_timer(audio.id);
        self.clips().remove(&audio.id);
    }
}

/// Playback length of a RIFF/WAVE file, from its `fmt ` byte rate and
/// `data` chunk size.
pub(crate) fn wav_duration(bytes: &[u8]) -> Option<Duration> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return None;
    }

    let mut byte_rate = None;
    let mut offset = 12;
    while offset + 8 <= bytes.len() {
        let id = &bytes[offset..offset + 4];
        let size = u32::from_le_bytes(bytes[offset + 4..offset + 8].try_into().ok()?) as usize;
        let body = offset + 8;

        match id {
            b"fmt " if body + 12 <= bytes.len() => {
                byte_rate = Some(u32::from_le_bytes(bytes[body + 8..body + 12].try_into().ok()?));
            }
            b"data" => {
                let rate = byte_rate.filter(|rate| *rate > 0)?;
                // Streaming writers leave the size at 0 or u32::MAX.
                let size = size.min(bytes.len() - body);
                return Some(Duration::from_secs_f64(size as f64 / f64::from(rate)));
            }
            _ => {}
        }

        // Chunks are word aligned.
        offset = body.checked_add(size)?.checked_add(size % 2)?;
    }
    None
}
