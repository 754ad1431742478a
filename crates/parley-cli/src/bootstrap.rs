//! CLI bootstrap - the composition root.
//!
//! The only place where the HTTP adapters, the audio output and the runtime
//! state machines are wired together. Handlers receive a [`CliContext`] and
//! ask it for a composed chat view or feed wall.

use std::sync::Arc;

use anyhow::{Context, Result};
use parley_core::{CameraSettings, ChannelEmitter, FeedStatusPort, PlaybackEvent};
use parley_http::{HttpClientConfig, HttpFeedStatusProbe, HttpFeedSurface, HttpTtsClient, HttpUploadClient};
use parley_runtime::{ChatView, ChatViewPorts, FeedWall, ReconnectorConfig, StreamReconnector};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::config::CliConfig;
use crate::output::default_output;

/// Fully composed context for CLI commands.
pub struct CliContext {
    pub config: CliConfig,
    pub http: HttpClientConfig,
}

impl CliContext {
    /// Build a chat view speaking through the default output. Playback
    /// events are printed by a background task. Must be called from within
    /// the runtime.
    pub fn chat_view(&self) -> Result<ChatView> {
        let tts = HttpTtsClient::new(&self.http).context("Failed to create TTS client")?;
        let upload = HttpUploadClient::new(&self.http).context("Failed to create upload client")?;
        let output = default_output(&self.config.assets_dir);

        let (observer, events) = ChannelEmitter::new();
        tokio::spawn(print_events(events));

        let ports = ChatViewPorts::new(Arc::new(tts), output)
            .with_upload(Arc::new(upload))
            .with_observer(Arc::new(observer));
        Ok(ChatView::new(&self.config.settings, ports))
    }

    /// Build a feed wall for the given cameras (all configured cameras when
    /// `indices` is empty).
    pub fn feed_wall(&self, indices: &[u32]) -> Result<FeedWall> {
        let settings = &self.config.settings;
        let probe: Arc<dyn FeedStatusPort> =
            Arc::new(HttpFeedStatusProbe::new(&self.http).context("Failed to create feed probe")?);

        let mut wall = FeedWall::new();
        for camera in select_cameras(&settings.cameras, indices) {
            let (surface, media) =
                HttpFeedSurface::new(&self.http).context("Failed to create feed surface")?;
            let feed = StreamReconnector::new(
                settings.feed_endpoint(&camera),
                Arc::clone(&probe),
                Arc::new(surface),
                ReconnectorConfig::from_settings(settings),
            );
            wall.add(feed, media);
        }
        Ok(wall)
    }
}

/// Compose the CLI context.
pub fn bootstrap(config: CliConfig) -> CliContext {
    let http = HttpClientConfig::from_settings(&config.settings);
    CliContext { config, http }
}

/// Cameras to watch, in the requested order. Unknown indices get a generic
/// label.
fn select_cameras(configured: &[CameraSettings], indices: &[u32]) -> Vec<CameraSettings> {
    if indices.is_empty() {
        return configured.to_vec();
    }
    indices
        .iter()
        .map(|&index| {
            configured
                .iter()
                .find(|camera| camera.index == index)
                .cloned()
                .unwrap_or_else(|| CameraSettings {
                    index,
                    label: format!("camera {index}"),
                })
        })
        .collect()
}

/// Print playback milestones until every sender is gone.
async fn print_events(mut events: UnboundedReceiver<PlaybackEvent>) {
    while let Some(event) = events.recv().await {
        match describe_event(&event) {
            Some(line) => println!("{line}"),
            None => tracing::debug!(?event, "Playback event"),
        }
    }
}

/// User-facing line for an event, if it deserves one.
fn describe_event(event: &PlaybackEvent) -> Option<String> {
    match event {
        PlaybackEvent::AttemptStarted { session, text } => Some(format!("🔊 [{session}] {text}")),
        PlaybackEvent::Blocked { session, reason } => {
            Some(format!("⏸  [{session}] playback blocked: {reason}"))
        }
        PlaybackEvent::Error { session, reason } => {
            Some(format!("✗  [{session}] playback failed: {reason}"))
        }
        PlaybackEvent::PlayStarted { .. }
        | PlaybackEvent::Ended { .. }
        | PlaybackEvent::Stopped { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cameras() -> Vec<CameraSettings> {
        parley_core::Settings::with_defaults().cameras
    }

    #[test]
    fn all_cameras_by_default() {
        assert_eq!(select_cameras(&cameras(), &[]), cameras());
    }

    #[test]
    fn requested_order_and_unknown_labels() {
        let selected = select_cameras(&cameras(), &[1, 7]);
        assert_eq!(selected[0].label, "global top view");
        assert_eq!(selected[1].index, 7);
        assert_eq!(selected[1].label, "camera 7");
    }

    #[test]
    fn only_milestones_are_printed() {
        let started = PlaybackEvent::AttemptStarted {
            session: 3,
            text: "Hello there".to_string(),
        };
        assert_eq!(describe_event(&started).as_deref(), Some("🔊 [3] Hello there"));

        let blocked = PlaybackEvent::Blocked {
            session: 3,
            reason: "autoplay".to_string(),
        };
        assert!(describe_event(&blocked).unwrap().contains("blocked: autoplay"));
        assert_eq!(describe_event(&PlaybackEvent::Ended { session: 3 }), None);
    }

    #[tokio::test]
    async fn printer_drains_channel_and_exits() {
        use parley_core::PlaybackEventEmitter;

        let (emitter, events) = ChannelEmitter::new();
        let printer = tokio::spawn(print_events(events));

        emitter.emit(&PlaybackEvent::PlayStarted { session: 1 });
        emitter.emit(&PlaybackEvent::Ended { session: 1 });
        drop(emitter);

        tokio::time::timeout(std::time::Duration::from_secs(1), printer)
            .await
            .expect("printer did not exit after the emitter was dropped")
            .unwrap();
    }
}
