//! Emitter trait for playback events.
//!
//! Implementations handle transport details (channels, UI bindings,
//! derived state such as the speaking flag).

use std::sync::Arc;

use tokio::sync::mpsc;

use super::PlaybackEvent;

/// Trait for observing playback lifecycle events.
///
/// Called synchronously from the playback controller, in event order.
/// Implementations must not block.
pub trait PlaybackEventEmitter: Send + Sync {
    /// Observe one event.
    fn emit(&self, event: &PlaybackEvent);
}

/// Forwards events into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelEmitter {
    tx: mpsc::UnboundedSender<PlaybackEvent>,
}

impl ChannelEmitter {
    /// Create an emitter and the receiver its events go to.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PlaybackEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl PlaybackEventEmitter for ChannelEmitter {
    fn emit(&self, event: &PlaybackEvent) {
        // Best-effort: a dropped receiver only means nobody is listening.
        if self.tx.send(event.clone()).is_err() {
            tracing::trace!("Playback event receiver dropped");
        }
    }
}

/// Delivers each event to several emitters, in registration order.
#[derive(Clone, Default)]
pub struct FanoutEmitter {
    targets: Vec<Arc<dyn PlaybackEventEmitter>>,
}

impl FanoutEmitter {
    /// Create a fan-out over `targets`.
    #[must_use]
    pub fn new(targets: Vec<Arc<dyn PlaybackEventEmitter>>) -> Self {
        Self { targets }
    }

    /// Add another target.
    pub fn push(&mut self, target: Arc<dyn PlaybackEventEmitter>) {
        self.targets.push(target);
    }
}

impl PlaybackEventEmitter for FanoutEmitter {
    fn emit(&self, event: &PlaybackEvent) {
        for target in &self.targets {
            target.emit(event);
        }
    }
}
