//! Speaking state - the single "assistant is speaking" signal for the UI.
//!
//! Derived from playback lifecycle events. The flag turns on optimistically
//! when a play attempt is admitted (before the backend confirms audio is
//! audible) and turns off once every admitted attempt has reached its
//! terminal event.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

use parley_core::{PlaybackEvent, PlaybackEventEmitter};
use tokio::sync::watch;

/// Shared speaking flag.
///
/// Clones share state. Tracks the set of outstanding sessions rather than
/// a bare boolean: the flag is up while any admitted attempt (playing or
/// queued behind the active one) has not reached its terminal event, and a
/// terminal event for an unknown session changes nothing.
#[derive(Debug, Clone)]
pub struct SpeakingState {
    outstanding: Arc<Mutex<BTreeSet<u64>>>,
    tx: Arc<watch::Sender<bool>>,
}

impl SpeakingState {
    /// Create a new speaking state (initially silent).
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            outstanding: Arc::new(Mutex::new(BTreeSet::new())),
            tx: Arc::new(tx),
        }
    }

    /// Whether an attempt is outstanding.
    #[must_use]
    pub fn is_speaking(&self) -> bool {
        !self.lock().is_empty()
    }

    /// Subscribe to changes of the flag.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    fn begin(&self, session: u64) {
        let mut outstanding = self.lock();
        outstanding.insert(session);
        self.publish(&outstanding);
        tracing::debug!(session, "Speaking");
    }

    fn finish(&self, session: u64) {
        let mut outstanding = self.lock();
        if !outstanding.remove(&session) {
            tracing::trace!(session, "Ignoring terminal event of an unknown session");
            return;
        }
        self.publish(&outstanding);
        if outstanding.is_empty() {
            tracing::debug!(session, "Silent");
        }
    }

    // Called with the set locked so publications follow mutation order.
    fn publish(&self, outstanding: &BTreeSet<u64>) {
        let speaking = !outstanding.is_empty();
        self.tx.send_if_modified(|current| {
            let changed = *current != speaking;
            *current = speaking;
            changed
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeSet<u64>> {
        self.outstanding.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SpeakingState {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackEventEmitter for SpeakingState {
    fn emit(&self, event: &PlaybackEvent) {
        match event {
            PlaybackEvent::AttemptStarted { session, .. } | PlaybackEvent::PlayStarted { session } => {
                self.begin(*session);
            }
            PlaybackEvent::Ended { session }
            | PlaybackEvent::Error { session, .. }
            | PlaybackEvent::Blocked { session, .. }
            | PlaybackEvent::Stopped { session } => self.finish(*session),
        }
    }
}
