//! Live feed connection lifecycle.
//!
//! One [`StreamReconnector`] per camera feed:
//!
//! ```text
//!   Connecting ──probe ok──► (attach) ──loaded──► Live
//!       │                        └──load error──► Error
//!       └──probe failed / unavailable──────────► Error
//!   Error ──retry──► Connecting (re-attach, no re-probe)
//!   Error("...connect...") ──online──► Connecting ──delay──► re-attach
//! ```
//!
//! After teardown every event is ignored.

mod backoff;
mod wall;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use parley_core::{
    ConnectivityEvent, FeedConnectionState, FeedEndpoint, FeedMediaEvent, FeedProbeError,
    FeedStatus, FeedStatusPort, FeedSurfacePort, Settings,
};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

pub use backoff::BackoffPolicy;
pub use wall::FeedWall;

/// Error reasons shown to the user.
pub mod reasons {
    /// The backend reports no camera.
    pub const WEBCAM_UNAVAILABLE: &str = "Webcam not available on backend";
    /// The status endpoint answered with an error status.
    pub const SERVICE_UNAVAILABLE: &str = "Backend video service unavailable";
    /// The status endpoint could not be reached or answered garbage.
    pub const CANNOT_CONNECT: &str = "Cannot connect to backend video service";
    /// The stream itself failed to load.
    pub const STREAM_LOAD_FAILED: &str = "Failed to load video stream";
}

/// Reconnector timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectorConfig {
    /// Delay between a connectivity recovery and the re-attach.
    pub online_retry_delay: Duration,
    /// Automatic retries; `None` leaves recovery to the user.
    pub backoff: Option<BackoffPolicy>,
}

impl ReconnectorConfig {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            online_retry_delay: settings.online_retry_delay(),
            backoff: settings.feed_backoff.as_ref().map(BackoffPolicy::from_settings),
        }
    }
}

impl Default for ReconnectorConfig {
    fn default() -> Self {
        Self {
            online_retry_delay: Duration::from_secs(1),
            backoff: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reattach {
    /// Connectivity came back; state is already `Connecting`.
    Online,
    /// Automatic retry out of `Error`.
    Backoff,
}

#[derive(Debug)]
struct Inner {
    torn_down: bool,
    host_online: bool,
    status: Option<FeedStatus>,
    attempts: u32,
    /// Bumped on every transition; scheduled re-attaches from an older
    /// epoch are dropped.
    epoch: u64,
}

struct Shared {
    endpoint: FeedEndpoint,
    probe: Arc<dyn FeedStatusPort>,
    surface: Arc<dyn FeedSurfacePort>,
    config: ReconnectorConfig,
    inner: Mutex<Inner>,
    state: watch::Sender<FeedConnectionState>,
    cancel: CancellationToken,
}

impl Shared {
    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn camera(&self) -> &str {
        &self.endpoint.label
    }

    fn current(&self) -> FeedConnectionState {
        self.state.borrow().clone()
    }

    /// Move to `next`. Returns the new epoch.
    fn transition(&self, inner: &mut Inner, next: FeedConnectionState) -> u64 {
        inner.epoch += 1;
        tracing::debug!(camera = %self.camera(), state = ?next, "Feed state changed");
        self.state.send_if_modified(|current| {
            let changed = *current != next;
            *current = next;
            changed
        });
        inner.epoch
    }

    fn attach(&self) {
        tracing::debug!(camera = %self.camera(), url = %self.endpoint.stream_url, "Attaching feed stream");
        self.surface.attach(&self.endpoint.stream_url);
    }

    fn fire_reattach(&self, epoch: u64, kind: Reattach) {
        let mut inner = self.lock();
        if inner.torn_down || inner.epoch != epoch {
            tracing::trace!(camera = %self.camera(), ?kind, "Dropping superseded re-attach");
            return;
        }
        match kind {
            Reattach::Online => {}
            Reattach::Backoff => {
                if !self.current().is_error() || !inner.host_online {
                    return;
                }
                self.transition(&mut inner, FeedConnectionState::Connecting);
                tracing::info!(camera = %self.camera(), attempt = inner.attempts, "Retrying feed");
            }
        }
        drop(inner);
        self.attach();
    }
}

/// Drives one feed's connection lifecycle.
pub struct StreamReconnector {
    shared: Arc<Shared>,
    tracker: TaskTracker,
}

impl StreamReconnector {
    pub fn new(
        endpoint: FeedEndpoint,
        probe: Arc<dyn FeedStatusPort>,
        surface: Arc<dyn FeedSurfacePort>,
        config: ReconnectorConfig,
    ) -> Self {
        let (state, _rx) = watch::channel(FeedConnectionState::Connecting);
        Self {
            shared: Arc::new(Shared {
                endpoint,
                probe,
                surface,
                config,
                inner: Mutex::new(Inner {
                    torn_down: false,
                    host_online: true,
                    status: None,
                    attempts: 0,
                    epoch: 0,
                }),
                state,
                cancel: CancellationToken::new(),
            }),
            tracker: TaskTracker::new(),
        }
    }

    pub fn endpoint(&self) -> &FeedEndpoint {
        &self.shared.endpoint
    }

    /// Current connection state.
    pub fn state(&self) -> FeedConnectionState {
        self.shared.current()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<FeedConnectionState> {
        self.shared.state.subscribe()
    }

    /// Last status reported by the probe.
    pub fn status(&self) -> Option<FeedStatus> {
        self.shared.lock().status.clone()
    }

    /// Automatic retries since the feed was last live.
    pub fn attempts(&self) -> u32 {
        self.shared.lock().attempts
    }

    pub fn is_torn_down(&self) -> bool {
        self.shared.lock().torn_down
    }

    /// Probe the status endpoint and attach the stream if the camera is up.
    pub async fn start(&self) {
        let shared = &self.shared;
        if shared.lock().torn_down {
            return;
        }
        tracing::info!(camera = %shared.camera(), url = %shared.endpoint.status_url, "Probing feed status");

        let result = tokio::select! {
            biased;
            () = shared.cancel.cancelled() => return,
            result = shared.probe.probe(&shared.endpoint) => result,
        };

        let mut inner = shared.lock();
        if inner.torn_down {
            tracing::debug!(camera = %shared.camera(), "Ignoring probe result after teardown");
            return;
        }
        match result {
            Ok(status) if status.available => {
                if let Some(label) = status.resolution_label() {
                    tracing::info!(camera = %shared.camera(), resolution = %label, "Feed available");
                }
                inner.status = Some(status);
                drop(inner);
                shared.attach();
            }
            Ok(status) => {
                inner.status = Some(status);
                self.fail(&mut inner, reasons::WEBCAM_UNAVAILABLE, false);
            }
            Err(FeedProbeError::Status { status }) => {
                tracing::warn!(camera = %shared.camera(), status, "Feed status endpoint returned an error");
                self.fail(&mut inner, reasons::SERVICE_UNAVAILABLE, false);
            }
            Err(err) => {
                tracing::warn!(camera = %shared.camera(), error = %err, "Feed status probe failed");
                self.fail(&mut inner, reasons::CANNOT_CONNECT, true);
            }
        }
    }

    /// The stream delivered its first frame.
    pub fn on_load(&self) {
        let mut inner = self.shared.lock();
        if inner.torn_down {
            return;
        }
        inner.attempts = 0;
        self.shared.transition(&mut inner, FeedConnectionState::Live);
    }

    /// The stream failed to load.
    pub fn on_load_error(&self) {
        let mut inner = self.shared.lock();
        if inner.torn_down {
            return;
        }
        self.fail(&mut inner, reasons::STREAM_LOAD_FAILED, true);
    }

    /// Manual retry. Only acts in `Error`; re-attaches without re-probing.
    pub fn retry(&self) -> bool {
        let mut inner = self.shared.lock();
        if inner.torn_down || !self.shared.current().is_error() {
            return false;
        }
        self.shared.transition(&mut inner, FeedConnectionState::Connecting);
        drop(inner);
        tracing::info!(camera = %self.shared.camera(), "Manual feed retry");
        self.shared.attach();
        true
    }

    /// Host connectivity came back.
    ///
    /// Only an offline to online transition counts. A feed in a connectivity
    /// error then goes back to `Connecting` and is re-attached after the
    /// configured delay. Returns whether a reload was scheduled.
    pub fn on_online(&self) -> bool {
        let mut inner = self.shared.lock();
        if inner.torn_down {
            return false;
        }
        let was_offline = !inner.host_online;
        inner.host_online = true;
        if !was_offline {
            tracing::trace!(camera = %self.shared.camera(), "Online without a prior offline, ignored");
            return false;
        }
        if !self.shared.current().is_connectivity_error() {
            return false;
        }
        let epoch = self.shared.transition(&mut inner, FeedConnectionState::Connecting);
        drop(inner);
        tracing::info!(camera = %self.shared.camera(), "Connectivity restored, reloading feed");
        self.schedule(epoch, self.shared.config.online_retry_delay, Reattach::Online);
        true
    }

    /// Host connectivity was lost.
    pub fn on_offline(&self) {
        let mut inner = self.shared.lock();
        if inner.torn_down {
            return;
        }
        inner.host_online = false;
        tracing::info!(camera = %self.shared.camera(), "Connectivity lost");
    }

    /// Detach the surface and ignore everything afterwards.
    pub fn teardown(&self) {
        {
            let mut inner = self.shared.lock();
            inner.torn_down = true;
            inner.epoch += 1;
        }
        self.shared.cancel.cancel();
        self.tracker.close();
        self.shared.surface.detach();
        tracing::debug!(camera = %self.shared.camera(), "Feed torn down");
    }

    /// Drive the reconnector from media and connectivity events until
    /// teardown or until the media channel closes.
    pub async fn run(
        &self,
        mut media: mpsc::Receiver<FeedMediaEvent>,
        mut connectivity: watch::Receiver<ConnectivityEvent>,
    ) {
        let mut connectivity_open = true;
        loop {
            tokio::select! {
                biased;
                () = self.shared.cancel.cancelled() => break,
                event = media.recv() => match event {
                    Some(FeedMediaEvent::Loaded) => self.on_load(),
                    Some(FeedMediaEvent::Failed { detail }) => {
                        tracing::debug!(camera = %self.shared.camera(), %detail, "Feed media failure");
                        self.on_load_error();
                    }
                    None => break,
                },
                changed = connectivity.changed(), if connectivity_open => {
                    if changed.is_err() {
                        connectivity_open = false;
                        continue;
                    }
                    let event = *connectivity.borrow_and_update();
                    match event {
                        ConnectivityEvent::Online => {
                            self.on_online();
                        }
                        ConnectivityEvent::Offline => self.on_offline(),
                    }
                }
            }
        }
    }

    /// Wait for scheduled re-attaches to finish. Intended for tests.
    pub async fn settle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        if !self.shared.cancel.is_cancelled() {
            self.tracker.reopen();
        }
    }

    fn fail(&self, inner: &mut Inner, reason: &str, retryable: bool) {
        let epoch = self
            .shared
            .transition(inner, FeedConnectionState::error(reason));
        tracing::warn!(camera = %self.shared.camera(), %reason, "Feed error");

        let Some(policy) = self.shared.config.backoff else {
            return;
        };
        if !retryable || !inner.host_online {
            return;
        }
        if !policy.allows(inner.attempts) {
            tracing::warn!(camera = %self.shared.camera(), attempts = inner.attempts, "Giving up automatic feed retries");
            return;
        }
        inner.attempts += 1;
        let delay = policy.delay_for(inner.attempts);
        tracing::debug!(camera = %self.shared.camera(), attempt = inner.attempts, ?delay, "Scheduling feed retry");
        self.schedule(epoch, delay, Reattach::Backoff);
    }

    fn schedule(&self, epoch: u64, delay: Duration, kind: Reattach) {
        let shared = Arc::clone(&self.shared);
        self.tracker.spawn(async move {
            tokio::select! {
                biased;
                () = shared.cancel.cancelled() => {}
                () = tokio::time::sleep(delay) => shared.fire_reattach(epoch, kind),
            }
        });
    }
}

impl Drop for StreamReconnector {
    fn drop(&mut self) {
        self.shared.cancel.cancel();
    }
}
