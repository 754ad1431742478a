//! Integration tests for the `StreamReconnector` feed lifecycle.
//!
//! The status probe is a `mockall` mock; the media surface is a recording
//! fake. Time is paused so reload delays and backoff run instantly.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::FakeSurface;
use mockall::mock;
use parley_core::{
    ConnectivityEvent, FeedConnectionState, FeedEndpoint, FeedMediaEvent, FeedProbeError,
    FeedResolution, FeedStatus, FeedStatusPort, FeedSurfacePort, Settings,
};
use parley_runtime::{BackoffPolicy, FeedWall, ReconnectorConfig, StreamReconnector, reasons};
use tokio::sync::{mpsc, watch};

mock! {
    Probe {}

    #[async_trait]
    impl FeedStatusPort for Probe {
        async fn probe(&self, endpoint: &FeedEndpoint) -> Result<FeedStatus, FeedProbeError>;
    }
}

// ── Helpers ────────────────────────────────────────────────────────

fn endpoint() -> FeedEndpoint {
    let settings = Settings::with_defaults();
    settings.feed_endpoint(&settings.cameras[0])
}

const STREAM_URL: &str = "http://localhost:8000/api/video/stream?camera_index=0";

fn probe_returning(result: Result<FeedStatus, FeedProbeError>) -> MockProbe {
    let mut probe = MockProbe::new();
    probe.expect_probe().returning(move |_| result.clone());
    probe
}

fn reconnector(probe: MockProbe, surface: &Arc<FakeSurface>, config: ReconnectorConfig) -> StreamReconnector {
    let surface: Arc<dyn FeedSurfacePort> = surface.clone();
    StreamReconnector::new(endpoint(), Arc::new(probe), surface, config)
}

fn available() -> FeedStatus {
    FeedStatus {
        available: true,
        resolution: Some(FeedResolution {
            width: 640,
            height: 480,
            fps: 30,
        }),
    }
}

fn unreachable() -> FeedProbeError {
    FeedProbeError::Unreachable("connection refused".to_string())
}

// ── Probe ──────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn available_feed_attaches_then_goes_live() {
    let surface = FakeSurface::new();
    let feed = reconnector(probe_returning(Ok(available())), &surface, ReconnectorConfig::default());
    assert_eq!(feed.state(), FeedConnectionState::Connecting);

    feed.start().await;
    assert_eq!(feed.state(), FeedConnectionState::Connecting);
    assert_eq!(surface.attached(), [STREAM_URL]);
    assert_eq!(feed.status(), Some(available()));

    feed.on_load();
    assert_eq!(feed.state(), FeedConnectionState::Live);
}

#[tokio::test(start_paused = true)]
async fn unavailable_feed_errors_without_load_and_retry_reattaches() {
    let surface = FakeSurface::new();
    let feed = reconnector(
        probe_returning(Ok(FeedStatus::unavailable())),
        &surface,
        ReconnectorConfig::default(),
    );
    let states = feed.subscribe();

    feed.start().await;

    assert_eq!(feed.state(), FeedConnectionState::error(reasons::WEBCAM_UNAVAILABLE));
    assert_eq!(surface.attaches(), 0);
    assert!(states.has_changed().unwrap());

    assert!(feed.retry());
    assert_eq!(feed.state(), FeedConnectionState::Connecting);
    assert_eq!(surface.attached(), [STREAM_URL]);

    feed.on_load();
    assert!(feed.state().is_live());
}

#[tokio::test(start_paused = true)]
async fn error_status_maps_to_service_unavailable() {
    let surface = FakeSurface::new();
    let feed = reconnector(
        probe_returning(Err(FeedProbeError::Status { status: 503 })),
        &surface,
        ReconnectorConfig::default(),
    );

    feed.start().await;

    assert_eq!(feed.state(), FeedConnectionState::error(reasons::SERVICE_UNAVAILABLE));
    assert_eq!(surface.attaches(), 0);
}

#[tokio::test(start_paused = true)]
async fn unreachable_or_malformed_maps_to_cannot_connect() {
    for err in [
        unreachable(),
        FeedProbeError::InvalidResponse("expected value at line 1".to_string()),
    ] {
        let surface = FakeSurface::new();
        let feed = reconnector(probe_returning(Err(err)), &surface, ReconnectorConfig::default());

        feed.start().await;

        assert_eq!(feed.state(), FeedConnectionState::error(reasons::CANNOT_CONNECT));
        assert!(feed.state().is_connectivity_error());
    }
}

#[tokio::test(start_paused = true)]
async fn load_error_enters_error_state() {
    let surface = FakeSurface::new();
    let feed = reconnector(probe_returning(Ok(available())), &surface, ReconnectorConfig::default());

    feed.start().await;
    feed.on_load_error();

    assert_eq!(feed.state(), FeedConnectionState::error(reasons::STREAM_LOAD_FAILED));
    assert!(!feed.state().is_connectivity_error());
}

#[tokio::test(start_paused = true)]
async fn retry_outside_error_is_a_no_op() {
    let surface = FakeSurface::new();
    let feed = reconnector(probe_returning(Ok(available())), &surface, ReconnectorConfig::default());

    feed.start().await;
    assert!(!feed.retry());
    feed.on_load();
    assert!(!feed.retry());

    assert_eq!(surface.attaches(), 1);
}

// ── Connectivity ───────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn online_after_connect_error_reloads_after_delay() {
    let surface = FakeSurface::new();
    let feed = reconnector(probe_returning(Err(unreachable())), &surface, ReconnectorConfig::default());

    feed.start().await;
    feed.on_offline();
    assert!(feed.on_online());
    assert_eq!(feed.state(), FeedConnectionState::Connecting);
    assert_eq!(surface.attaches(), 0);

    tokio::time::sleep(Duration::from_millis(999)).await;
    assert_eq!(surface.attaches(), 0);

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(surface.attached(), [STREAM_URL]);
}

#[tokio::test(start_paused = true)]
async fn online_without_prior_offline_is_ignored() {
    let surface = FakeSurface::new();
    let feed = reconnector(probe_returning(Err(unreachable())), &surface, ReconnectorConfig::default());

    feed.start().await;
    assert!(!feed.on_online());
    feed.settle().await;

    assert_eq!(feed.state(), FeedConnectionState::error(reasons::CANNOT_CONNECT));
    assert_eq!(surface.attaches(), 0);
}

#[tokio::test(start_paused = true)]
async fn repeated_online_reloads_once() {
    let surface = FakeSurface::new();
    let feed = reconnector(probe_returning(Err(unreachable())), &surface, ReconnectorConfig::default());

    feed.start().await;
    feed.on_offline();
    assert!(feed.on_online());
    assert!(!feed.on_online());
    feed.settle().await;

    assert_eq!(surface.attaches(), 1);
}

#[tokio::test(start_paused = true)]
async fn online_ignores_errors_unrelated_to_connectivity() {
    let surface = FakeSurface::new();
    let feed = reconnector(
        probe_returning(Ok(FeedStatus::unavailable())),
        &surface,
        ReconnectorConfig::default(),
    );

    feed.start().await;
    feed.on_offline();
    assert!(!feed.on_online());
    feed.settle().await;

    assert_eq!(feed.state(), FeedConnectionState::error(reasons::WEBCAM_UNAVAILABLE));
    assert_eq!(surface.attaches(), 0);
}

#[tokio::test(start_paused = true)]
async fn manual_retry_supersedes_pending_online_reload() {
    let surface = FakeSurface::new();
    let feed = reconnector(probe_returning(Err(unreachable())), &surface, ReconnectorConfig::default());

    feed.start().await;
    feed.on_offline();
    feed.on_online();
    feed.on_load_error();
    assert!(feed.retry());
    feed.settle().await;

    assert_eq!(surface.attaches(), 1);
}

// ── Teardown ───────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn teardown_detaches_and_ignores_later_events() {
    let surface = FakeSurface::new();
    let feed = reconnector(probe_returning(Err(unreachable())), &surface, ReconnectorConfig::default());

    feed.start().await;
    feed.on_offline();
    feed.on_online();
    feed.teardown();
    feed.settle().await;

    assert_eq!(surface.detaches(), 1);
    assert_eq!(surface.attaches(), 0, "pending reload fired after teardown");

    let before = feed.state();
    feed.on_load();
    feed.on_load_error();
    assert!(!feed.retry());
    assert!(!feed.on_online());
    assert_eq!(feed.state(), before);
    assert!(feed.is_torn_down());
}

#[tokio::test(start_paused = true)]
async fn probe_result_after_teardown_is_ignored() {
    let mut probe = MockProbe::new();
    probe.expect_probe().returning(|_| Ok(available()));
    let surface = FakeSurface::new();
    let feed = reconnector(probe, &surface, ReconnectorConfig::default());

    feed.teardown();
    feed.start().await;

    assert_eq!(surface.attaches(), 0);
    assert_eq!(feed.state(), FeedConnectionState::Connecting);
}

// ── Backoff ────────────────────────────────────────────────────────

fn with_backoff(max_attempts: u32) -> ReconnectorConfig {
    ReconnectorConfig {
        backoff: Some(BackoffPolicy {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(4),
            max_attempts,
        }),
        ..ReconnectorConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn backoff_retries_load_failures_with_growing_delay() {
    let surface = FakeSurface::new();
    let feed = reconnector(probe_returning(Ok(available())), &surface, with_backoff(3));

    feed.start().await;
    assert_eq!(surface.attaches(), 1);

    feed.on_load_error();
    tokio::time::sleep(Duration::from_millis(1_001)).await;
    assert_eq!(surface.attaches(), 2);
    assert_eq!(feed.state(), FeedConnectionState::Connecting);

    feed.on_load_error();
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(surface.attaches(), 2, "second retry waits two seconds");
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(surface.attaches(), 3);

    feed.on_load();
    assert_eq!(feed.attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn backoff_gives_up_after_max_attempts() {
    let surface = FakeSurface::new();
    let feed = reconnector(probe_returning(Ok(available())), &surface, with_backoff(1));

    feed.start().await;
    feed.on_load_error();
    feed.settle().await;
    assert_eq!(surface.attaches(), 2);

    feed.on_load_error();
    feed.settle().await;
    assert_eq!(surface.attaches(), 2);
    assert!(feed.state().is_error());

    // Manual retry still works.
    assert!(feed.retry());
    assert_eq!(surface.attaches(), 3);
}

#[tokio::test(start_paused = true)]
async fn backoff_does_not_retry_unavailable_camera() {
    let surface = FakeSurface::new();
    let feed = reconnector(
        probe_returning(Ok(FeedStatus::unavailable())),
        &surface,
        with_backoff(3),
    );

    feed.start().await;
    feed.settle().await;

    assert_eq!(surface.attaches(), 0);
}

// ── Event loop ─────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn run_routes_media_and_connectivity_events() {
    let surface = FakeSurface::new();
    let feed = Arc::new(reconnector(
        probe_returning(Ok(available())),
        &surface,
        ReconnectorConfig::default(),
    ));
    let (media_tx, media_rx) = mpsc::channel(8);
    let (online_tx, online_rx) = watch::channel(ConnectivityEvent::Online);

    let runner = Arc::clone(&feed);
    let handle = tokio::spawn(async move { runner.run(media_rx, online_rx).await });

    feed.start().await;
    media_tx
        .send(FeedMediaEvent::Failed {
            detail: "connect timeout".to_string(),
        })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(feed.state(), FeedConnectionState::error(reasons::STREAM_LOAD_FAILED));

    media_tx.send(FeedMediaEvent::Loaded).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert!(feed.state().is_live());

    online_tx.send_replace(ConnectivityEvent::Offline);
    tokio::time::sleep(Duration::from_millis(1)).await;

    feed.teardown();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn wall_broadcasts_connectivity_to_every_feed() {
    let settings = Settings::with_defaults();
    let mut wall = FeedWall::new();
    let mut surfaces = Vec::new();
    let mut media_senders = Vec::new();
    for camera in &settings.cameras {
        let surface = FakeSurface::new();
        let surface_port: Arc<dyn FeedSurfacePort> = surface.clone();
        let feed = StreamReconnector::new(
            settings.feed_endpoint(camera),
            Arc::new(probe_returning(Err(unreachable()))),
            surface_port,
            ReconnectorConfig::from_settings(&settings),
        );
        let (media_tx, media_rx) = mpsc::channel(8);
        wall.add(feed, media_rx);
        media_senders.push(media_tx);
        surfaces.push(surface);
    }

    wall.start().await;
    assert!(wall.states().iter().all(|(_, state)| state.is_connectivity_error()));

    wall.set_connectivity(ConnectivityEvent::Offline);
    // Each feed has to observe the offline value before it is replaced.
    tokio::time::sleep(Duration::from_millis(1)).await;
    wall.set_connectivity(ConnectivityEvent::Online);
    tokio::time::sleep(Duration::from_millis(1_100)).await;

    let attached: Vec<Vec<String>> = surfaces.iter().map(|s| s.attached()).collect();
    assert_eq!(
        attached,
        [
            vec!["http://localhost:8000/api/video/stream?camera_index=0".to_string()],
            vec!["http://localhost:8000/api/video/stream?camera_index=1".to_string()],
        ]
    );

    wall.teardown().await;
    assert!(surfaces.iter().all(|s| s.detaches() == 1));
}
