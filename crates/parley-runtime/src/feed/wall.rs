//! Several feeds sharing one connectivity signal.

use std::sync::Arc;

use futures_util::future::join_all;
use parley_core::{ConnectivityEvent, FeedConnectionState, FeedMediaEvent};
use tokio::sync::{mpsc, watch};
use tokio_util::task::TaskTracker;

use super::StreamReconnector;

/// A set of camera feeds driven together.
pub struct FeedWall {
    feeds: Vec<Arc<StreamReconnector>>,
    connectivity: watch::Sender<ConnectivityEvent>,
    tracker: TaskTracker,
}

impl FeedWall {
    #[must_use]
    pub fn new() -> Self {
        let (connectivity, _rx) = watch::channel(ConnectivityEvent::Online);
        Self {
            feeds: Vec::new(),
            connectivity,
            tracker: TaskTracker::new(),
        }
    }

    /// Add a feed and start routing its media events into it.
    pub fn add(&mut self, feed: StreamReconnector, media: mpsc::Receiver<FeedMediaEvent>) -> Arc<StreamReconnector> {
        let feed = Arc::new(feed);
        let runner = Arc::clone(&feed);
        let connectivity = self.connectivity.subscribe();
        self.tracker.spawn(async move {
            runner.run(media, connectivity).await;
        });
        self.feeds.push(Arc::clone(&feed));
        feed
    }

    /// Probe every feed concurrently.
    pub async fn start(&self) {
        join_all(self.feeds.iter().map(|feed| feed.start())).await;
    }

    /// Broadcast a host connectivity change to every feed.
    pub fn set_connectivity(&self, event: ConnectivityEvent) {
        tracing::info!(?event, feeds = self.feeds.len(), "Host connectivity changed");
        self.connectivity.send_replace(event);
    }

    /// Manually retry every feed in error. Returns how many were retried.
    pub fn retry_all(&self) -> usize {
        self.feeds.iter().filter(|feed| feed.retry()).count()
    }

    pub fn feeds(&self) -> &[Arc<StreamReconnector>] {
        &self.feeds
    }

    /// Label and state of every feed.
    pub fn states(&self) -> Vec<(String, FeedConnectionState)> {
        self.feeds
            .iter()
            .map(|feed| (feed.endpoint().label.clone(), feed.state()))
            .collect()
    }

    /// Tear down every feed and wait for their event loops to stop.
    pub async fn teardown(&self) {
        for feed in &self.feeds {
            feed.teardown();
        }
        self.tracker.close();
        self.tracker.wait().await;
    }
}

impl Default for FeedWall {
    fn default() -> Self {
        Self::new()
    }
}
