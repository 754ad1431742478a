//! Feed status probe and MJPEG stream surface.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use futures_util::StreamExt;
use parley_core::{
    FeedEndpoint, FeedMediaEvent, FeedProbeError, FeedStatus, FeedStatusPort, FeedSurfacePort,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::HttpClientConfig;
use crate::error::{HttpError, HttpResult};
use crate::parsing::parse_feed_status;

/// Capacity of the media event channel.
const MEDIA_EVENT_BUFFER: usize = 16;

/// Queries the backend's video status endpoint.
pub struct HttpFeedStatusProbe {
    client: reqwest::Client,
}

impl HttpFeedStatusProbe {
    pub fn new(config: &HttpClientConfig) -> HttpResult<Self> {
        Ok(Self {
            client: config.request_client()?,
        })
    }

    async fn fetch(&self, endpoint: &FeedEndpoint) -> HttpResult<FeedStatus> {
        let url = url::Url::parse(&endpoint.status_url)?;
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.bytes().await?;
        let json: serde_json::Value = serde_json::from_slice(&body)?;
        parse_feed_status(&json, endpoint.camera_index)
    }
}

#[async_trait]
impl FeedStatusPort for HttpFeedStatusProbe {
    async fn probe(&self, endpoint: &FeedEndpoint) -> Result<FeedStatus, FeedProbeError> {
        Ok(self.fetch(endpoint).await?)
    }
}

/// Pulls a multipart MJPEG stream and reports load/failure events.
///
/// Frames are not decoded; the first bytes of the body count as a
/// successful load.
pub struct HttpFeedSurface {
    client: reqwest::Client,
    events: mpsc::Sender<FeedMediaEvent>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl HttpFeedSurface {
    /// Create a surface and the receiver its media events go to.
    pub fn new(config: &HttpClientConfig) -> HttpResult<(Self, mpsc::Receiver<FeedMediaEvent>)> {
        let (events, rx) = mpsc::channel(MEDIA_EVENT_BUFFER);
        let surface = Self {
            client: config.stream_client()?,
            events,
            task: Mutex::new(None),
        };
        Ok((surface, rx))
    }

    fn replace_task(&self, task: Option<JoinHandle<()>>) {
        let previous = {
            let mut slot = self.task.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *slot, task)
        };
        if let Some(previous) = previous {
            previous.abort();
        }
    }
}

impl FeedSurfacePort for HttpFeedSurface {
    fn attach(&self, url: &str) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(%url, "No async runtime, cannot attach feed stream");
            return;
        };
        let task = runtime.spawn(pump(self.client.clone(), url.to_string(), self.events.clone()));
        self.replace_task(Some(task));
    }

    fn detach(&self) {
        self.replace_task(None);
    }
}

impl Drop for HttpFeedSurface {
    fn drop(&mut self) {
        self.replace_task(None);
    }
}

async fn report(events: &mpsc::Sender<FeedMediaEvent>, event: FeedMediaEvent) {
    if events.send(event).await.is_err() {
        tracing::trace!("Feed media receiver dropped");
    }
}

async fn failed(events: &mpsc::Sender<FeedMediaEvent>, detail: String) {
    report(events, FeedMediaEvent::Failed { detail }).await;
}

async fn pump(client: reqwest::Client, url: String, events: mpsc::Sender<FeedMediaEvent>) {
    tracing::debug!(%url, "Opening feed stream");
    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(err) => return failed(&events, format!("connect error: {err}")).await,
    };
    let status = response.status();
    if !status.is_success() {
        return failed(&events, format!("stream returned status {}", status.as_u16())).await;
    }

    let mut body = response.bytes_stream();
    let mut received: u64 = 0;
    while let Some(chunk) = body.next().await {
        match chunk {
            Ok(bytes) => {
                if received == 0 && !bytes.is_empty() {
                    tracing::debug!(%url, "Feed stream delivering frames");
                    report(&events, FeedMediaEvent::Loaded).await;
                }
                received += bytes.len() as u64;
            }
            Err(err) => return failed(&events, format!("stream interrupted: {err}")).await,
        }
    }
    tracing::debug!(%url, received, "Feed stream closed by backend");
    failed(&events, "stream closed by backend".to_string()).await;
}
