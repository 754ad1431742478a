//! Public configuration for the HTTP adapters.

use std::time::Duration;

use parley_core::{Settings, backend_endpoint};
use url::Url;

use crate::error::HttpResult;

/// Configuration shared by every HTTP adapter.
///
/// # Example
///
/// ```
/// use parley_http::HttpClientConfig;
/// use std::time::Duration;
///
/// let config = HttpClientConfig::new()
///     .with_backend_url("http://robot.local:8000")
///     .with_timeout(Duration::from_secs(10));
/// assert_eq!(config.backend_url(), "http://robot.local:8000");
/// ```
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub(crate) backend_url: String,
    pub(crate) user_agent: String,
    pub(crate) timeout: Duration,
    pub(crate) tts_path: String,
    pub(crate) upload_path: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::with_defaults())
    }
}

impl HttpClientConfig {
    /// Create a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive the configuration from controller settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            backend_url: settings.backend_url.clone(),
            user_agent: concat!("parley/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: settings.request_timeout(),
            tts_path: settings.tts_path.clone(),
            upload_path: settings.upload_path.clone(),
        }
    }

    /// Set the backend origin.
    #[must_use]
    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = url.into();
        self
    }

    /// Set the user agent string for HTTP requests.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout. Does not apply to feed streams.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    /// Full URL of `path` on the backend, resolved the same way as
    /// [`Settings::endpoint`].
    pub fn endpoint(&self, path: &str) -> HttpResult<Url> {
        Ok(Url::parse(&backend_endpoint(&self.backend_url, path))?)
    }

    pub(crate) fn tts_url(&self) -> HttpResult<Url> {
        self.endpoint(&self.tts_path)
    }

    pub(crate) fn upload_url(&self) -> HttpResult<Url> {
        self.endpoint(&self.upload_path)
    }

    /// Client for bounded request/response calls.
    pub(crate) fn request_client(&self) -> HttpResult<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.timeout)
            .build()?)
    }

    /// Client for long-lived streams: connect timeout only.
    pub(crate) fn stream_client(&self) -> HttpResult<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .connect_timeout(self.timeout)
            .build()?)
    }
}
