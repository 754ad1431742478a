//! TTS service client.

use async_trait::async_trait;
use parley_core::{TtsClientPort, TtsPortError, TtsReply, TtsRequest};
use url::Url;

use crate::config::HttpClientConfig;
use crate::error::{HttpError, HttpResult};

/// Posts synthesis requests as a url-encoded form.
pub struct HttpTtsClient {
    client: reqwest::Client,
    url: Url,
}

impl HttpTtsClient {
    pub fn new(config: &HttpClientConfig) -> HttpResult<Self> {
        Ok(Self {
            client: config.request_client()?,
            url: config.tts_url()?,
        })
    }

    pub const fn url(&self) -> &Url {
        &self.url
    }

    async fn post(&self, request: &TtsRequest) -> HttpResult<TtsReply> {
        let speed = request.speed.to_string();
        let form = [
            ("text", request.text.as_str()),
            ("voice", request.voice.as_str()),
            ("speed", speed.as_str()),
        ];

        let response = self.client.post(self.url.clone()).form(&form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status {
                status: status.as_u16(),
                url: self.url.to_string(),
            });
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl TtsClientPort for HttpTtsClient {
    async fn synthesize(&self, request: &TtsRequest) -> Result<TtsReply, TtsPortError> {
        tracing::debug!(chars = request.text.chars().count(), voice = %request.voice, "Requesting speech synthesis");
        let reply = self.post(request).await?;
        if !reply.success {
            tracing::debug!(reason = reply.error.as_deref().unwrap_or("unspecified"), "TTS service declined");
        }
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_targets_tts_endpoint() {
        let client = HttpTtsClient::new(&HttpClientConfig::new()).unwrap();
        assert_eq!(client.url().as_str(), "http://localhost:8000/api/chat/tts");
    }

    #[test]
    fn reply_parses_backend_json() {
        let reply: TtsReply =
            serde_json::from_str(r#"{"success": true, "audio_data": "UklGRg==", "duration": 1.25}"#)
                .unwrap();
        assert_eq!(reply.audio(), Some("UklGRg=="));
        assert_eq!(reply.duration, Some(1.25));
    }
}
