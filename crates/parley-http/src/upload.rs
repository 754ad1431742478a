//! Attachment upload client.

use async_trait::async_trait;
use parley_core::{UploadAnnotation, UploadError, UploadFile, UploadPort};
use reqwest::multipart::{Form, Part};
use url::Url;

use crate::config::HttpClientConfig;
use crate::error::{HttpError, HttpResult};

/// Posts files as multipart form field `file`.
pub struct HttpUploadClient {
    client: reqwest::Client,
    url: Url,
}

impl HttpUploadClient {
    pub fn new(config: &HttpClientConfig) -> HttpResult<Self> {
        Ok(Self {
            client: config.request_client()?,
            url: config.upload_url()?,
        })
    }

    async fn post(&self, file: &UploadFile) -> HttpResult<UploadAnnotation> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime)?;
        let form = Form::new().part("file", part);

        let response = self.client.post(self.url.clone()).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status {
                status: status.as_u16(),
                url: self.url.to_string(),
            });
        }
        let body = response.bytes().await?;
        let data: serde_json::Value = serde_json::from_slice(&body)?;
        Ok(UploadAnnotation {
            kind: UploadAnnotation::kind_for_mime(&file.mime).to_string(),
            data,
        })
    }
}

#[async_trait]
impl UploadPort for HttpUploadClient {
    async fn upload(&self, file: &UploadFile) -> Result<UploadAnnotation, UploadError> {
        tracing::debug!(name = %file.name, url = %self.url, "Uploading file");
        Ok(self.post(file).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_targets_upload_endpoint() {
        let client = HttpUploadClient::new(&HttpClientConfig::new()).unwrap();
        assert_eq!(client.url.as_str(), "http://localhost:8000/chat/upload");
    }

    #[tokio::test]
    async fn invalid_mime_is_reported_before_sending() {
        let client = HttpUploadClient::new(&HttpClientConfig::new()).unwrap();
        let file = UploadFile {
            name: "broken".to_string(),
            mime: "not a mime type".to_string(),
            bytes: vec![1, 2, 3],
        };
        let err = client.upload(&file).await.unwrap_err();
        assert!(matches!(err, UploadError::Network(_) | UploadError::InvalidResponse(_)));
    }
}
