//! Attachments waiting for the next outgoing message.

use std::sync::{Arc, Mutex, PoisonError};

use parley_core::{UploadAnnotation, UploadError, UploadFile, UploadPort};

/// Uploads files and holds their annotations until a message takes them.
pub struct AttachmentTray {
    upload: Arc<dyn UploadPort>,
    pending: Mutex<Vec<UploadAnnotation>>,
}

impl AttachmentTray {
    pub fn new(upload: Arc<dyn UploadPort>) -> Self {
        Self {
            upload,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Upload `file` and keep its annotation for the next message.
    pub async fn upload(&self, file: &UploadFile) -> Result<(), UploadError> {
        tracing::debug!(name = %file.name, mime = %file.mime, size = file.bytes.len(), "Uploading attachment");
        match self.upload.upload(file).await {
            Ok(annotation) => {
                self.lock().push(annotation);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(name = %file.name, error = %err, "Upload failed");
                Err(err)
            }
        }
    }

    /// Drain annotations for the outgoing message.
    pub fn take_annotations(&self) -> Vec<UploadAnnotation> {
        std::mem::take(&mut *self.lock())
    }

    /// Discard pending annotations.
    pub fn reset(&self) {
        self.lock().clear();
    }

    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<UploadAnnotation>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use mockall::mock;
    use serde_json::json;

    use super::*;

    mock! {
        Uploader {}

        #[async_trait]
        impl UploadPort for Uploader {
            async fn upload(&self, file: &UploadFile) -> Result<UploadAnnotation, UploadError>;
        }
    }

    fn png() -> UploadFile {
        UploadFile {
            name: "shot.png".to_string(),
            mime: "image/png".to_string(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    #[tokio::test]
    async fn successful_upload_is_held_until_taken() {
        let mut uploader = MockUploader::new();
        uploader.expect_upload().times(1).returning(|file| {
            Ok(UploadAnnotation {
                kind: UploadAnnotation::kind_for_mime(&file.mime).to_string(),
                data: json!({"url": "/uploads/shot.png"}),
            })
        });
        let tray = AttachmentTray::new(Arc::new(uploader));

        tray.upload(&png()).await.unwrap();
        assert_eq!(tray.pending(), 1);

        let taken = tray.take_annotations();
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].kind, "image");
        assert_eq!(tray.pending(), 0);
    }

    #[tokio::test]
    async fn failed_upload_holds_nothing() {
        let mut uploader = MockUploader::new();
        uploader
            .expect_upload()
            .returning(|_| Err(UploadError::Rejected { status: 413 }));
        let tray = AttachmentTray::new(Arc::new(uploader));

        let err = tray.upload(&png()).await.unwrap_err();
        assert_eq!(err, UploadError::Rejected { status: 413 });
        assert_eq!(tray.pending(), 0);
    }

    #[tokio::test]
    async fn reset_discards_pending() {
        let mut uploader = MockUploader::new();
        uploader.expect_upload().returning(|_| {
            Ok(UploadAnnotation {
                kind: "document_file".to_string(),
                data: json!({}),
            })
        });
        let tray = AttachmentTray::new(Arc::new(uploader));

        tray.upload(&png()).await.unwrap();
        tray.reset();
        assert!(tray.take_annotations().is_empty());
    }
}
