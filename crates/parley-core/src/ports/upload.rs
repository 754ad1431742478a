//! Upload port for files attached to outgoing messages.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{UploadAnnotation, UploadFile};

/// Errors from an upload.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UploadError {
    /// The upload endpoint could not be reached.
    #[error("Upload failed: {0}")]
    Network(String),

    /// The endpoint rejected the file.
    #[error("Upload rejected with status {status}")]
    Rejected {
        /// HTTP status code.
        status: u16,
    },

    /// The endpoint response could not be understood.
    #[error("Invalid upload response: {0}")]
    InvalidResponse(String),
}

/// Posts a file to the upload endpoint.
#[async_trait]
pub trait UploadPort: Send + Sync {
    /// Upload `file` and return the annotation for the next message.
    async fn upload(&self, file: &UploadFile) -> Result<UploadAnnotation, UploadError>;
}
