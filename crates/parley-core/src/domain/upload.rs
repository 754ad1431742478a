//! Upload side channel types.

use serde::{Deserialize, Serialize};

/// A file picked by the user for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// Original file name.
    pub name: String,
    /// MIME type, e.g. `image/png`.
    pub mime: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Annotation attached to the next outgoing message after an upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadAnnotation {
    /// Annotation kind (`"image"` or `"document_file"`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Payload returned by the upload endpoint.
    pub data: serde_json::Value,
}

impl UploadAnnotation {
    /// Annotation kind for a given MIME type.
    #[must_use]
    pub fn kind_for_mime(mime: &str) -> &'static str {
        if mime.starts_with("image/") {
            "image"
        } else {
            "document_file"
        }
    }
}
