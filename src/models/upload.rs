//! Attachment upload models for the Zendesk API.

use serde::{Deserialize, Serialize};

/// A stored file ready to be uploaded, as described by the file storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentSource {
    /// Where the bytes live: a `file://` URL or a plain filesystem path.
    pub uri: String,

    /// MIME type sent as the upload's content type.
    pub mime_type: String,

    /// File name shown in Zendesk.
    pub file_name: String,
}

/// Short-lived token referencing an uploaded file, consumed by a ticket comment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UploadToken(pub String);

impl UploadToken {
    /// Returns the token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Attachment metadata returned with an upload.
#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    /// Attachment id.
    pub id: u64,

    /// Stored file name.
    #[serde(default)]
    pub file_name: Option<String>,

    /// Download URL.
    #[serde(default)]
    pub content_url: Option<String>,

    /// Stored content type.
    #[serde(default)]
    pub content_type: Option<String>,

    /// Size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
}

/// The upload object.
#[derive(Debug, Clone, Deserialize)]
pub struct Upload {
    /// Token to reference from a comment.
    pub token: String,

    /// The stored attachment.
    #[serde(default)]
    pub attachment: Option<Attachment>,
}

/// Response wrapper for `POST /uploads.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    /// The created upload.
    pub upload: Upload,
}
