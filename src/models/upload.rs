//! Request and response shapes of `POST /upload`.

use bytes::Bytes;
use serde::Serialize;

/// The file part of a multipart upload, fully buffered.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Filename as sent by the client. Only its extension is ever used.
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// One parsed upload call. Lives only for the duration of the handler.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub file: Option<UploadedFile>,

    /// First non-empty secret from body field, query parameter or header.
    pub secret: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub filename: String,
    pub size: usize,
    /// RFC 3339 timestamp with millisecond precision.
    pub uploaded_at: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
