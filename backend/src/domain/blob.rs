//! Binary objects (images, attachments) addressed by an opaque id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::BlobId;

/// Fallback media type when a client supplies none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Rejected upload payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlobValidationError {
    #[error("upload body must not be empty")]
    Empty,
    #[error("content type '{0}' is not a valid media type")]
    InvalidContentType(String),
}

/// Descriptive data stored beside each blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobMetadata {
    pub id: BlobId,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
    /// Lower-case hex SHA-256 of the content.
    pub sha256: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Blob content with its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub metadata: BlobMetadata,
    pub bytes: Vec<u8>,
}

/// Validated bytes awaiting storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobUpload {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl BlobUpload {
    /// Validate an upload.
    ///
    /// A missing filename becomes `"upload"`; a missing content type becomes
    /// [`DEFAULT_CONTENT_TYPE`].
    pub fn new(
        filename: Option<String>,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, BlobValidationError> {
        if bytes.is_empty() {
            return Err(BlobValidationError::Empty);
        }
        let content_type = content_type
            .map(|ct| ct.trim().to_owned())
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_owned());
        let well_formed = content_type
            .split_once('/')
            .is_some_and(|(kind, sub)| !kind.is_empty() && !sub.is_empty());
        if !well_formed {
            return Err(BlobValidationError::InvalidContentType(content_type));
        }
        let filename = filename
            .map(|name| sanitise_filename(&name))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "upload".to_owned());
        Ok(Self {
            filename,
            content_type,
            bytes,
        })
    }

    /// Original file name.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Declared media type.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Raw content.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Split into parts for storage adapters.
    pub fn into_parts(self) -> (String, String, Vec<u8>) {
        (self.filename, self.content_type, self.bytes)
    }
}

fn sanitise_filename(raw: &str) -> String {
    raw.rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_owned()
}
