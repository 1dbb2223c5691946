//! Driving port for uploading and serving stored files.

use async_trait::async_trait;

use crate::domain::{Blob, BlobId, BlobMetadata, BlobUpload, Claims, Error};

/// File use-cases exposed to inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    /// Store an upload on behalf of an authenticated caller.
    async fn upload(&self, claims: &Claims, upload: BlobUpload) -> Result<BlobMetadata, Error>;

    /// Load a stored file. Reads are not access controlled.
    async fn fetch(&self, id: &BlobId) -> Result<Blob, Error>;
}
