//! Media service: stores uploads and serves them back by id.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{BlobStore, MediaLibrary};
use crate::domain::repository_errors::map_blob_error;
use crate::domain::{Blob, BlobId, BlobMetadata, BlobUpload, Claims, Error};

/// Service implementing [`MediaLibrary`].
#[derive(Clone)]
pub struct MediaService<B> {
    blobs: Arc<B>,
}

impl<B> MediaService<B> {
    /// Create a media service over `blobs`.
    pub fn new(blobs: Arc<B>) -> Self {
        Self { blobs }
    }
}

#[async_trait]
impl<B> MediaLibrary for MediaService<B>
where
    B: BlobStore,
{
    async fn upload(&self, claims: &Claims, upload: BlobUpload) -> Result<BlobMetadata, Error> {
        let stored = self.blobs.put(upload).await.map_err(map_blob_error)?;
        info!(
            blob_id = %stored.id,
            size = stored.size,
            uploader = %claims.user_id,
            "stored upload"
        );
        Ok(stored)
    }

    async fn fetch(&self, id: &BlobId) -> Result<Blob, Error> {
        self.blobs
            .get(id)
            .await
            .map_err(map_blob_error)?
            .ok_or_else(|| Error::not_found("file not found"))
    }
}
