//! In-memory [`BlobStore`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tokio::sync::RwLock;

use crate::domain::ports::{BlobStore, BlobStoreError};
use crate::domain::{Blob, BlobId, BlobMetadata, BlobUpload};

use super::describe;

/// Blobs held in a process-local map.
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<BlobId, Blob>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryBlobStore {
    /// Create an empty store stamping uploads with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            clock,
        }
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, upload: BlobUpload) -> Result<BlobMetadata, BlobStoreError> {
        let (filename, content_type, bytes) = upload.into_parts();
        let metadata = describe(
            BlobId::random(),
            filename,
            content_type,
            &bytes,
            self.clock.utc(),
        );
        self.blobs.write().await.insert(
            metadata.id,
            Blob {
                metadata: metadata.clone(),
                bytes,
            },
        );
        Ok(metadata)
    }

    async fn get(&self, id: &BlobId) -> Result<Option<Blob>, BlobStoreError> {
        Ok(self.blobs.read().await.get(id).cloned())
    }

    async fn metadata(&self, id: &BlobId) -> Result<Option<BlobMetadata>, BlobStoreError> {
        Ok(self.blobs.read().await.get(id).map(|b| b.metadata.clone()))
    }

    async fn delete(&self, id: &BlobId) -> Result<bool, BlobStoreError> {
        Ok(self.blobs.write().await.remove(id).is_some())
    }
}
