//! Port abstraction for binary object storage.
//!
//! Adapters must be fully initialised before they are handed to services;
//! there is no lazy connection step behind these methods.
use async_trait::async_trait;

use crate::domain::{Blob, BlobId, BlobMetadata, BlobUpload};

use super::define_port_error;

define_port_error! {
    /// Errors raised by blob store adapters.
    pub enum BlobStoreError {
        /// The backing store cannot be reached.
        Unavailable { message: String } => "blob store unavailable: {message}",
        /// Reading or writing content failed.
        Io { message: String } => "blob store i/o failed: {message}",
    }
}

/// Content-addressed-by-id binary storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist `upload` under a fresh id.
    async fn put(&self, upload: BlobUpload) -> Result<BlobMetadata, BlobStoreError>;

    /// Load content and metadata.
    async fn get(&self, id: &BlobId) -> Result<Option<Blob>, BlobStoreError>;

    /// Load metadata only.
    async fn metadata(&self, id: &BlobId) -> Result<Option<BlobMetadata>, BlobStoreError>;

    /// Remove a blob. Returns `false` when nothing was stored under `id`.
    async fn delete(&self, id: &BlobId) -> Result<bool, BlobStoreError>;
}
