//! Filesystem [`BlobStore`] rooted at a capability-scoped directory.
//!
//! Each blob is two files: `<id>.bin` holds the content and `<id>.json` the
//! [`BlobMetadata`]. Content is written before metadata, so a blob becomes
//! visible only once both are complete. All I/O runs on the blocking pool.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use mockable::Clock;
use tracing::{debug, warn};

use crate::domain::ports::{BlobStore, BlobStoreError};
use crate::domain::{Blob, BlobId, BlobMetadata, BlobUpload, TraceId};

use super::describe;

/// Failure opening the blob directory at startup.
#[derive(Debug, thiserror::Error)]
#[error("failed to open blob directory {path}: {source}")]
pub struct FsBlobStoreError {
    path: PathBuf,
    #[source]
    source: io::Error,
}

/// Blob store writing into one directory.
#[derive(Clone)]
pub struct FsBlobStore {
    dir: Arc<Dir>,
    clock: Arc<dyn Clock>,
}

fn content_name(id: &BlobId) -> String {
    format!("{id}.bin")
}

fn metadata_name(id: &BlobId) -> String {
    format!("{id}.json")
}

fn map_io_error(error: io::Error) -> BlobStoreError {
    match error.kind() {
        io::ErrorKind::NotConnected | io::ErrorKind::StorageFull | io::ErrorKind::ReadOnlyFilesystem => {
            BlobStoreError::unavailable(error.to_string())
        }
        _ => BlobStoreError::io(error.to_string()),
    }
}

/// Treat a missing file as absence rather than failure.
fn absent_if_missing<T>(result: io::Result<T>) -> io::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

fn read_metadata(dir: &Dir, id: &BlobId) -> io::Result<Option<BlobMetadata>> {
    let Some(raw) = absent_if_missing(dir.read(metadata_name(id)))? else {
        return Ok(None);
    };
    serde_json::from_slice(&raw)
        .map(Some)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

impl FsBlobStore {
    /// Create `root` if needed and open it.
    ///
    /// Awaited once at startup, before the HTTP listener accepts requests.
    pub async fn open(
        root: impl Into<PathBuf>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, FsBlobStoreError> {
        let path = root.into();
        let target = path.clone();
        let opened = tokio::task::spawn_blocking(move || {
            Dir::create_ambient_dir_all(&target, ambient_authority())?;
            Dir::open_ambient_dir(&target, ambient_authority())
        })
        .await
        .unwrap_or_else(|join| Err(io::Error::other(join.to_string())));
        let dir = opened.map_err(|source| FsBlobStoreError {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "opened blob directory");
        Ok(Self {
            dir: Arc::new(dir),
            clock,
        })
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, BlobStoreError>
    where
        F: FnOnce(&Dir) -> io::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let dir = Arc::clone(&self.dir);
        tokio::task::spawn_blocking(TraceId::propagate(move || op(&dir)))
            .await
            .map_err(|err| BlobStoreError::io(err.to_string()))?
            .map_err(map_io_error)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, upload: BlobUpload) -> Result<BlobMetadata, BlobStoreError> {
        let (filename, content_type, bytes) = upload.into_parts();
        let metadata = describe(
            BlobId::random(),
            filename,
            content_type,
            &bytes,
            self.clock.utc(),
        );
        let sidecar = serde_json::to_vec(&metadata)
            .map_err(|err| BlobStoreError::io(format!("encode metadata: {err}")))?;
        let id = metadata.id;
        self.blocking(move |dir| {
            dir.write(content_name(&id), &bytes)?;
            dir.write(metadata_name(&id), &sidecar)
        })
        .await?;
        Ok(metadata)
    }

    async fn get(&self, id: &BlobId) -> Result<Option<Blob>, BlobStoreError> {
        let id = *id;
        self.blocking(move |dir| {
            let Some(metadata) = read_metadata(dir, &id)? else {
                return Ok(None);
            };
            let Some(bytes) = absent_if_missing(dir.read(content_name(&id)))? else {
                warn!(blob_id = %id, "blob metadata present without content");
                return Ok(None);
            };
            Ok(Some(Blob { metadata, bytes }))
        })
        .await
    }

    async fn metadata(&self, id: &BlobId) -> Result<Option<BlobMetadata>, BlobStoreError> {
        let id = *id;
        self.blocking(move |dir| read_metadata(dir, &id)).await
    }

    async fn delete(&self, id: &BlobId) -> Result<bool, BlobStoreError> {
        let id = *id;
        self.blocking(move |dir| {
            let had_metadata = absent_if_missing(dir.remove_file(metadata_name(&id)))?.is_some();
            let had_content = absent_if_missing(dir.remove_file(content_name(&id)))?.is_some();
            Ok(had_metadata || had_content)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::{fixed_clock, upload};

    async fn store(root: &tempfile::TempDir) -> FsBlobStore {
        FsBlobStore::open(root.path().join("blobs"), fixed_clock())
            .await
            .expect("open blob dir")
    }

    #[tokio::test]
    async fn put_then_get_returns_content_and_metadata() {
        let root = tempfile::tempdir().expect("tempdir");
        let blobs = store(&root).await;

        let meta = blobs
            .put(upload("avatar.png", "image/png"))
            .await
            .expect("put");
        let blob = blobs.get(&meta.id).await.expect("get").expect("present");

        assert_eq!(blob.bytes, b"fixture bytes");
        assert_eq!(blob.metadata, meta);
        assert_eq!(meta.content_type, "image/png");
    }

    #[tokio::test]
    async fn survives_reopening_the_directory() {
        let root = tempfile::tempdir().expect("tempdir");
        let meta = store(&root)
            .await
            .put(upload("a.txt", "text/plain"))
            .await
            .expect("put");

        let reopened = store(&root).await;
        let found = reopened.metadata(&meta.id).await.expect("metadata");
        assert_eq!(found, Some(meta));
    }

    #[tokio::test]
    async fn delete_is_idempotent_and_unknown_ids_are_absent() {
        let root = tempfile::tempdir().expect("tempdir");
        let blobs = store(&root).await;
        let meta = blobs.put(upload("a.txt", "text/plain")).await.expect("put");

        assert!(blobs.delete(&meta.id).await.expect("delete"));
        assert!(!blobs.delete(&meta.id).await.expect("second delete"));
        assert!(blobs.get(&meta.id).await.expect("get").is_none());
        assert!(blobs.get(&BlobId::random()).await.expect("get").is_none());
    }
}
