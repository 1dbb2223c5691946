//! Blob store adapters.
//!
//! - [`FsBlobStore`]: content and a JSON metadata sidecar per blob, under a
//!   directory opened once at startup through `cap_std`.
//! - [`InMemoryBlobStore`]: process-local map for tests.

mod fs;
mod memory;

pub use fs::{FsBlobStore, FsBlobStoreError};
pub use memory::InMemoryBlobStore;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::domain::{BlobId, BlobMetadata};

/// Describe freshly stored content.
fn describe(
    id: BlobId,
    filename: String,
    content_type: String,
    bytes: &[u8],
    uploaded_at: DateTime<Utc>,
) -> BlobMetadata {
    BlobMetadata {
        id,
        filename,
        content_type,
        size: bytes.len() as u64,
        sha256: hex::encode(Sha256::digest(bytes)),
        uploaded_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_hashes_content() {
        let meta = describe(
            BlobId::random(),
            "a.txt".into(),
            "text/plain".into(),
            b"abc",
            Utc::now(),
        );
        assert_eq!(meta.size, 3);
        assert_eq!(
            meta.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
