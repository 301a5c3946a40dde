//! Blob store client for rendered artifacts.
//!
//! The queue consumes exactly three operations from the store: upload,
//! visibility-scoped retrieval URL generation, and delete-by-path.
//! [`ArtifactStore`] captures that contract; [`s3::S3ArtifactStore`]
//! backs it with any S3-compatible service and
//! [`memory::InMemoryArtifactStore`] backs it with a process-local map
//! for local development and tests.

pub mod memory;
pub mod s3;

use async_trait::async_trait;

/// Errors from the blob store backend.
///
/// Callers on the cleanup path treat these as non-fatal: a failed blob
/// delete is logged and the surrounding database operation still
/// completes.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage configuration error: {0}")]
    Config(String),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("No object at path: {0}")]
    NotFound(String),
}

/// Path-addressed artifact storage with per-object visibility.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Upload `bytes` at `path`, returning the stored path.
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        is_public: bool,
    ) -> Result<String, StorageError>;

    /// Produce a retrieval URL for `path`: a stable public URL for
    /// public objects, a short-lived presigned URL for private ones.
    async fn get_url(&self, path: &str, is_public: bool) -> Result<String, StorageError>;

    /// Delete the object at `path`. Deleting a missing object is not
    /// an error.
    async fn delete(&self, path: &str) -> Result<(), StorageError>;
}
