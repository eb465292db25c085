//! Blob storage for resume uploads.
//!
//! DESIGN
//! ======
//! `BlobStore` is the seam between the upload flow and the storage backend.
//! The production implementation talks to the Azure Blob REST API directly
//! (`azure`), authenticating its own requests with Shared Key and handing
//! callers only service SAS URLs (`sas`). The account key never leaves this
//! module.

pub mod azure;
pub mod sas;

use axum::body::Bytes;
use time::OffsetDateTime;

pub use azure::AzureBlobStore;

#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    /// Required configuration is absent or unusable.
    #[error("storage misconfigured: {0}")]
    Misconfigured(String),

    /// The HTTP request to the storage service failed.
    #[error("storage request failed: {0}")]
    Request(String),

    /// The storage service returned a non-success status.
    #[error("storage responded with status {status}: {body}")]
    Response { status: u16, body: String },
}

/// Minimal blob-container operations needed by the upload flow.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    /// Create `container` unless it already exists.
    ///
    /// # Errors
    ///
    /// Request or response failure from the storage service.
    async fn create_container_if_absent(&self, container: &str) -> Result<(), StorageError>;

    /// Store `data` as a single block blob, replacing any existing blob.
    ///
    /// # Errors
    ///
    /// Request or response failure from the storage service.
    async fn put_blob(
        &self,
        container: &str,
        blob: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), StorageError>;

    /// Blob URL with a read-only SAS valid until `expiry`.
    ///
    /// # Errors
    ///
    /// Fails only if the URL cannot be formed from the configured endpoint.
    fn signed_read_url(&self, container: &str, blob: &str, expiry: OffsetDateTime) -> Result<String, StorageError>;
}
