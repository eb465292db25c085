//! Scoped upload: store a payload and hand back a short-lived read URL.
//!
//! DESIGN
//! ======
//! The service is a thin composition over [`BlobStore`]: ensure the target
//! container exists, upload the payload in one shot, then mint a read-only
//! SAS valid for `ttl`. It never touches the relational database, and no
//! record of the blob is kept beyond the returned URL.
//!
//! The store calls run on their own task, so an upload that has started
//! finishes even if the client disconnects before the URL is returned.
//!
//! Blob names are `{unix_millis}-{original_name}`. Two uploads of the same
//! name within one millisecond overwrite each other.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use time::OffsetDateTime;
use tracing::info;

use crate::config::UploadConfig;
use crate::storage::{AzureBlobStore, BlobStore, StorageError};

#[derive(Clone)]
pub struct ScopedUploadService {
    store: Arc<dyn BlobStore>,
    container: String,
    ttl: Duration,
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedBlob {
    pub name: String,
    pub url: String,
    pub expires_at: OffsetDateTime,
}

impl ScopedUploadService {
    #[must_use]
    pub fn new(store: Arc<dyn BlobStore>, container: impl Into<String>, ttl: Duration) -> Self {
        Self { store, container: container.into(), ttl }
    }

    /// Azure-backed service from the upload configuration.
    ///
    /// # Errors
    ///
    /// [`StorageError::Misconfigured`] when no connection string is set or
    /// the one set cannot be used.
    pub fn from_config(config: &UploadConfig) -> Result<Self, StorageError> {
        let raw = config
            .connection_string
            .as_deref()
            .ok_or_else(|| StorageError::Misconfigured("Azure Storage connection string not configured".into()))?;
        let store = AzureBlobStore::from_connection_string(raw)?;
        Ok(Self::new(Arc::new(store), config.container.clone(), config.sas_ttl))
    }

    /// Upload `payload` and return a read-only URL that expires after the
    /// configured TTL.
    ///
    /// # Errors
    ///
    /// Any [`StorageError`] from container creation, the upload, or signing.
    pub async fn upload(
        &self,
        payload: Bytes,
        original_name: &str,
        content_type: Option<&str>,
    ) -> Result<UploadedBlob, StorageError> {
        let service = self.clone();
        let original_name = original_name.to_owned();
        let content_type = content_type.map(str::to_owned);
        let now = OffsetDateTime::now_utc();
        tokio::spawn(async move {
            service
                .upload_at(payload, &original_name, content_type.as_deref(), now)
                .await
        })
        .await
        .map_err(|e| StorageError::Request(format!("upload task failed: {e}")))?
    }

    pub(crate) async fn upload_at(
        &self,
        payload: Bytes,
        original_name: &str,
        content_type: Option<&str>,
        now: OffsetDateTime,
    ) -> Result<UploadedBlob, StorageError> {
        let name = blob_name(now, original_name);
        let expires_at = now + self.ttl;
        let size = payload.len();

        self.store.create_container_if_absent(&self.container).await?;
        self.store
            .put_blob(&self.container, &name, payload, content_type)
            .await?;
        let url = self
            .store
            .signed_read_url(&self.container, &name, expires_at)?;

        info!(container = %self.container, blob = %name, size, "stored upload");
        Ok(UploadedBlob { name, url, expires_at })
    }
}

/// `{unix_millis}-{file name}`. Any client-side directory prefix
/// (`C:\fakepath\cv.pdf`, `a/b/cv.pdf`) is dropped.
#[must_use]
pub fn blob_name(now: OffsetDateTime, original_name: &str) -> String {
    let millis = now.unix_timestamp_nanos() / 1_000_000;
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);
    format!("{millis}-{base}")
}

#[cfg(test)]
#[path = "upload_test.rs"]
mod tests;
