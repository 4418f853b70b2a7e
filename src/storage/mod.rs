//! Blob storage for cover art and audio
//!
//! Uploads return a public URL that is stored on the release/track row.
//! Storage is not transactional with the database; callers delete the blob
//! themselves when the row that would reference it fails to persist.

mod http;
mod local;
#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;

pub use http::HttpBlobStore;
pub use local::LocalBlobStore;

use crate::config::{BlobBackend, BlobSettings};
use crate::utils::auth::generate_random_string;
use crate::utils::filesystem::sanitize_filename;

#[derive(Error, Debug)]
pub enum BlobError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Blob service error: {0}")]
    Service(String),
    #[error("URL is not managed by this store: {0}")]
    ForeignUrl(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Storage backend for uploaded files
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under `folder` and return its public URL
    async fn upload(
        &self,
        data: Bytes,
        filename: &str,
        content_type: &str,
        folder: &str,
    ) -> Result<String, BlobError>;

    /// Remove a previously uploaded blob by its public URL
    async fn delete(&self, url: &str) -> Result<(), BlobError>;
}

/// Object key for an upload: `<folder>/<millis>-<nonce>-<filename>`
pub fn blob_key(folder: &str, filename: &str) -> String {
    format!(
        "{}/{}-{}-{}",
        folder,
        chrono::Utc::now().timestamp_millis(),
        generate_random_string(6).to_lowercase(),
        sanitize_filename(filename)
    )
}

/// Build the configured backend
pub fn from_settings(settings: &BlobSettings) -> Result<Arc<dyn BlobStore>, BlobError> {
    match settings.backend {
        BlobBackend::Local => {
            let root = settings
                .local_dir
                .clone()
                .ok_or_else(|| BlobError::Config("blob.local_dir is not set".to_string()))?;
            Ok(Arc::new(LocalBlobStore::new(
                root,
                settings.public_base_url.clone(),
            )))
        }
        BlobBackend::Http => {
            let endpoint = settings
                .endpoint
                .clone()
                .ok_or_else(|| BlobError::Config("blob.endpoint is not set".to_string()))?;
            Ok(Arc::new(HttpBlobStore::new(endpoint, settings.token.clone())))
        }
    }
}
