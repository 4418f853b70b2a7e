//! In-memory blob stores for tests

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;

use super::{blob_key, BlobError, BlobStore};

/// Keeps uploads in a map keyed by URL
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, (String, Bytes)>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().len()
    }

    pub fn content_type(&self, url: &str) -> Option<String> {
        self.blobs.lock().get(url).map(|(ct, _)| ct.clone())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(
        &self,
        data: Bytes,
        filename: &str,
        content_type: &str,
        folder: &str,
    ) -> Result<String, BlobError> {
        let url = format!("memory://{}", blob_key(folder, filename));
        self.blobs
            .lock()
            .insert(url.clone(), (content_type.to_string(), data));
        Ok(url)
    }

    async fn delete(&self, url: &str) -> Result<(), BlobError> {
        self.blobs.lock().remove(url);
        Ok(())
    }
}

/// Rejects every upload
pub struct FailingBlobStore;

#[async_trait]
impl BlobStore for FailingBlobStore {
    async fn upload(
        &self,
        _data: Bytes,
        _filename: &str,
        _content_type: &str,
        _folder: &str,
    ) -> Result<String, BlobError> {
        Err(BlobError::Service("storage unavailable".to_string()))
    }

    async fn delete(&self, url: &str) -> Result<(), BlobError> {
        Err(BlobError::ForeignUrl(url.to_string()))
    }
}
