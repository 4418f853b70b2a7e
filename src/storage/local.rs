//! Filesystem blob store, served back over HTTP under `/media`

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use super::{blob_key, BlobError, BlobStore};

pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: PathBuf, public_base_url: String) -> Self {
        Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Map a public URL back to a file under the root
    fn path_for_url(&self, url: &str) -> Result<PathBuf, BlobError> {
        let key = url
            .strip_prefix(&self.public_base_url)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| BlobError::ForeignUrl(url.to_string()))?;

        let relative = Path::new(key);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(BlobError::ForeignUrl(url.to_string()));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(
        &self,
        data: Bytes,
        filename: &str,
        _content_type: &str,
        folder: &str,
    ) -> Result<String, BlobError> {
        let key = blob_key(folder, filename);
        let path = self.root.join(&key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &data).await?;

        debug!("Stored {} bytes at {:?}", data.len(), path);
        Ok(format!("{}/{}", self.public_base_url, key))
    }

    async fn delete(&self, url: &str) -> Result<(), BlobError> {
        let path = self.path_for_url(url)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_then_delete() {
        let tmp = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(tmp.path().to_path_buf(), "http://host/media/".to_string());

        let url = store
            .upload(Bytes::from_static(b"PNGDATA"), "cover.png", "image/png", "covers")
            .await
            .unwrap();
        assert!(url.starts_with("http://host/media/covers/"));
        assert!(url.ends_with("-cover.png"));

        let path = store.path_for_url(&url).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"PNGDATA");

        store.delete(&url).await.unwrap();
        assert!(!path.exists());

        // deleting twice is fine
        store.delete(&url).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_rejects_foreign_and_traversal_urls() {
        let tmp = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(tmp.path().to_path_buf(), "http://host/media".to_string());

        assert!(matches!(
            store.delete("http://elsewhere/covers/a.png").await,
            Err(BlobError::ForeignUrl(_))
        ));
        assert!(matches!(
            store.delete("http://host/media/../secret").await,
            Err(BlobError::ForeignUrl(_))
        ));
    }
}
