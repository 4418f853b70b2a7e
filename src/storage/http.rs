//! Remote blob service client.
//!
//! `PUT {endpoint}/{key}` with the raw bytes, answered by `{"url": ...}`;
//! deletes go to `POST {endpoint}/delete` with `{"urls": [...]}`.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;

use super::{blob_key, BlobError, BlobStore};

#[derive(Debug, Deserialize)]
struct PutResponse {
    url: String,
}

pub struct HttpBlobStore {
    endpoint: String,
    token: Option<String>,
    client: Client,
}

impl HttpBlobStore {
    pub fn new(endpoint: String, token: Option<String>) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token,
            client: Client::new(),
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Map a non-success response into a BlobError
    async fn map_error(what: &str, resp: reqwest::Response) -> BlobError {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        BlobError::Service(format!("{what}: {status}: {body}"))
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn upload(
        &self,
        data: Bytes,
        filename: &str,
        content_type: &str,
        folder: &str,
    ) -> Result<String, BlobError> {
        let key = blob_key(folder, filename);
        let url = format!("{}/{}", self.endpoint, key);

        let resp = self
            .authorize(self.client.put(&url))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-access", "public")
            .body(data)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Self::map_error(&format!("upload {key}"), resp).await);
        }

        let body: PutResponse = resp.json().await?;
        Ok(body.url)
    }

    async fn delete(&self, url: &str) -> Result<(), BlobError> {
        let resp = self
            .authorize(self.client.post(format!("{}/delete", self.endpoint)))
            .json(&serde_json::json!({ "urls": [url] }))
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(Self::map_error(&format!("delete {url}"), resp).await)
        }
    }
}
