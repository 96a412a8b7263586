//! HTTP client for the Supabase-style object storage API.
//!
//! Uploads go to the single configured bucket with overwrite-allowed
//! semantics; deletes may target any bucket so that objects referenced by
//! URLs written before a bucket rename stay deletable.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::StorageConfig;
use crate::storage::public_url::PUBLIC_MARKER;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Delete error: {0}")]
    Delete(String),

    #[error("Object size {size} bytes exceeds limit of {limit_mb} MB")]
    TooLarge { size: u64, limit_mb: u64 },

    #[error("Storage error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Seam between the media workflows and the physical object store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write an object into the configured bucket, overwriting any existing
    /// object under the same key.
    async fn upload_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<(), StorageError>;

    /// Remove an object. An already-missing object counts as removed.
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError>;

    /// Public URL for a key in the configured bucket.
    fn public_url(&self, key: &str) -> String;
}

pub struct StorageClient {
    config: StorageConfig,
    http_client: Client,
}

impl StorageClient {
    pub fn new(config: StorageConfig) -> Result<Self> {
        info!("Initializing storage client for bucket: {}", config.bucket);

        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.config.endpoint, bucket, key)
    }
}

#[async_trait]
impl ObjectStore for StorageClient {
    async fn upload_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<(), StorageError> {
        debug!("Uploading object: {} ({} bytes)", key, data.len());

        let limit_bytes = self.config.max_upload_mb * 1024 * 1024;
        if data.len() as u64 > limit_bytes {
            return Err(StorageError::TooLarge {
                size: data.len() as u64,
                limit_mb: self.config.max_upload_mb,
            });
        }

        let url = self.object_url(&self.config.bucket, key);
        let content_type =
            content_type.unwrap_or_else(|| detect_content_type(&data).to_string());

        let response = self
            .http_client
            .put(&url)
            .bearer_auth(&self.config.service_key)
            .header("x-upsert", "true")
            .header(reqwest::header::CACHE_CONTROL, "max-age=3600")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Storage upload failed: {} - {}", status, error_text);
            return Err(StorageError::Upload(format!("status {}", status)));
        }

        info!("Object uploaded successfully: {}", key);
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        debug!("Deleting object: {}/{}", bucket, key);

        let url = self.object_url(bucket, key);

        let response = self
            .http_client
            .delete(&url)
            .bearer_auth(&self.config.service_key)
            .send()
            .await
            .map_err(|e| StorageError::Delete(e.to_string()))?;

        if response.status().is_success() || response.status() == reqwest::StatusCode::NOT_FOUND {
            info!("Object deleted: {}/{}", bucket, key);
            Ok(())
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            Err(StorageError::Delete(format!(
                "status {}: {}",
                status, error_text
            )))
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}{}{}/{}",
            self.config.endpoint, PUBLIC_MARKER, self.config.bucket, key
        )
    }
}

/// Detect content type from magic bytes, for uploads whose multipart part
/// carried no content type.
fn detect_content_type(data: &[u8]) -> &'static str {
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        return "image/png";
    }
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return "image/jpeg";
    }
    if data.len() >= 12 && data.starts_with(b"RIFF") {
        match &data[8..12] {
            b"WEBP" => return "image/webp",
            b"WAVE" => return "audio/wav",
            _ => {}
        }
    }
    if data.starts_with(b"ID3")
        || data.starts_with(&[0xFF, 0xFB])
        || data.starts_with(&[0xFF, 0xF3])
        || data.starts_with(&[0xFF, 0xF2])
    {
        return "audio/mpeg";
    }
    if data.len() >= 12 && &data[4..8] == b"ftyp" {
        return "audio/mp4";
    }

    "application/octet-stream"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::public_url::parse_public_url;

    fn test_client() -> StorageClient {
        StorageClient::new(StorageConfig::default()).unwrap()
    }

    #[test]
    fn test_content_type_detection() {
        assert_eq!(detect_content_type(b"\x89PNG\r\n\x1a\n"), "image/png");
        assert_eq!(detect_content_type(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
        assert_eq!(detect_content_type(b"RIFF\x00\x00\x00\x00WEBPVP8 "), "image/webp");
        assert_eq!(detect_content_type(b"RIFF\x00\x00\x00\x00WAVEfmt "), "audio/wav");
        assert_eq!(detect_content_type(b"ID3\x04\x00"), "audio/mpeg");
        assert_eq!(detect_content_type(b"\x00\x00\x00\x20ftypM4A "), "audio/mp4");
        assert_eq!(detect_content_type(b"TEST"), "application/octet-stream");
    }

    #[test]
    fn test_public_url_round_trips_through_parser() {
        let client = test_client();
        let key = "stops/S1/images/abc123.jpg";

        let url = client.public_url(key);
        let parsed = parse_public_url(&url).unwrap();

        assert_eq!(parsed.bucket, client.config.bucket);
        assert_eq!(parsed.key, key);
    }

    #[tokio::test]
    async fn test_upload_rejects_oversized_object() {
        let client = StorageClient::new(StorageConfig {
            max_upload_mb: 0,
            ..StorageConfig::default()
        })
        .unwrap();

        let result = client.upload_object("k", vec![0u8; 1], None).await;
        assert!(matches!(result, Err(StorageError::TooLarge { .. })));
    }
}
