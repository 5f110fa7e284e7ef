//! S3 primary-tier backend
//!
//! Wraps the AWS SDK for S3-compatible storage access (AWS S3, MinIO, R2).

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{Credentials, Region},
    presigning::PresigningConfig,
    primitives::ByteStream,
    Client,
};

use crate::config::S3Config;

use super::backend::ObjectBackend;
use super::error::StorageError;

/// Lifetime of presigned GET URLs.
const SIGNED_URL_TTL: Duration = Duration::from_secs(3600);

/// Network object-store tier backed by S3
#[derive(Clone)]
pub struct S3Backend {
    client: Client,
    bucket: String,
}

impl S3Backend {
    /// Build a client from static credentials.
    ///
    /// The bucket is verified with a head request, but a failed probe only
    /// logs: operations are still attempted against the configured bucket.
    pub async fn new(config: &S3Config) -> Result<Self, StorageError> {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "archivo",
        );

        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true); // Required for MinIO and other S3-compatible services
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        let client = Client::from_conf(builder.build());

        let bucket = config.bucket.clone();
        match client.head_bucket().bucket(&bucket).send().await {
            Ok(_) => {
                tracing::info!("Connected to S3 bucket: {}", bucket);
            }
            Err(e) => {
                tracing::warn!(
                    "Could not verify bucket {}: {}. Will attempt operations anyway.",
                    bucket,
                    e
                );
            }
        }

        Ok(Self { client, bucket })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Live connectivity probe, independent of any routing decision.
    pub async fn is_reachable(&self) -> bool {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("S3 availability check failed: {}", e);
                false
            }
        }
    }

    fn object_key(guid: &str) -> String {
        format!("pdfs/{}.pdf", guid)
    }
}

#[async_trait]
impl ObjectBackend for S3Backend {
    async fn put(&self, guid: &str, data: &[u8]) -> Result<(), StorageError> {
        let key = Self::object_key(guid);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type("application/pdf")
            .body(ByteStream::from(data.to_vec()))
            .send()
            .await
            .map_err(|e| StorageError::SdkError(format!("Failed to put object {}: {}", key, e)))?;
        Ok(())
    }

    async fn get(&self, guid: &str) -> Result<Vec<u8>, StorageError> {
        let key = Self::object_key(guid);
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| {
                let text = e.to_string();
                if e.into_service_error().is_no_such_key() {
                    StorageError::ObjectNotFound(key.clone())
                } else {
                    StorageError::SdkError(format!("Failed to get object {}: {}", key, text))
                }
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::SdkError(format!("Failed to read object body: {}", e)))?
            .into_bytes()
            .to_vec();

        Ok(data)
    }

    async fn delete(&self, guid: &str) -> Result<bool, StorageError> {
        let key = Self::object_key(guid);

        // DeleteObject succeeds for absent keys, so probe first to report
        // whether anything was actually removed.
        let existed = self.exists(guid).await.unwrap_or(false);

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| {
                StorageError::SdkError(format!("Failed to delete object {}: {}", key, e))
            })?;

        Ok(existed)
    }

    async fn exists(&self, guid: &str) -> Result<bool, StorageError> {
        let key = Self::object_key(guid);
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                let text = e.to_string();
                if e.into_service_error().is_not_found() {
                    Ok(false)
                } else {
                    Err(StorageError::SdkError(format!(
                        "Failed to head object {}: {}",
                        key, text
                    )))
                }
            }
        }
    }

    async fn url(&self, guid: &str) -> Result<String, StorageError> {
        let key = Self::object_key(guid);
        let presigning = PresigningConfig::expires_in(SIGNED_URL_TTL)
            .map_err(|e| StorageError::SdkError(format!("Invalid presigning config: {}", e)))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::SdkError(format!("Failed to presign {}: {}", key, e)))?;

        Ok(request.uri().to_string())
    }
}
