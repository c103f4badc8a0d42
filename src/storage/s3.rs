//! S3 object store
//!
//! Fetches source images with `GetObject`. `NoSuchKey` (and the bare
//! `NotFound` code some S3-compatible servers send) maps to
//! [`StorageError::NotFound`].

use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;

use super::{ObjectStore, StorageError};
use crate::config::S3StorageConfig;

#[derive(Debug, Clone)]
pub struct S3Store {
    client: S3Client,
    bucket: String,
    key_prefix: Option<String>,
}

impl S3Store {
    pub fn new(client: S3Client, bucket: impl Into<String>, key_prefix: Option<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            key_prefix,
        }
    }

    /// Build a client from configuration.
    ///
    /// Static credentials are used when both keys are set; otherwise the
    /// default AWS provider chain (env, profile, IMDS) applies.
    pub async fn from_config(config: &S3StorageConfig) -> Result<Self, StorageError> {
        if config.bucket.is_empty() {
            return Err(StorageError::Config(
                "S3 bucket name cannot be empty".to_string(),
            ));
        }

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()));

        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
            loader = loader.credentials_provider(aws_credential_types::Credentials::new(
                access_key.clone(),
                secret_key.clone(),
                None,
                None,
                "tsubame-config",
            ));
        }

        let sdk_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style)
            .build();

        tracing::info!(
            bucket = %config.bucket,
            region = %config.region,
            endpoint = ?config.endpoint,
            "Configured S3 object store"
        );

        Ok(Self::new(
            S3Client::from_conf(s3_config),
            config.bucket.clone(),
            config.key_prefix.clone(),
        ))
    }

    /// Full object key including the configured prefix
    pub fn object_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) if !prefix.is_empty() => {
                format!("{}/{}", prefix.trim_end_matches('/'), key)
            }
            _ => key.to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn fetch(&self, key: &str) -> Result<Bytes, StorageError> {
        if key.is_empty() {
            return Err(StorageError::not_found(key));
        }

        let object_key = self.object_key(key);
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await
            .map_err(|e| classify_get_object_error(e, key))?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::S3(format!("Failed to read S3 body: {e}")))?;

        Ok(data.into_bytes())
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}

fn classify_get_object_error(err: SdkError<GetObjectError>, key: &str) -> StorageError {
    if let Some(service_error) = err.as_service_error() {
        if service_error.is_no_such_key() || service_error.code() == Some("NotFound") {
            return StorageError::not_found(key);
        }
    }
    StorageError::S3(format!("S3 fetch failed: {}", DisplayErrorContext(&err)))
}
