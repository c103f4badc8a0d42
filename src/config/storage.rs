//! Storage backend configuration.
//!
//! ```yaml
//! storage:
//!   backend: s3
//!   s3:
//!     bucket: "product-images"
//!     region: "us-east-1"
//!     endpoint: "http://localhost:9000"   # optional, for MinIO
//!     access_key: "${AWS_ACCESS_KEY_ID}"  # optional
//!     secret_key: "${AWS_SECRET_ACCESS_KEY}"
//!     force_path_style: true
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    S3,
    Filesystem,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct S3StorageConfig {
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    /// Prepended to every object key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_prefix: Option<String>,
    /// Required by most S3-compatible servers
    #[serde(default)]
    pub force_path_style: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilesystemStorageConfig {
    pub root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3StorageConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filesystem: Option<FilesystemStorageConfig>,
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), String> {
        match self.backend {
            StorageBackend::S3 => {
                let s3 = self
                    .s3
                    .as_ref()
                    .ok_or_else(|| "storage.s3 is required when backend is s3".to_string())?;
                if s3.bucket.trim().is_empty() {
                    return Err("storage.s3.bucket cannot be empty".to_string());
                }
                if s3.access_key.is_some() != s3.secret_key.is_some() {
                    return Err(
                        "storage.s3.access_key and storage.s3.secret_key must be set together"
                            .to_string(),
                    );
                }
            }
            StorageBackend::Filesystem => {
                let fs = self.filesystem.as_ref().ok_or_else(|| {
                    "storage.filesystem is required when backend is filesystem".to_string()
                })?;
                if fs.root.as_os_str().is_empty() {
                    return Err("storage.filesystem.root cannot be empty".to_string());
                }
            }
        }
        Ok(())
    }
}
