//! Object storage backends
//!
//! The handler reads source images through the [`ObjectStore`] trait so the
//! backing store is chosen at startup and injected, never reached through a
//! global client:
//!
//! - [`S3Store`] - any S3-compatible bucket (AWS, MinIO, LocalStack)
//! - [`FilesystemStore`] - a directory on local disk
//! - [`InMemoryStore`] - fixed set of objects, for tests and embedding
//!
//! Backends must report a missing object as [`StorageError::NotFound`]; the
//! handler turns that into a 404 and everything else into a 500.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

pub mod error;
pub mod filesystem;
pub mod memory;
pub mod s3;

pub use error::StorageError;
pub use filesystem::FilesystemStore;
pub use memory::InMemoryStore;
pub use s3::S3Store;

use crate::config::{StorageBackend, StorageConfig};

/// Read-only access to source objects
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the full contents of the object at `key`
    async fn fetch(&self, key: &str) -> Result<Bytes, StorageError>;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}

/// Build the configured storage backend
pub async fn build_store(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, StorageError> {
    match config.backend {
        StorageBackend::S3 => {
            let s3_config = config.s3.as_ref().ok_or_else(|| {
                StorageError::Config("storage.s3 section is required for the s3 backend".into())
            })?;
            Ok(Arc::new(S3Store::from_config(s3_config).await?))
        }
        StorageBackend::Filesystem => {
            let fs_config = config.filesystem.as_ref().ok_or_else(|| {
                StorageError::Config(
                    "storage.filesystem section is required for the filesystem backend".into(),
                )
            })?;
            Ok(Arc::new(FilesystemStore::new(&fs_config.root)))
        }
    }
}
