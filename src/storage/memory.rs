//! In-memory object store

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;

use super::{ObjectStore, StorageError};

/// Fixed map of keys to object bytes
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    objects: HashMap<String, Bytes>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, key: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.objects.insert(key.into(), data.into());
        self
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn fetch(&self, key: &str) -> Result<Bytes, StorageError> {
        self.objects
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::not_found(key))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
