//! In-process `KvStore` backed by `DashMap`.
//!
//! Cloning produces a shared view of the same data. Nothing is persisted.

use std::sync::Arc;

use dashmap::DashMap;

use messenger_types::error::RepositoryError;

use super::kv_store::KvStore;

#[derive(Debug, Clone, Default)]
pub struct InMemoryKvStore {
    inner: Arc<DashMap<String, serde_json::Value>>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for InMemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, RepositoryError> {
        Ok(self.inner.get(key).map(|r| r.value().clone()))
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), RepositoryError> {
        self.inner.insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        self.inner.remove(key);
        Ok(())
    }
}
