//! Key-value store trait.
//!
//! Every piece of persistent state (credentials, contact lists, transcripts,
//! the logged-in user) is a JSON value under a string key. Implementations
//! live in messenger-infra; `InMemoryKvStore` backs the tests.

use serde::Serialize;
use serde::de::DeserializeOwned;

use messenger_types::error::RepositoryError;

/// Trait for durable key-value storage of JSON values.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait KvStore: Send + Sync {
    /// Get a value by key. Returns None if the key does not exist.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<serde_json::Value>, RepositoryError>> + Send;

    /// Set a value for a key (upsert).
    fn set(
        &self,
        key: &str,
        value: &serde_json::Value,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a key. No-op if key does not exist.
    fn delete(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}

/// Read `key` and decode it as `T`.
pub async fn load_json<K, T>(store: &K, key: &str) -> Result<Option<T>, RepositoryError>
where
    K: KvStore,
    T: DeserializeOwned,
{
    match store.get(key).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| RepositoryError::Serialization(format!("{key}: {e}"))),
        None => Ok(None),
    }
}

/// Encode `value` as JSON and store it under `key`.
pub async fn save_json<K, T>(store: &K, key: &str, value: &T) -> Result<(), RepositoryError>
where
    K: KvStore,
    T: Serialize + Sync,
{
    let value = serde_json::to_value(value)
        .map_err(|e| RepositoryError::Serialization(format!("{key}: {e}")))?;
    store.set(key, &value).await
}
