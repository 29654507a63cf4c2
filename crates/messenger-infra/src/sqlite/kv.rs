//! SQLite key-value store implementation.
//!
//! Implements `KvStore` from `messenger-core` using sqlx with split
//! read/write pools. Values are stored as JSON text and parsed on read.

use chrono::Utc;
use sqlx::Row;

use messenger_core::storage::kv_store::KvStore;
use messenger_types::error::RepositoryError;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `KvStore`.
#[derive(Clone)]
pub struct SqliteKvStore {
    pool: DatabasePool,
}

impl SqliteKvStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn parse_value(s: &str) -> Result<serde_json::Value, RepositoryError> {
    serde_json::from_str(s)
        .map_err(|e| RepositoryError::Serialization(format!("invalid JSON value: {e}")))
}

fn query_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

impl KvStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, RepositoryError> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        match row {
            Some(row) => {
                let value: String = row.try_get("value").map_err(query_err)?;
                Ok(Some(parse_value(&value)?))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), RepositoryError> {
        let now = Utc::now().to_rfc3339();
        let value_str = serde_json::to_string(value)
            .map_err(|e| RepositoryError::Serialization(format!("failed to serialize value: {e}")))?;

        sqlx::query(
            r#"INSERT INTO kv_store (key, value, created_at, updated_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
        )
        .bind(key)
        .bind(&value_str)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool.writer)
            .await
            .map_err(query_err)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::database_url;
    use messenger_core::chat::transcript::TranscriptStore;
    use messenger_core::service::contact::ContactService;
    use messenger_types::contact::{ContactType, NewContact};
    use messenger_types::message::Message;
    use messenger_types::user::User;
    use serde_json::json;

    async fn test_store() -> SqliteKvStore {
        let dir = tempfile::tempdir().unwrap();
        let url = database_url(dir.path());
        std::mem::forget(dir);
        SqliteKvStore::new(DatabasePool::new(&url).await.unwrap())
    }

    async fn timestamps(store: &SqliteKvStore, key: &str) -> (String, String) {
        let row = sqlx::query("SELECT created_at, updated_at FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_one(&store.pool.reader)
            .await
            .unwrap();
        (row.get("created_at"), row.get("updated_at"))
    }

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let store = test_store().await;
        let value = json!({"email": "ada@example.com"});
        store.set("currentUser", &value).await.unwrap();

        let got = store.get("currentUser").await.unwrap();
        assert_eq!(got, Some(value));
    }

    #[tokio::test]
    async fn test_get_nonexistent_returns_none() {
        let store = test_store().await;
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_upserts_and_keeps_created_at() {
        let store = test_store().await;
        store.set("counter", &json!(1)).await.unwrap();
        let first = timestamps(&store, "counter").await;

        store.set("counter", &json!(2)).await.unwrap();
        let second = timestamps(&store, "counter").await;

        assert_eq!(store.get("counter").await.unwrap(), Some(json!(2)));
        assert_eq!(second.0, first.0);
        assert!(second.1 >= first.1);
    }

    #[tokio::test]
    async fn test_delete_and_delete_nonexistent() {
        let store = test_store().await;
        store.set("temp", &json!("value")).await.unwrap();
        store.delete("temp").await.unwrap();
        assert!(store.get("temp").await.unwrap().is_none());

        // Should not error
        store.delete("nope").await.unwrap();
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let url = database_url(dir.path());
        let user = User::new("ada@example.com");

        let contact_id = {
            let store = SqliteKvStore::new(DatabasePool::new(&url).await.unwrap());
            let transcripts = TranscriptStore::new(store.clone());
            let contacts = ContactService::new(store, transcripts.clone());
            let contact = contacts
                .add_contact(
                    &user,
                    NewContact {
                        name: "Grace".to_string(),
                        contact_type: ContactType::Human,
                        system_instruction: None,
                    },
                )
                .await
                .unwrap();
            transcripts
                .append(&user, &contact.id, Message::from_user("see you tomorrow"))
                .await
                .unwrap();
            contact.id
        };

        let store = SqliteKvStore::new(DatabasePool::new(&url).await.unwrap());
        let transcripts = TranscriptStore::new(store.clone());
        let contacts = ContactService::new(store, transcripts.clone());

        let listed = contacts.list_contacts(&user).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Grace");
        let messages = transcripts.messages(&user, &contact_id).await.unwrap();
        assert_eq!(messages[0].text, "see you tomorrow");
    }
}
