//! Per-contact message transcripts.
//!
//! All of a user's transcripts live under one key (`messages_<email>`) as a
//! map of contact id -> ordered message list. Every mutation re-reads that
//! map under `write_lock`, so concurrent sends to different contacts of the
//! same user never overwrite each other.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use messenger_types::contact::ContactId;
use messenger_types::error::RepositoryError;
use messenger_types::keys::messages_key;
use messenger_types::message::Message;
use messenger_types::user::User;

use crate::storage::kv_store::{KvStore, load_json, save_json};

/// Stored shape: contact id string -> messages in insertion order.
pub type TranscriptMap = HashMap<String, Vec<Message>>;

/// Cloning shares the write lock, so every clone serializes with the others.
#[derive(Clone)]
pub struct TranscriptStore<K: KvStore> {
    store: K,
    write_lock: Arc<Mutex<()>>,
}

impl<K: KvStore> TranscriptStore<K> {
    pub fn new(store: K) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    async fn load(&self, user: &User) -> Result<TranscriptMap, RepositoryError> {
        Ok(load_json(&self.store, &messages_key(user))
            .await?
            .unwrap_or_default())
    }

    /// Messages exchanged with `contact_id`, oldest first. Empty if none.
    pub async fn messages(
        &self,
        user: &User,
        contact_id: &ContactId,
    ) -> Result<Vec<Message>, RepositoryError> {
        let mut map = self.load(user).await?;
        Ok(map.remove(&contact_id.to_string()).unwrap_or_default())
    }

    /// Number of messages per contact, for list views.
    pub async fn counts(&self, user: &User) -> Result<HashMap<String, usize>, RepositoryError> {
        let map = self.load(user).await?;
        Ok(map.into_iter().map(|(id, msgs)| (id, msgs.len())).collect())
    }

    /// Create an empty transcript for a new contact. Keeps an existing one.
    pub async fn init(&self, user: &User, contact_id: &ContactId) -> Result<(), RepositoryError> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.load(user).await?;
        map.entry(contact_id.to_string()).or_default();
        save_json(&self.store, &messages_key(user), &map).await
    }

    /// Append one message and persist immediately.
    pub async fn append(
        &self,
        user: &User,
        contact_id: &ContactId,
        message: Message,
    ) -> Result<(), RepositoryError> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.load(user).await?;
        map.entry(contact_id.to_string()).or_default().push(message);
        save_json(&self.store, &messages_key(user), &map).await
    }

    /// Drop a contact's transcript. Returns whether one existed.
    pub async fn remove(&self, user: &User, contact_id: &ContactId) -> Result<bool, RepositoryError> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.load(user).await?;
        let existed = map.remove(&contact_id.to_string()).is_some();
        if existed {
            save_json(&self.store, &messages_key(user), &map).await?;
        }
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::InMemoryKvStore;
    use messenger_types::message::MessageSender;

    fn user() -> User {
        User::new("ada@example.com")
    }

    #[tokio::test]
    async fn append_preserves_order() {
        let transcripts = TranscriptStore::new(InMemoryKvStore::new());
        let id = ContactId::new();
        transcripts.append(&user(), &id, Message::from_user("one")).await.unwrap();
        transcripts.append(&user(), &id, Message::from_contact("two")).await.unwrap();

        let msgs = transcripts.messages(&user(), &id).await.unwrap();
        let texts: Vec<_> = msgs.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two"]);
        assert_eq!(msgs[1].sender, MessageSender::Contact);
    }

    #[tokio::test]
    async fn transcripts_are_namespaced_by_user() {
        let store = InMemoryKvStore::new();
        let transcripts = TranscriptStore::new(store.clone());
        let id = ContactId::new();
        transcripts.append(&user(), &id, Message::from_user("hi")).await.unwrap();

        let other = User::new("grace@example.com");
        assert!(transcripts.messages(&other, &id).await.unwrap().is_empty());
        assert!(store.get("messages_ada@example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn init_and_remove() {
        let transcripts = TranscriptStore::new(InMemoryKvStore::new());
        let id = ContactId::new();
        transcripts.init(&user(), &id).await.unwrap();
        let counts = transcripts.counts(&user()).await.unwrap();
        assert_eq!(counts.get(&id.to_string()), Some(&0));

        assert!(transcripts.remove(&user(), &id).await.unwrap());
        assert!(!transcripts.remove(&user(), &id).await.unwrap());
        assert!(transcripts.counts(&user()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_appends_to_different_contacts_are_not_lost() {
        let transcripts = TranscriptStore::new(InMemoryKvStore::new());
        let ids: Vec<ContactId> = (0..8).map(|_| ContactId::new()).collect();

        let mut handles = Vec::new();
        for id in ids.clone() {
            let transcripts = transcripts.clone();
            handles.push(tokio::spawn(async move {
                for n in 0..5 {
                    transcripts
                        .append(&user(), &id, Message::from_user(format!("m{n}")))
                        .await
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let counts = transcripts.counts(&user()).await.unwrap();
        for id in &ids {
            assert_eq!(counts.get(&id.to_string()), Some(&5));
        }
    }
}
