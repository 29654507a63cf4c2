//! Contact management service.
//!
//! Owns the per-user contact list (`contacts_<email>`) and keeps the
//! transcript map in step with it: adding a contact opens an empty
//! transcript, removing one drops it.

use std::sync::Arc;

use tokio::sync::Mutex;

use messenger_types::contact::{Contact, ContactId, ContactType, NewContact};
use messenger_types::error::ContactError;
use messenger_types::keys::contacts_key;
use messenger_types::user::User;

use crate::chat::transcript::TranscriptStore;
use crate::storage::kv_store::{KvStore, load_json, save_json};

/// Service for listing, resolving, adding and removing contacts.
///
/// Generic over the storage port to maintain clean architecture --
/// messenger-core never depends on messenger-infra.
#[derive(Clone)]
pub struct ContactService<K: KvStore> {
    store: K,
    transcripts: TranscriptStore<K>,
    write_lock: Arc<Mutex<()>>,
}

impl<K: KvStore> ContactService<K> {
    pub fn new(store: K, transcripts: TranscriptStore<K>) -> Self {
        Self {
            store,
            transcripts,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// All contacts of `user`, in the order they were added.
    pub async fn list_contacts(&self, user: &User) -> Result<Vec<Contact>, ContactError> {
        Ok(load_json(&self.store, &contacts_key(user))
            .await?
            .unwrap_or_default())
    }

    /// Get a contact by ID.
    pub async fn get_contact(&self, user: &User, id: &ContactId) -> Result<Contact, ContactError> {
        self.list_contacts(user)
            .await?
            .into_iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| ContactError::NotFound(id.to_string()))
    }

    /// Resolve a contact from user input: an exact id first, then a
    /// case-insensitive name.
    pub async fn find_contact(&self, user: &User, selector: &str) -> Result<Contact, ContactError> {
        let selector = selector.trim();
        let contacts = self.list_contacts(user).await?;

        if let Ok(id) = selector.parse::<ContactId>() {
            if let Some(contact) = contacts.iter().find(|c| c.id == id) {
                return Ok(contact.clone());
            }
        }

        let wanted = selector.to_lowercase();
        let mut matches = contacts
            .into_iter()
            .filter(|c| c.name.to_lowercase() == wanted);
        match (matches.next(), matches.next()) {
            (Some(contact), None) => Ok(contact),
            (Some(_), Some(_)) => Err(ContactError::Ambiguous(selector.to_string())),
            (None, _) => Err(ContactError::NotFound(selector.to_string())),
        }
    }

    /// Create a contact with a fresh id and an empty transcript.
    ///
    /// The name is trimmed and must not be blank. Human contacts never keep a
    /// system instruction; a blank one on an AI contact becomes `None` so the
    /// default persona applies.
    pub async fn add_contact(&self, user: &User, request: NewContact) -> Result<Contact, ContactError> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(ContactError::EmptyName);
        }

        let system_instruction = match request.contact_type {
            ContactType::Ai => request
                .system_instruction
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            ContactType::Human => None,
        };

        let contact = Contact {
            id: ContactId::new(),
            name,
            contact_type: request.contact_type,
            avatar: String::new(),
            system_instruction,
        };

        {
            let _guard = self.write_lock.lock().await;
            let mut contacts = self.list_contacts(user).await?;
            contacts.push(contact.clone());
            save_json(&self.store, &contacts_key(user), &contacts).await?;
        }
        self.transcripts.init(user, &contact.id).await?;

        tracing::info!(
            contact_id = %contact.id,
            contact_type = %contact.contact_type,
            "contact added"
        );
        Ok(contact)
    }

    /// Remove a contact and its transcript.
    ///
    /// Returns `false` when the contact was already gone; nothing changes in
    /// that case.
    pub async fn remove_contact(&self, user: &User, id: &ContactId) -> Result<bool, ContactError> {
        let removed = {
            let _guard = self.write_lock.lock().await;
            let mut contacts = self.list_contacts(user).await?;
            let before = contacts.len();
            contacts.retain(|c| &c.id != id);
            let removed = contacts.len() != before;
            if removed {
                save_json(&self.store, &contacts_key(user), &contacts).await?;
            }
            removed
        };

        // Also sweeps a transcript left behind without its contact.
        self.transcripts.remove(user, id).await?;

        if removed {
            tracing::info!(contact_id = %id, "contact removed");
        }
        Ok(removed)
    }
}
