//! Conversation orchestrator.
//!
//! Runs one send: persist the user's message, and for AI contacts fetch a
//! reply through the session cache and persist that too. Failures on the AI
//! path become a fixed apology in the transcript plus a session reset; the
//! cause is logged and handed back in the outcome.
//!
//! Sends to the same contact are serialized by a per-contact lock, so a
//! second message waits until the first one's reply is written. Sends to
//! different contacts run concurrently.

use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use tokio::sync::Mutex;

use messenger_types::contact::{Contact, ContactId};
use messenger_types::error::ChatError;
use messenger_types::llm::{CompletionResponse, Usage};
use messenger_types::message::Message;
use messenger_types::user::User;

use super::session_cache::SessionCache;
use super::transcript::TranscriptStore;
use crate::service::contact::ContactService;
use crate::storage::kv_store::KvStore;

/// Reply recorded when an AI contact could not be reached.
pub const APOLOGY_TEXT: &str = "I'm having trouble connecting right now. Please try again later.";

/// What happened to a sent message.
#[derive(Debug, Clone)]
pub enum SendOutcome {
    /// Stored for a human contact; no reply is expected.
    Delivered { message: Message },
    /// The AI contact answered.
    Replied {
        message: Message,
        reply: Message,
        usage: Usage,
    },
    /// The AI call failed; `reply` holds the stored apology.
    Apologized {
        message: Message,
        reply: Message,
        reason: String,
    },
}

impl SendOutcome {
    pub fn message(&self) -> &Message {
        match self {
            SendOutcome::Delivered { message }
            | SendOutcome::Replied { message, .. }
            | SendOutcome::Apologized { message, .. } => message,
        }
    }

    pub fn reply(&self) -> Option<&Message> {
        match self {
            SendOutcome::Delivered { .. } => None,
            SendOutcome::Replied { reply, .. } | SendOutcome::Apologized { reply, .. } => {
                Some(reply)
            }
        }
    }
}

pub struct ConversationOrchestrator<K: KvStore> {
    contacts: ContactService<K>,
    transcripts: TranscriptStore<K>,
    sessions: Arc<SessionCache>,
    send_locks: DashMap<ContactId, Arc<Mutex<()>>>,
    typing: DashSet<ContactId>,
}

/// Clears the typing flag when dropped, whichever way the send ends.
struct TypingGuard<'a> {
    typing: &'a DashSet<ContactId>,
    contact_id: ContactId,
}

impl Drop for TypingGuard<'_> {
    fn drop(&mut self) {
        self.typing.remove(&self.contact_id);
    }
}

impl<K: KvStore> ConversationOrchestrator<K> {
    pub fn new(
        contacts: ContactService<K>,
        transcripts: TranscriptStore<K>,
        sessions: Arc<SessionCache>,
    ) -> Self {
        Self {
            contacts,
            transcripts,
            sessions,
            send_locks: DashMap::new(),
            typing: DashSet::new(),
        }
    }

    pub fn sessions(&self) -> &Arc<SessionCache> {
        &self.sessions
    }

    /// Whether an AI reply for `contact_id` is in flight.
    pub fn is_typing(&self, contact_id: &ContactId) -> bool {
        self.typing.contains(contact_id)
    }

    fn send_lock(&self, contact_id: &ContactId) -> Arc<Mutex<()>> {
        self.send_locks
            .entry(contact_id.clone())
            .or_default()
            .value()
            .clone()
    }

    fn mark_typing(&self, contact_id: &ContactId) -> TypingGuard<'_> {
        self.typing.insert(contact_id.clone());
        TypingGuard {
            typing: &self.typing,
            contact_id: contact_id.clone(),
        }
    }

    /// Send `text` to a contact.
    ///
    /// The user's message is persisted before any AI call. Human contacts get
    /// nothing more. AI contacts always get exactly one reply message: the
    /// model's answer, or `APOLOGY_TEXT` if the call failed for any reason.
    #[tracing::instrument(skip_all, fields(contact_id = %contact_id))]
    pub async fn send(
        &self,
        user: &User,
        contact_id: &ContactId,
        text: &str,
    ) -> Result<SendOutcome, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let lock = self.send_lock(contact_id);
        let _serial = lock.lock().await;

        let contact = self.contacts.get_contact(user, contact_id).await?;
        let prior = self.transcripts.messages(user, contact_id).await?;

        let message = Message::from_user(text);
        self.transcripts
            .append(user, contact_id, message.clone())
            .await?;

        if !contact.is_ai() {
            return Ok(SendOutcome::Delivered { message });
        }

        let _typing = self.mark_typing(contact_id);
        match self.ask(&contact, &prior, text).await {
            Ok(response) => {
                let reply = Message::from_contact(response.content);
                if let Err(err) = self.transcripts.append(user, contact_id, reply.clone()).await {
                    // The session already holds this turn; rebuild it from the transcript next time.
                    self.sessions.delete(contact_id);
                    return Err(err.into());
                }
                Ok(SendOutcome::Replied {
                    message,
                    reply,
                    usage: response.usage,
                })
            }
            Err(err) => {
                tracing::warn!(error = %err, "AI reply failed, resetting session");
                self.sessions.delete(contact_id);
                let reply = Message::from_contact(APOLOGY_TEXT);
                self.transcripts.append(user, contact_id, reply.clone()).await?;
                Ok(SendOutcome::Apologized {
                    message,
                    reply,
                    reason: err.to_string(),
                })
            }
        }
    }

    async fn ask(
        &self,
        contact: &Contact,
        prior: &[Message],
        text: &str,
    ) -> Result<CompletionResponse, ChatError> {
        let handle = self.sessions.get_or_create(
            &contact.id,
            contact.system_instruction.as_deref(),
            prior,
        )?;
        let mut session = handle.lock().await;
        Ok(session.send_message(text).await?)
    }

    /// Remove a contact together with its transcript and cached session.
    ///
    /// Waits for an in-flight send to the same contact to finish first, so
    /// its reply cannot land after the transcript is gone. Returns `false`
    /// if the contact did not exist.
    pub async fn delete_contact(&self, user: &User, contact_id: &ContactId) -> Result<bool, ChatError> {
        let lock = self.send_lock(contact_id);
        let removed = {
            let _serial = lock.lock().await;
            let removed = self.contacts.remove_contact(user, contact_id).await?;
            self.sessions.delete(contact_id);
            self.typing.remove(contact_id);
            removed
        };
        self.send_locks.remove(contact_id);
        Ok(removed)
    }
}
