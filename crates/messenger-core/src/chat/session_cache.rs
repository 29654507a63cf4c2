//! Session cache: one live `ChatSession` per AI contact.
//!
//! Sessions are created lazily from the persisted transcript and then reused,
//! so a turn only sends the new message on top of the session's own history.
//! Values are `Arc` handles cloned out of the `DashMap`; no map guard is held
//! across an `.await`.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use messenger_types::config::GlobalConfig;
use messenger_types::contact::ContactId;
use messenger_types::error::ChatError;
use messenger_types::llm;
use messenger_types::message::Message;

use super::session::{ChatSession, SessionSettings};
use crate::llm::box_provider::BoxLlmProvider;

/// Shared handle to a cached session. Lock it to send.
pub type SessionHandle = Arc<Mutex<ChatSession>>;

pub struct SessionCache {
    sessions: DashMap<ContactId, SessionHandle>,
    /// `None` when no API key is configured.
    provider: Option<Arc<BoxLlmProvider>>,
    settings: SessionSettings,
}

impl SessionCache {
    pub fn new(provider: Option<Arc<BoxLlmProvider>>, settings: SessionSettings) -> Self {
        Self {
            sessions: DashMap::new(),
            provider,
            settings,
        }
    }

    /// Build a cache whose settings come from the global config.
    pub fn from_config(provider: Option<BoxLlmProvider>, config: &GlobalConfig) -> Self {
        Self::new(
            provider.map(Arc::new),
            SessionSettings {
                model: config.model.clone(),
                default_system_instruction: config.default_system_instruction.clone(),
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
            },
        )
    }

    /// Whether sessions can be created at all.
    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Return the cached session for `contact_id`, or build and cache one.
    ///
    /// A new session is seeded with `system_instruction` (the default persona
    /// when absent or blank) and `prior_history` translated to LLM turns.
    /// Both are ignored when a session is already cached.
    pub fn get_or_create(
        &self,
        contact_id: &ContactId,
        system_instruction: Option<&str>,
        prior_history: &[Message],
    ) -> Result<SessionHandle, ChatError> {
        if let Some(handle) = self.get(contact_id) {
            return Ok(handle);
        }

        let provider = self.provider.clone().ok_or(ChatError::ApiKeyMissing)?;

        let system_instruction = system_instruction
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.settings.default_system_instruction)
            .to_string();
        let history: Vec<llm::Message> = prior_history.iter().map(llm::Message::from).collect();

        let session = ChatSession::new(
            contact_id.clone(),
            system_instruction,
            history,
            self.settings.clone(),
            provider,
        );

        // Another task may have raced us here; keep whichever landed first.
        let handle = self
            .sessions
            .entry(contact_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(session)))
            .value()
            .clone();

        tracing::debug!(contact_id = %contact_id, "chat session created");
        Ok(handle)
    }

    pub fn get(&self, contact_id: &ContactId) -> Option<SessionHandle> {
        self.sessions.get(contact_id).map(|r| r.value().clone())
    }

    /// Evict one session. Returns whether one was cached.
    pub fn delete(&self, contact_id: &ContactId) -> bool {
        self.sessions.remove(contact_id).is_some()
    }

    /// Evict every session.
    pub fn clear_all(&self) {
        let dropped = self.sessions.len();
        self.sessions.clear();
        if dropped > 0 {
            tracing::debug!(dropped, "chat sessions cleared");
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
