//! A live conversation with one AI contact.
//!
//! `ChatSession` owns the turn history it has sent so far, so each new
//! message only adds one user turn on top of it. History grows only when a
//! round trip succeeds.

use std::sync::Arc;

use uuid::Uuid;

use messenger_types::contact::ContactId;
use messenger_types::llm::{CompletionRequest, CompletionResponse, LlmError, Message};

use crate::llm::box_provider::BoxLlmProvider;

/// Model settings every session is built with.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub model: String,
    pub default_system_instruction: String,
    pub temperature: Option<f64>,
    pub max_output_tokens: Option<u32>,
}

pub struct ChatSession {
    id: Uuid,
    contact_id: ContactId,
    system_instruction: String,
    history: Vec<Message>,
    settings: SessionSettings,
    provider: Arc<BoxLlmProvider>,
}

impl ChatSession {
    pub fn new(
        contact_id: ContactId,
        system_instruction: String,
        history: Vec<Message>,
        settings: SessionSettings,
        provider: Arc<BoxLlmProvider>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            contact_id,
            system_instruction,
            history,
            settings,
            provider,
        }
    }

    /// Identity of this handle; a rebuilt session gets a new one.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Send `text` as the next user turn and return the model's reply.
    ///
    /// On success the user turn and the reply are appended to the history.
    /// On failure the history is untouched.
    pub async fn send_message(&mut self, text: &str) -> Result<CompletionResponse, LlmError> {
        let mut messages = self.history.clone();
        messages.push(Message::user(text));

        let request = CompletionRequest {
            model: self.settings.model.clone(),
            messages,
            system: Some(self.system_instruction.clone()),
            max_tokens: self.settings.max_output_tokens,
            temperature: self.settings.temperature,
        };

        let response = self.provider.complete(&request).await?;

        self.history.push(Message::user(text));
        self.history.push(Message::assistant(response.content.clone()));

        tracing::debug!(
            contact_id = %self.contact_id,
            turns = self.history.len(),
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "session turn complete"
        );
        Ok(response)
    }
}
