//! Transcript messages exchanged with a contact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSender {
    User,
    Contact,
}

impl fmt::Display for MessageSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageSender::User => write!(f, "user"),
            MessageSender::Contact => write!(f, "contact"),
        }
    }
}

impl FromStr for MessageSender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageSender::User),
            "contact" => Ok(MessageSender::Contact),
            other => Err(format!("invalid message sender: '{other}'")),
        }
    }
}

/// A single message in a contact's transcript.
///
/// Transcripts are append-only and ordered by insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub text: String,
    pub sender: MessageSender,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// A message typed by the logged-in user.
    pub fn from_user(text: impl Into<String>) -> Self {
        Self::new(text, MessageSender::User)
    }

    /// A reply attributed to the contact.
    pub fn from_contact(text: impl Into<String>) -> Self {
        Self::new(text, MessageSender::Contact)
    }

    fn new(text: impl Into<String>, sender: MessageSender) -> Self {
        Self {
            id: Uuid::now_v7(),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
        }
    }
}
