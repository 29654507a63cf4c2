use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Unique identifier for a contact, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(pub Uuid);

impl ContactId {
    /// Create a new ContactId using UUID v7.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ContactId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContactId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Whether a contact is a simulated human or a Gemini-backed persona.
///
/// Human contacts never reply; AI contacts reply through the session cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
    Human,
    Ai,
}

impl ContactType {
    pub fn is_ai(&self) -> bool {
        matches!(self, ContactType::Ai)
    }
}

impl fmt::Display for ContactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContactType::Human => write!(f, "human"),
            ContactType::Ai => write!(f, "ai"),
        }
    }
}

impl FromStr for ContactType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(ContactType::Human),
            "ai" => Ok(ContactType::Ai),
            other => Err(format!("invalid contact type: '{other}'")),
        }
    }
}

impl Default for ContactType {
    fn default() -> Self {
        ContactType::Human
    }
}

/// A chat peer in a user's contact list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    #[serde(rename = "type")]
    pub contact_type: ContactType,
    /// Kept for storage-format parity; the CLI renders initials instead.
    #[serde(default)]
    pub avatar: String,
    /// Persona prompt, fixed at creation. Only meaningful for AI contacts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,
}

impl Contact {
    pub fn is_ai(&self) -> bool {
        self.contact_type.is_ai()
    }

    /// One or two uppercase initials for list and banner display.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// Input for creating a contact.
#[derive(Debug, Clone, Default)]
pub struct NewContact {
    pub name: String,
    pub contact_type: ContactType,
    pub system_instruction: Option<String>,
}
