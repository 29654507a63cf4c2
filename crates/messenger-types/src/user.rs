use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;

/// A locally registered user. The email doubles as the storage namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub email: String,
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.email)
    }
}

/// What the credential table stores per email.
///
/// `password_hash` is a PHC string (salted Argon2id), never the password.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredential {
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
