use thiserror::Error;

use crate::llm::LlmError;

/// Errors from signing up, logging in and session lookup.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email and password are required.")]
    MissingCredentials,

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("User with this email already exists.")]
    UserExists,

    #[error("not logged in")]
    NotLoggedIn,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors related to contact operations.
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("contact not found: '{0}'")]
    NotFound(String),

    #[error("contact name is required")]
    EmptyName,

    #[error("'{0}' matches more than one contact; use the contact id")]
    Ambiguous(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors from sending a message or talking to the session cache.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Gemini API key not configured.")]
    ApiKeyMissing,

    #[error("message text is empty")]
    EmptyMessage,

    #[error("contact not found: '{0}'")]
    ContactNotFound(String),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors from repository operations (used by trait definitions in messenger-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("query error: {0}")]
    Query(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<RepositoryError> for AuthError {
    fn from(err: RepositoryError) -> Self {
        AuthError::StorageError(err.to_string())
    }
}

impl From<RepositoryError> for ContactError {
    fn from(err: RepositoryError) -> Self {
        ContactError::StorageError(err.to_string())
    }
}

impl From<RepositoryError> for ChatError {
    fn from(err: RepositoryError) -> Self {
        ChatError::StorageError(err.to_string())
    }
}

impl From<ContactError> for ChatError {
    fn from(err: ContactError) -> Self {
        match err {
            ContactError::NotFound(id) => ChatError::ContactNotFound(id),
            other => ChatError::StorageError(other.to_string()),
        }
    }
}
