//! Infrastructure layer for Gemini Messenger.
//!
//! Implements the ports defined in `messenger-core`: the SQLite key-value
//! store, Argon2 password hashing, and the Gemini HTTP provider. Also loads
//! configuration and resolves the data directory and API key.

pub mod config;
pub mod crypto;
pub mod filesystem;
pub mod llm;
pub mod secret;
pub mod sqlite;
