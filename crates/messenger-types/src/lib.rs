//! Shared domain types for Gemini Messenger.
//!
//! Users, contacts, transcript messages, LLM wire-neutral types and the
//! error enums every other crate maps into.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod contact;
pub mod error;
pub mod keys;
pub mod llm;
pub mod message;
pub mod persona;
pub mod user;
