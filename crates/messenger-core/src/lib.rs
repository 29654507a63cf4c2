//! Business logic and port definitions for Gemini Messenger.
//!
//! This crate defines the "ports" (storage, LLM and hashing traits) that the
//! infrastructure layer implements, plus the services built on them. It
//! depends only on `messenger-types` -- never on `messenger-infra` or any
//! database/IO crate.

pub mod chat;
pub mod llm;
pub mod service;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;
