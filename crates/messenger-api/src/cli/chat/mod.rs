//! Interactive CLI chat with a contact.
//!
//! Reads lines with an async readline, sends them through the conversation
//! orchestrator, and renders AI replies as terminal markdown. Entry point:
//! `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
