pub mod orchestrator;
pub mod session;
pub mod session_cache;
pub mod transcript;
