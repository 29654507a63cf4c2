//! LlmProvider trait definition.
//!
//! The one abstraction every chat backend implements: send a persona plus a
//! turn history and get the full reply back. Streaming is out of scope, so
//! the trait only needs `complete`.

use messenger_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for LLM provider backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). Wrap an
/// implementation in `BoxLlmProvider` for dynamic dispatch.
///
/// Implementations live in messenger-infra (e.g., `GeminiProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
