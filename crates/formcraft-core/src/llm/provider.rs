//! LlmProvider trait definition.

use formcraft_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for LLM provider backends (Gemini, Anthropic).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). Form
/// generation needs a single full response, so there is no streaming half.
///
/// Implementations live in formcraft-infra.
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "gemini", "anthropic").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
