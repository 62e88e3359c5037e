//! LLM provider implementations.
//!
//! Concrete implementations of the [`LlmProvider`] trait defined in
//! `formcraft-core` (Gemini and Anthropic), plus a factory
//! ([`create_provider`]) that builds the configured one.
//!
//! [`LlmProvider`]: formcraft_core::llm::provider::LlmProvider

pub mod anthropic;
pub mod gemini;

use std::time::Duration;

use secrecy::SecretString;

use formcraft_core::llm::box_provider::BoxLlmProvider;
use formcraft_types::config::{GeneratorConfig, ProviderKind};
use formcraft_types::llm::LlmError;

use self::anthropic::AnthropicProvider;
use self::gemini::GeminiProvider;

/// Create a [`BoxLlmProvider`] for the configured backend.
pub fn create_provider(config: &GeneratorConfig, api_key: SecretString) -> BoxLlmProvider {
    let timeout = Duration::from_secs(config.timeout_secs);
    match config.provider {
        ProviderKind::Gemini => {
            let mut provider = GeminiProvider::new(api_key, timeout);
            if let Some(ref base_url) = config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            BoxLlmProvider::new(provider)
        }
        ProviderKind::Anthropic => {
            let mut provider = AnthropicProvider::new(api_key, timeout);
            if let Some(ref base_url) = config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            BoxLlmProvider::new(provider)
        }
    }
}

/// Map a non-2xx provider response to an [`LlmError`].
pub(crate) async fn error_for_status(response: reqwest::Response) -> LlmError {
    let status = response.status();
    let retry_after_ms = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(|secs| secs * 1000);
    let body = response.text().await.unwrap_or_default();
    map_status(status.as_u16(), retry_after_ms, body)
}

fn map_status(status: u16, retry_after_ms: Option<u64>, body: String) -> LlmError {
    match status {
        401 | 403 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited { retry_after_ms },
        400 => LlmError::InvalidRequest(body),
        503 | 529 => LlmError::Overloaded(body),
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {body}"),
        },
    }
}
