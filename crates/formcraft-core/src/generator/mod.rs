//! Prompt-to-form generation.
//!
//! `FormGenerator` is the port every strategy implements. The keyword
//! heuristic lives here because it is pure; the model-backed strategy lives
//! in formcraft-infra and reuses [`parse`] to turn model text into a
//! validated draft.

pub mod heuristic;
pub mod parse;
pub mod prompt;

use formcraft_types::error::GenerationError;
use formcraft_types::generation::{GeneratedForm, GenerationStrategy};

/// Turns a free-text description into a complete form draft.
///
/// Implementations either return a full draft or an error; a partially
/// decoded draft is never returned.
pub trait FormGenerator: Send + Sync {
    /// Which strategy this generator uses.
    fn strategy(&self) -> GenerationStrategy;

    /// Generate a draft from the prompt.
    fn generate(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<GeneratedForm, GenerationError>> + Send;
}

/// Trim the prompt and reject it when nothing is left.
pub fn normalize_prompt(prompt: &str) -> Result<&str, GenerationError> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        Err(GenerationError::EmptyPrompt)
    } else {
        Ok(trimmed)
    }
}
