//! Runtime selection of the generation strategy.

use secrecy::SecretString;

use formcraft_core::generator::FormGenerator;
use formcraft_core::generator::heuristic::HeuristicGenerator;
use formcraft_types::config::{GeneratorConfig, GeneratorMode};
use formcraft_types::error::GenerationError;
use formcraft_types::generation::{GeneratedForm, GenerationStrategy};

use super::llm_generator::LlmFormGenerator;
use crate::llm::create_provider;

/// The generator chosen from configuration.
///
/// `auto` uses the model when an API key is available and the heuristic
/// otherwise. A failed model call is reported, not retried heuristically.
pub enum ConfiguredGenerator {
    Heuristic(HeuristicGenerator),
    Model(LlmFormGenerator),
}

impl ConfiguredGenerator {
    pub fn from_config(config: &GeneratorConfig, api_key: Option<SecretString>) -> Self {
        match (config.mode, api_key) {
            (GeneratorMode::Heuristic, _) => Self::Heuristic(HeuristicGenerator::new()),
            (GeneratorMode::Auto | GeneratorMode::Model, Some(key)) => {
                let provider = create_provider(config, key);
                tracing::info!(
                    provider = provider.name(),
                    model = %config.resolved_model(),
                    "using model form generator"
                );
                Self::Model(LlmFormGenerator::new(provider, config))
            }
            (GeneratorMode::Model, None) => {
                tracing::warn!(
                    "generator mode is 'model' but {} is not set; falling back to heuristic",
                    config.provider.api_key_env()
                );
                Self::Heuristic(HeuristicGenerator::new())
            }
            (GeneratorMode::Auto, None) => Self::Heuristic(HeuristicGenerator::new()),
        }
    }
}

impl FormGenerator for ConfiguredGenerator {
    fn strategy(&self) -> GenerationStrategy {
        match self {
            Self::Heuristic(g) => g.strategy(),
            Self::Model(g) => g.strategy(),
        }
    }

    async fn generate(&self, prompt: &str) -> Result<GeneratedForm, GenerationError> {
        match self {
            Self::Heuristic(g) => g.generate(prompt).await,
            Self::Model(g) => g.generate(prompt).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(mode: GeneratorMode) -> GeneratorConfig {
        GeneratorConfig {
            mode,
            ..Default::default()
        }
    }

    #[test]
    fn test_auto_without_key_is_heuristic() {
        let generator = ConfiguredGenerator::from_config(&config(GeneratorMode::Auto), None);
        assert_eq!(generator.strategy(), GenerationStrategy::Heuristic);
    }

    #[test]
    fn test_auto_with_key_is_model() {
        let generator = ConfiguredGenerator::from_config(
            &config(GeneratorMode::Auto),
            Some(SecretString::from("key")),
        );
        assert_eq!(generator.strategy(), GenerationStrategy::Model);
    }

    #[test]
    fn test_heuristic_mode_ignores_key() {
        let generator = ConfiguredGenerator::from_config(
            &config(GeneratorMode::Heuristic),
            Some(SecretString::from("key")),
        );
        assert_eq!(generator.strategy(), GenerationStrategy::Heuristic);
    }

    #[test]
    fn test_model_mode_without_key_degrades() {
        let generator = ConfiguredGenerator::from_config(&config(GeneratorMode::Model), None);
        assert_eq!(generator.strategy(), GenerationStrategy::Heuristic);
    }

    #[tokio::test]
    async fn test_heuristic_generation_through_enum() {
        let generator = ConfiguredGenerator::from_config(&config(GeneratorMode::Heuristic), None);
        let draft = generator
            .generate("Create a contact form with name and email")
            .await
            .unwrap();
        assert_eq!(draft.strategy, GenerationStrategy::Heuristic);
        assert!(!draft.form.fields.is_empty());
    }
}
