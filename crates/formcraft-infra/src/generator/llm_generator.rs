//! Model-backed form generation.
//!
//! Sends the prompt to the configured LLM with the JSON schema of
//! [`ModelFormPayload`] embedded in the system prompt, then decodes and
//! validates the reply with `formcraft_core::generator::parse`.

use formcraft_core::generator::parse::parse_generated_form;
use formcraft_core::generator::prompt::{
    build_generation_system_prompt, build_generation_user_message,
};
use formcraft_core::generator::{FormGenerator, normalize_prompt};
use formcraft_core::llm::box_provider::BoxLlmProvider;
use formcraft_types::config::GeneratorConfig;
use formcraft_types::error::GenerationError;
use formcraft_types::generation::{GeneratedForm, GenerationStrategy, ModelFormPayload};
use formcraft_types::llm::{CompletionRequest, Message, MessageRole, StopReason};
use tracing::Instrument;

pub struct LlmFormGenerator {
    provider: BoxLlmProvider,
    model: String,
    max_tokens: u32,
    temperature: f64,
    system_prompt: String,
}

impl LlmFormGenerator {
    pub fn new(provider: BoxLlmProvider, config: &GeneratorConfig) -> Self {
        Self {
            provider,
            model: config.resolved_model(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            system_prompt: build_generation_system_prompt(&payload_schema()),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, prompt: &str) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: MessageRole::User,
                content: build_generation_user_message(prompt),
            }],
            system: Some(self.system_prompt.clone()),
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
            json_output: true,
        }
    }
}

/// Pretty-printed JSON schema of the payload the model must return.
fn payload_schema() -> String {
    let schema = schemars::schema_for!(ModelFormPayload);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string())
}

impl FormGenerator for LlmFormGenerator {
    fn strategy(&self) -> GenerationStrategy {
        GenerationStrategy::Model
    }

    async fn generate(&self, prompt: &str) -> Result<GeneratedForm, GenerationError> {
        let prompt = normalize_prompt(prompt)?;
        let request = self.build_request(prompt);

        let span = tracing::info_span!(
            "gen_ai.generate_form",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %self.model,
            gen_ai.request.max_tokens = self.max_tokens,
            gen_ai.request.temperature = self.temperature,
            gen_ai.usage.input_tokens = tracing::field::Empty,
            gen_ai.usage.output_tokens = tracing::field::Empty,
        );

        async {
            let response = self.provider.complete(&request).await.map_err(|e| {
                tracing::warn!("form generation failed: {e}");
                GenerationError::Provider(e.to_string())
            })?;

            let current = tracing::Span::current();
            current.record("gen_ai.usage.input_tokens", response.usage.input_tokens);
            current.record("gen_ai.usage.output_tokens", response.usage.output_tokens);
            tracing::debug!(stop_reason = %response.stop_reason, "model draft received");

            if response.stop_reason == StopReason::ContentFilter {
                return Err(GenerationError::Provider(
                    "the provider blocked the response".to_string(),
                ));
            }

            parse_generated_form(&response.content)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formcraft_core::llm::provider::LlmProvider;
    use formcraft_types::form::FieldType;
    use formcraft_types::generation::Complexity;
    use formcraft_types::llm::{CompletionResponse, LlmError, Usage};
    use std::sync::{Arc, Mutex};

    /// A minimal mock LLM provider that returns a static response.
    struct MockLlmProvider {
        result: Result<String, ()>,
        seen: Arc<Mutex<Vec<CompletionRequest>>>,
    }

    impl MockLlmProvider {
        fn with_response(content: &str) -> Self {
            Self {
                result: Ok(content.to_string()),
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn failing() -> Self {
            Self {
                result: Err(()),
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl LlmProvider for MockLlmProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            self.seen.lock().unwrap().push(request.clone());
            match &self.result {
                Ok(content) => Ok(CompletionResponse {
                    id: "msg_mock_123".to_string(),
                    content: content.clone(),
                    model: "mock-model".to_string(),
                    stop_reason: StopReason::EndTurn,
                    usage: Usage {
                        input_tokens: 100,
                        output_tokens: 50,
                    },
                }),
                Err(()) => Err(LlmError::RateLimited {
                    retry_after_ms: None,
                }),
            }
        }
    }

    fn generator(mock: MockLlmProvider) -> LlmFormGenerator {
        LlmFormGenerator::new(BoxLlmProvider::new(mock), &GeneratorConfig::default())
    }

    const FEEDBACK_JSON: &str = r#"{
        "title": "Event Feedback",
        "description": "Tell us how it went",
        "fields": [
            {"id": "name", "type": "text", "label": "Name", "required": true},
            {"id": "rating", "type": "rating", "label": "Overall rating", "required": true},
            {"type": "radio", "label": "Would you return?", "options": ["Yes", "No"]}
        ],
        "metadata": {"estimated_completion_time": 2, "complexity": "simple", "suggestions": []}
    }"#;

    #[tokio::test]
    async fn test_generate_decodes_model_output() {
        let draft = generator(MockLlmProvider::with_response(FEEDBACK_JSON))
            .generate("feedback form for our meetup")
            .await
            .unwrap();

        assert_eq!(draft.strategy, GenerationStrategy::Model);
        assert_eq!(draft.form.title.as_deref(), Some("Event Feedback"));
        assert_eq!(draft.form.fields.len(), 3);
        assert_eq!(draft.form.fields[2].field_type, FieldType::Radio);
        let metadata = draft.metadata.unwrap();
        assert_eq!(metadata.complexity, Complexity::Simple);
    }

    #[tokio::test]
    async fn test_generate_tolerates_surrounding_prose() {
        let wrapped = format!("Here is your form:\n```json\n{FEEDBACK_JSON}\n```\nEnjoy!");
        let draft = generator(MockLlmProvider::with_response(&wrapped))
            .generate("feedback")
            .await
            .unwrap();
        assert_eq!(draft.form.fields.len(), 3);
    }

    #[tokio::test]
    async fn test_generate_rejects_malformed_output() {
        let provider = MockLlmProvider::with_response("{\"title\": \"Broken\", \"fields\": [");
        let result = generator(provider).generate("anything").await;
        assert!(matches!(result, Err(GenerationError::Parse(_))));
    }

    #[tokio::test]
    async fn test_generate_maps_provider_errors() {
        let result = generator(MockLlmProvider::failing()).generate("anything").await;
        assert!(matches!(result, Err(GenerationError::Provider(_))));
    }

    #[tokio::test]
    async fn test_empty_prompt_never_reaches_provider() {
        let mock = MockLlmProvider::with_response(FEEDBACK_JSON);
        let seen = mock.seen.clone();
        let result = generator(mock).generate("   ").await;
        assert!(matches!(result, Err(GenerationError::EmptyPrompt)));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_request_carries_schema_and_json_mode() {
        let mock = MockLlmProvider::with_response(FEEDBACK_JSON);
        let seen = mock.seen.clone();
        generator(mock).generate("  a survey  ").await.unwrap();

        let requests = seen.lock().unwrap();
        let request = &requests[0];
        assert!(request.json_output);
        assert_eq!(request.model, "gemini-1.5-flash");
        assert!(request.system.as_deref().unwrap().contains("submit_message"));
        assert!(request.messages[0].content.contains("a survey"));
    }
}
