//! GeminiProvider -- [`LlmProvider`] over the Gemini REST API.
//!
//! The key travels in the `x-goog-api-key` header rather than the query
//! string so it never shows up in URLs or request logs.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use formcraft_core::llm::provider::LlmProvider;
use formcraft_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, MessageRole, StopReason, Usage,
};

use super::types::{
    GeminiContent, GeminiPart, GeminiRequest, GeminiResponse, GenerationConfig,
};
use crate::llm::error_for_status;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: SecretString, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the base URL (proxies, tests).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

pub(crate) fn to_gemini_request(request: &CompletionRequest) -> GeminiRequest {
    let contents = request
        .messages
        .iter()
        .map(|m| GeminiContent {
            role: Some(
                match m.role {
                    MessageRole::User => "user",
                    MessageRole::Assistant => "model",
                }
                .to_string(),
            ),
            parts: vec![GeminiPart {
                text: m.content.clone(),
            }],
        })
        .collect();

    let system_instruction = request.system.as_ref().map(|system| GeminiContent {
        role: None,
        parts: vec![GeminiPart {
            text: system.clone(),
        }],
    });

    GeminiRequest {
        contents,
        system_instruction,
        generation_config: GenerationConfig {
            max_output_tokens: request.max_tokens,
            temperature: request.temperature,
            response_mime_type: request
                .json_output
                .then(|| "application/json".to_string()),
        },
    }
}

pub(crate) fn into_completion(
    resp: GeminiResponse,
    requested_model: &str,
) -> Result<CompletionResponse, LlmError> {
    let candidate = resp.candidates.into_iter().next().ok_or_else(|| LlmError::Provider {
        message: "response contained no candidates".to_string(),
    })?;

    let content = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let stop_reason = match candidate.finish_reason.as_deref() {
        Some("MAX_TOKENS") => StopReason::MaxTokens,
        Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") | Some("PROHIBITED_CONTENT") => {
            StopReason::ContentFilter
        }
        _ => StopReason::EndTurn,
    };

    let usage = resp.usage_metadata.unwrap_or_default();

    Ok(CompletionResponse {
        id: resp.response_id.unwrap_or_default(),
        content,
        model: resp
            .model_version
            .unwrap_or_else(|| requested_model.to_string()),
        stop_reason,
        usage: Usage {
            input_tokens: usage.prompt_token_count,
            output_tokens: usage.candidates_token_count,
        },
    })
}

impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = to_gemini_request(request);

        let response = self
            .client
            .post(self.url(&request.model))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }

        let gemini_resp: GeminiResponse = response.json().await.map_err(|e| {
            LlmError::Deserialization(format!("failed to parse response: {e}"))
        })?;

        into_completion(gemini_resp, &request.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formcraft_types::llm::Message;

    fn request(json_output: bool) -> CompletionRequest {
        CompletionRequest {
            model: "gemini-test".to_string(),
            messages: vec![Message {
                role: MessageRole::User,
                content: "a contact form".to_string(),
            }],
            system: Some("reply with JSON".to_string()),
            max_tokens: 1024,
            temperature: Some(0.7),
            json_output,
        }
    }

    #[test]
    fn test_request_uses_camel_case_and_json_mode() {
        let body = serde_json::to_value(to_gemini_request(&request(true))).unwrap();
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "a contact form");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "reply with JSON");
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1024);
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );

        let plain = serde_json::to_value(to_gemini_request(&request(false))).unwrap();
        assert!(plain["generationConfig"].get("responseMimeType").is_none());
    }

    #[test]
    fn test_response_conversion() {
        let resp: GeminiResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "{\"title\":"}, {"text": "\"x\"}"}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4},
                "modelVersion": "gemini-test-001"
            }"#,
        )
        .unwrap();

        let completion = into_completion(resp, "gemini-test").unwrap();
        assert_eq!(completion.content, r#"{"title":"x"}"#);
        assert_eq!(completion.model, "gemini-test-001");
        assert_eq!(completion.stop_reason, StopReason::EndTurn);
        assert_eq!(completion.usage.input_tokens, 12);
        assert_eq!(completion.usage.output_tokens, 4);
    }

    #[test]
    fn test_empty_candidates_is_provider_error() {
        let resp: GeminiResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(matches!(
            into_completion(resp, "m"),
            Err(LlmError::Provider { .. })
        ));
    }

    #[test]
    fn test_url_shape() {
        let provider = GeminiProvider::new(SecretString::from("k"), Duration::from_secs(1))
            .with_base_url("http://localhost:8080".to_string());
        assert_eq!(
            provider.url("gemini-1.5-flash"),
            "http://localhost:8080/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }
}
