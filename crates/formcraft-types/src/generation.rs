//! Types for AI-assisted form generation.
//!
//! `GeneratedForm` is what every generation strategy returns. The `Model*`
//! structs describe the JSON payload requested from an external model; they
//! derive `JsonSchema` so the schema can be embedded in the prompt.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::form::CreateFormRequest;

/// Description used for generated drafts when the model supplies none.
pub const GENERATED_DESCRIPTION: &str =
    "This form was generated using AI based on your description.";

/// Which strategy produced a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStrategy {
    Heuristic,
    Model,
}

impl fmt::Display for GenerationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationStrategy::Heuristic => write!(f, "heuristic"),
            GenerationStrategy::Model => write!(f, "model"),
        }
    }
}

/// Rough effort tag for a generated form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

/// What kind of improvement a suggestion proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    AddField,
    ModifyField,
    ReorderFields,
    ImproveLabel,
    AddValidation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionPriority {
    High,
    Medium,
    Low,
}

/// An improvement suggestion attached to a generated draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AiSuggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    /// Field the suggestion refers to, when it targets one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_id: Option<String>,
    pub description: String,
    pub priority: SuggestionPriority,
}

/// Auxiliary output of the external-model strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    pub estimated_completion_minutes: u32,
    pub complexity: Complexity,
    pub suggestions: Vec<AiSuggestion>,
}

/// A complete form draft produced from a prompt. Never partial.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedForm {
    pub form: CreateFormRequest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<GenerationMetadata>,
    pub strategy: GenerationStrategy,
}

/// Form draft as returned by the external model.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ModelFormPayload {
    /// Short human-readable form title.
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Fields in display order.
    pub fields: Vec<ModelField>,
    /// Confirmation message shown after submission.
    #[serde(default)]
    pub submit_message: Option<String>,
    #[serde(default)]
    pub metadata: Option<ModelMetadata>,
}

/// One field in a model-produced draft.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ModelField {
    #[serde(default)]
    pub id: Option<String>,
    /// One of: text, email, phone, number, textarea, select, radio,
    /// checkbox, date, file, rating.
    #[serde(rename = "type")]
    pub field_type: String,
    pub label: String,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    /// Required for select, radio and checkbox fields.
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

/// Completion estimate as the model phrased it: a bare number of minutes
/// or free text such as "2-3 minutes".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CompletionEstimate {
    Minutes(u32),
    Text(String),
}

impl CompletionEstimate {
    /// Whole minutes, taking the first number found in free text.
    pub fn minutes(&self) -> Option<u32> {
        match self {
            CompletionEstimate::Minutes(m) => Some(*m),
            CompletionEstimate::Text(text) => {
                let digits: String = text
                    .trim_start_matches(|c: char| !c.is_ascii_digit())
                    .chars()
                    .take_while(char::is_ascii_digit)
                    .collect();
                digits.parse().ok()
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ModelMetadata {
    /// Estimated minutes needed to fill in the form.
    #[serde(default)]
    pub estimated_completion_time: Option<CompletionEstimate>,
    pub complexity: Complexity,
    #[serde(default)]
    pub suggestions: Vec<AiSuggestion>,
}
