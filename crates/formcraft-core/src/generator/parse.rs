//! Decoding model output into a validated form draft.
//!
//! Model text is reduced to its outermost JSON object (first `{` to last
//! `}`), decoded into [`ModelFormPayload`], then checked and mapped onto
//! the form schema. Any failure in the draft itself rejects the whole draft;
//! metadata that does not decode is replaced by an estimate.

use std::collections::HashSet;

use formcraft_types::error::GenerationError;
use formcraft_types::form::{
    CreateFormRequest, DEFAULT_SUBMIT_MESSAGE, FieldId, FieldInput, FieldType, FormTheme,
};
use formcraft_types::generation::{
    Complexity, GENERATED_DESCRIPTION, GeneratedForm, GenerationMetadata, GenerationStrategy,
    ModelField, ModelFormPayload,
};

use super::prompt::MAX_GENERATED_FIELDS;
use crate::service::form::MAX_TITLE_CHARS;

/// Slice out the outermost `{ ... }` block, if any.
pub fn extract_json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Decode raw model text into the payload struct.
pub fn decode_payload(text: &str) -> Result<ModelFormPayload, GenerationError> {
    let block = extract_json_block(text).ok_or_else(|| {
        GenerationError::Parse(format!("no JSON object in model output: {}", preview(text)))
    })?;

    let parse_err = |e: serde_json::Error| {
        GenerationError::Parse(format!("{e}. Raw content: {}", preview(block)))
    };

    let mut value: serde_json::Value = serde_json::from_str(block).map_err(parse_err)?;
    let metadata = value.as_object_mut().and_then(|o| o.remove("metadata"));

    let mut payload: ModelFormPayload = serde_json::from_value(value).map_err(parse_err)?;
    payload.metadata = match metadata {
        None | Some(serde_json::Value::Null) => None,
        Some(raw) => serde_json::from_value(raw)
            .inspect_err(|e| tracing::debug!(error = %e, "ignoring undecodable draft metadata"))
            .ok(),
    };
    Ok(payload)
}

/// Decode, validate and map model output onto a complete draft.
pub fn parse_generated_form(text: &str) -> Result<GeneratedForm, GenerationError> {
    payload_into_draft(decode_payload(text)?)
}

/// Validate a decoded payload and convert it into a draft.
pub fn payload_into_draft(payload: ModelFormPayload) -> Result<GeneratedForm, GenerationError> {
    let title = payload.title.trim();
    if title.is_empty() {
        return Err(GenerationError::InvalidDraft("title is empty".to_string()));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(GenerationError::InvalidDraft(format!(
            "title exceeds {MAX_TITLE_CHARS} characters"
        )));
    }
    if payload.fields.is_empty() {
        return Err(GenerationError::InvalidDraft("draft has no fields".to_string()));
    }
    if payload.fields.len() > MAX_GENERATED_FIELDS {
        return Err(GenerationError::InvalidDraft(format!(
            "draft has {} fields, at most {MAX_GENERATED_FIELDS} allowed",
            payload.fields.len()
        )));
    }

    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(payload.fields.len());
    for (index, field) in payload.fields.into_iter().enumerate() {
        fields.push(map_field(index, field, &mut seen)?);
    }

    let estimate = estimate_metadata(fields.len());
    let metadata = match payload.metadata {
        Some(m) => GenerationMetadata {
            estimated_completion_minutes: m
                .estimated_completion_time
                .and_then(|e| e.minutes())
                .map_or(estimate.estimated_completion_minutes, |minutes| minutes.max(1)),
            complexity: m.complexity,
            suggestions: m.suggestions,
        },
        None => estimate,
    };

    Ok(GeneratedForm {
        form: CreateFormRequest {
            title: Some(title.to_string()),
            description: Some(
                non_blank(payload.description)
                    .unwrap_or_else(|| GENERATED_DESCRIPTION.to_string()),
            ),
            fields,
            theme: Some(FormTheme::Default),
            submit_message: Some(
                non_blank(payload.submit_message)
                    .unwrap_or_else(|| DEFAULT_SUBMIT_MESSAGE.to_string()),
            ),
            redirect_url: None,
            published: Some(false),
        },
        metadata: Some(metadata),
        strategy: GenerationStrategy::Model,
    })
}

/// Fallback metadata when the model omits it: roughly three fields per
/// minute, complexity by field count.
pub fn estimate_metadata(field_count: usize) -> GenerationMetadata {
    let complexity = match field_count {
        0..=5 => Complexity::Simple,
        6..=10 => Complexity::Moderate,
        _ => Complexity::Complex,
    };
    GenerationMetadata {
        estimated_completion_minutes: field_count.div_ceil(3).max(1) as u32,
        complexity,
        suggestions: Vec::new(),
    }
}

fn map_field(
    index: usize,
    field: ModelField,
    seen: &mut HashSet<String>,
) -> Result<FieldInput, GenerationError> {
    let position = index + 1;
    let field_type: FieldType = field
        .field_type
        .parse()
        .map_err(|e| GenerationError::InvalidDraft(format!("field {position}: {e}")))?;

    let label = field.label.trim();
    if label.is_empty() {
        return Err(GenerationError::InvalidDraft(format!(
            "field {position} has an empty label"
        )));
    }

    let options = if field_type.requires_options() {
        let options: Vec<String> = field
            .options
            .unwrap_or_default()
            .into_iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
        if options.is_empty() {
            return Err(GenerationError::InvalidDraft(format!(
                "{field_type} field '{label}' has no options"
            )));
        }
        Some(options)
    } else {
        None
    };

    // Model ids are kept when usable; blanks and repeats get a fresh id.
    let id = match field.id.map(|id| id.trim().to_string()) {
        Some(id) if !id.is_empty() && !seen.contains(&id) => FieldId(id),
        _ => FieldId::new(),
    };
    seen.insert(id.0.clone());

    Ok(FieldInput {
        id: Some(id),
        field_type,
        label: label.to_string(),
        placeholder: non_blank(field.placeholder),
        required: field.required,
        options,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn preview(text: &str) -> String {
    const LIMIT: usize = 200;
    if text.chars().count() > LIMIT {
        let head: String = text.chars().take(LIMIT).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTACT_JSON: &str = r#"{
        "title": "Contact Us",
        "description": "Reach the team",
        "fields": [
            {"id": "name", "type": "text", "label": "Full name", "required": true},
            {"id": "email", "type": "email", "label": "Email", "required": true},
            {"id": "topic", "type": "select", "label": "Topic",
             "options": ["Sales", " ", "Support"]}
        ],
        "submit_message": "We will be in touch",
        "metadata": {
            "estimated_completion_time": 2,
            "complexity": "simple",
            "suggestions": [
                {"type": "add_field", "description": "Ask for a phone number", "priority": "low"}
            ]
        }
    }"#;

    #[test]
    fn test_extract_json_block_from_prose() {
        let text = "Sure! Here is your form:\n```json\n{\"a\": {\"b\": 1}}\n```\nEnjoy.";
        assert_eq!(extract_json_block(text), Some("{\"a\": {\"b\": 1}}"));
        assert_eq!(extract_json_block("no braces here"), None);
        assert_eq!(extract_json_block("} backwards {"), None);
    }

    #[test]
    fn test_parse_full_payload() {
        let draft = parse_generated_form(&format!("Here you go: {CONTACT_JSON} thanks")).unwrap();
        assert_eq!(draft.strategy, GenerationStrategy::Model);
        assert_eq!(draft.form.title.as_deref(), Some("Contact Us"));
        assert_eq!(draft.form.submit_message.as_deref(), Some("We will be in touch"));
        assert_eq!(draft.form.fields.len(), 3);
        assert_eq!(draft.form.fields[0].id, Some(FieldId::from("name")));
        assert_eq!(draft.form.fields[2].field_type, FieldType::Select);
        assert_eq!(
            draft.form.fields[2].options.as_deref().unwrap(),
            ["Sales", "Support"]
        );

        let metadata = draft.metadata.unwrap();
        assert_eq!(metadata.estimated_completion_minutes, 2);
        assert_eq!(metadata.complexity, Complexity::Simple);
        assert_eq!(metadata.suggestions.len(), 1);
    }

    #[test]
    fn test_defaults_and_estimated_metadata() {
        let draft = parse_generated_form(
            r#"{"title":"Poll","fields":[{"type":"rating","label":"Score","placeholder":"  "}]}"#,
        )
        .unwrap();
        assert_eq!(draft.form.description.as_deref(), Some(GENERATED_DESCRIPTION));
        assert_eq!(draft.form.submit_message.as_deref(), Some(DEFAULT_SUBMIT_MESSAGE));
        assert!(draft.form.fields[0].placeholder.is_none());
        assert!(draft.form.fields[0].id.is_some());
        let metadata = draft.metadata.unwrap();
        assert_eq!(metadata.estimated_completion_minutes, 1);
        assert_eq!(metadata.complexity, Complexity::Simple);
    }

    #[test]
    fn test_duplicate_ids_are_replaced() {
        let draft = parse_generated_form(
            r#"{"title":"T","fields":[
                {"id":"x","type":"text","label":"A"},
                {"id":"x","type":"text","label":"B"}
            ]}"#,
        )
        .unwrap();
        let a = draft.form.fields[0].id.clone().unwrap();
        let b = draft.form.fields[1].id.clone().unwrap();
        assert_eq!(a, FieldId::from("x"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = parse_generated_form("{\"title\": \"Oops\", \"fields\": [").unwrap_err();
        assert!(matches!(err, GenerationError::Parse(_)));
        let err = parse_generated_form("I cannot help with that").unwrap_err();
        assert!(matches!(err, GenerationError::Parse(_)));
    }

    #[test]
    fn test_invalid_drafts_are_rejected() {
        let cases = [
            r#"{"title":"  ","fields":[{"type":"text","label":"A"}]}"#,
            r#"{"title":"T","fields":[]}"#,
            r#"{"title":"T","fields":[{"type":"slider","label":"A"}]}"#,
            r#"{"title":"T","fields":[{"type":"text","label":" "}]}"#,
            r#"{"title":"T","fields":[{"type":"radio","label":"Pick"}]}"#,
            r#"{"title":"T","fields":[{"type":"checkbox","label":"Pick","options":[""]}]}"#,
        ];
        for case in cases {
            let err = parse_generated_form(case).unwrap_err();
            assert!(
                matches!(err, GenerationError::InvalidDraft(_)),
                "{case} should be an invalid draft, got {err:?}"
            );
        }
    }

    #[test]
    fn test_textual_completion_estimate_keeps_draft() {
        let draft = parse_generated_form(
            r#"{"title":"Contact","fields":[{"type":"text","label":"Name"}],
                "metadata":{"estimated_completion_time":"2-3 minutes","complexity":"simple"}}"#,
        )
        .unwrap();
        assert_eq!(draft.form.title.as_deref(), Some("Contact"));
        let metadata = draft.metadata.unwrap();
        assert_eq!(metadata.estimated_completion_minutes, 2);
        assert_eq!(metadata.complexity, Complexity::Simple);
    }

    #[test]
    fn test_undecodable_metadata_falls_back_to_estimate() {
        let cases = [
            r#"{"estimated_completion_time":"soon","complexity":"simple"}"#,
            r#"{"estimated_completion_time":3,"complexity":"very hard"}"#,
            r#""not an object""#,
        ];
        for metadata in cases {
            let json = format!(
                r#"{{"title":"P","fields":[{{"type":"text","label":"A"}}],"metadata":{metadata}}}"#
            );
            let draft = parse_generated_form(&json).unwrap();
            let metadata = draft.metadata.unwrap();
            assert_eq!(metadata.estimated_completion_minutes, 1, "{json}");
            assert_eq!(metadata.complexity, Complexity::Simple, "{json}");
        }
    }

    #[test]
    fn test_overlong_title_is_invalid_draft() {
        let json = format!(
            r#"{{"title":"{}","fields":[{{"type":"text","label":"Name"}}]}}"#,
            "t".repeat(MAX_TITLE_CHARS + 50)
        );
        let err = parse_generated_form(&json).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidDraft(_)), "{err:?}");

        let json = format!(
            r#"{{"title":"{}","fields":[{{"type":"text","label":"Name"}}]}}"#,
            "t".repeat(MAX_TITLE_CHARS)
        );
        assert!(parse_generated_form(&json).is_ok());
    }

    #[test]
    fn test_too_many_fields() {
        let fields: Vec<String> = (0..=MAX_GENERATED_FIELDS)
            .map(|i| format!(r#"{{"type":"text","label":"F{i}"}}"#))
            .collect();
        let json = format!(r#"{{"title":"Big","fields":[{}]}}"#, fields.join(","));
        assert!(matches!(
            parse_generated_form(&json),
            Err(GenerationError::InvalidDraft(_))
        ));
    }

    #[test]
    fn test_options_dropped_for_plain_fields() {
        let draft = parse_generated_form(
            r#"{"title":"T","fields":[{"type":"text","label":"A","options":["x"]}]}"#,
        )
        .unwrap();
        assert!(draft.form.fields[0].options.is_none());
    }

    #[test]
    fn test_estimate_metadata_buckets() {
        assert_eq!(estimate_metadata(7).complexity, Complexity::Moderate);
        assert_eq!(estimate_metadata(7).estimated_completion_minutes, 3);
        assert_eq!(estimate_metadata(12).complexity, Complexity::Complex);
    }
}
