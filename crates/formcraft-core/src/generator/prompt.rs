//! System prompt for model-backed generation.
//!
//! The prompt is split into XML-tagged sections: the role, the output
//! rules, and the JSON schema the answer must follow. The schema itself is
//! rendered by the caller (formcraft-infra derives it with schemars) so this
//! module stays free of schema tooling.

use formcraft_types::form::FieldType;

/// Upper bound on the number of fields accepted from a model.
pub const MAX_GENERATED_FIELDS: usize = 50;

const GENERATOR_ROLE: &str = "You are a form designer. Given a short description \
of a form, you produce a complete, ready-to-publish form definition with clear \
labels, sensible field types, and helpful placeholders.";

/// Build the full system prompt around the payload's JSON schema.
pub fn build_generation_system_prompt(schema_json: &str) -> String {
    let field_types: Vec<String> = FieldType::ALL.iter().map(|t| t.to_string()).collect();

    let rules = format!(
        "- Answer with a single JSON object and nothing else.\n\
         - Use only these field types: {}.\n\
         - select, radio and checkbox fields must include a non-empty \"options\" list.\n\
         - Every field needs a non-empty label.\n\
         - Use at most {MAX_GENERATED_FIELDS} fields, in the order they should appear.\n\
         - Mark fields as required only when the form cannot work without them.\n\
         - Include \"metadata\" with an estimated completion time in minutes, a \
         complexity of simple, moderate or complex, and up to three suggestions.",
        field_types.join(", ")
    );

    [
        format!("<role>\n{GENERATOR_ROLE}\n</role>"),
        format!("<output_rules>\n{rules}\n</output_rules>"),
        format!("<json_schema>\n{schema_json}\n</json_schema>"),
    ]
    .join("\n\n")
}

/// Wrap the user's description for the single user turn.
pub fn build_generation_user_message(prompt: &str) -> String {
    format!("<form_description>\n{}\n</form_description>", prompt.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_sections() {
        let prompt = build_generation_system_prompt("{\"type\":\"object\"}");
        assert!(prompt.contains("<role>"));
        assert!(prompt.contains("<output_rules>"));
        assert!(prompt.contains("<json_schema>\n{\"type\":\"object\"}\n</json_schema>"));
        assert!(prompt.contains("textarea"));
        assert!(prompt.contains("rating"));
    }

    #[test]
    fn test_user_message_is_trimmed() {
        assert_eq!(
            build_generation_user_message("  rsvp form \n"),
            "<form_description>\nrsvp form\n</form_description>"
        );
    }
}
