//! Keyword-based form generation.
//!
//! Scans the prompt for fixed keyword groups and emits one field per
//! matched group, in table order. Matching is done on whole words (a
//! trailing plural `s` is tolerated), so "message" does not count as "age"
//! and "fields" does not count as "file".

use formcraft_types::error::GenerationError;
use formcraft_types::form::{
    CreateFormRequest, DEFAULT_SUBMIT_MESSAGE, FieldId, FieldInput, FieldType, FormTheme,
};
use formcraft_types::generation::{GENERATED_DESCRIPTION, GeneratedForm, GenerationStrategy};

use super::{FormGenerator, normalize_prompt};

/// Maximum title length in characters before truncation.
const MAX_TITLE_CHARS: usize = 50;

/// Title used when the prompt yields nothing usable.
pub const FALLBACK_TITLE: &str = "Generated Form";

struct FieldPattern {
    keywords: &'static [&'static str],
    field_type: FieldType,
    label: &'static str,
}

const FIELD_PATTERNS: &[FieldPattern] = &[
    FieldPattern {
        keywords: &["name", "full name", "first name", "last name"],
        field_type: FieldType::Text,
        label: "Name",
    },
    FieldPattern {
        keywords: &["email", "email address", "e-mail"],
        field_type: FieldType::Email,
        label: "Email Address",
    },
    FieldPattern {
        keywords: &["phone", "telephone", "mobile", "contact number"],
        field_type: FieldType::Phone,
        label: "Phone Number",
    },
    FieldPattern {
        keywords: &["age", "number", "quantity", "amount"],
        field_type: FieldType::Number,
        label: "Number",
    },
    FieldPattern {
        keywords: &["message", "comment", "description", "details", "feedback"],
        field_type: FieldType::Textarea,
        label: "Message",
    },
    FieldPattern {
        keywords: &["date", "birthday", "appointment"],
        field_type: FieldType::Date,
        label: "Date",
    },
    FieldPattern {
        keywords: &["file", "upload", "attachment", "document"],
        field_type: FieldType::File,
        label: "File Upload",
    },
    FieldPattern {
        keywords: &["rating", "rate", "stars", "review"],
        field_type: FieldType::Rating,
        label: "Rating",
    },
];

const SELECT_KEYWORDS: &[&str] = &["select", "choose", "option"];
const CHECKBOX_KEYWORDS: &[&str] = &["multiple", "checkbox", "all that apply"];

/// Generator that never calls out; used when no model is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicGenerator;

impl HeuristicGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Build the draft synchronously. Fails only on an empty prompt.
    pub fn draft(&self, prompt: &str) -> Result<GeneratedForm, GenerationError> {
        let prompt = normalize_prompt(prompt)?;

        Ok(GeneratedForm {
            form: CreateFormRequest {
                title: Some(derive_title(prompt)),
                description: Some(GENERATED_DESCRIPTION.to_string()),
                fields: fields_for_prompt(prompt),
                theme: Some(FormTheme::Default),
                submit_message: Some(DEFAULT_SUBMIT_MESSAGE.to_string()),
                redirect_url: None,
                published: Some(false),
            },
            metadata: None,
            strategy: GenerationStrategy::Heuristic,
        })
    }
}

impl FormGenerator for HeuristicGenerator {
    fn strategy(&self) -> GenerationStrategy {
        GenerationStrategy::Heuristic
    }

    async fn generate(&self, prompt: &str) -> Result<GeneratedForm, GenerationError> {
        let draft = self.draft(prompt)?;
        tracing::debug!(
            fields = draft.form.fields.len(),
            "heuristic generator produced draft"
        );
        Ok(draft)
    }
}

/// Derive the ordered field list for a prompt.
pub fn fields_for_prompt(prompt: &str) -> Vec<FieldInput> {
    let words = tokenize(prompt);
    let mut fields: Vec<FieldInput> = FIELD_PATTERNS
        .iter()
        .filter(|pattern| contains_any(&words, pattern.keywords))
        .map(|pattern| FieldInput {
            id: Some(FieldId::new()),
            field_type: pattern.field_type,
            label: pattern.label.to_string(),
            placeholder: Some(format!("Enter your {}", pattern.label.to_lowercase())),
            required: true,
            options: None,
        })
        .collect();

    if contains_any(&words, SELECT_KEYWORDS) {
        fields.push(choice_field(
            FieldType::Select,
            "Please Select",
            true,
            &["Option 1", "Option 2", "Option 3"],
        ));
    }

    if contains_any(&words, CHECKBOX_KEYWORDS) {
        fields.push(choice_field(
            FieldType::Checkbox,
            "Select All That Apply",
            false,
            &["Choice 1", "Choice 2", "Choice 3"],
        ));
    }

    if fields.is_empty() {
        fields = default_fields();
    }

    fields
}

/// Title from the prompt: capitalized, and cut to 47 characters plus an
/// ellipsis when longer than 50.
pub fn derive_title(prompt: &str) -> String {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return FALLBACK_TITLE.to_string();
    }

    let base: String = if trimmed.chars().count() > MAX_TITLE_CHARS {
        let cut: String = trimmed.chars().take(MAX_TITLE_CHARS - 3).collect();
        format!("{cut}...")
    } else {
        trimmed.to_string()
    };

    let mut chars = base.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => FALLBACK_TITLE.to_string(),
    }
}

fn default_fields() -> Vec<FieldInput> {
    vec![
        FieldInput {
            id: Some(FieldId::new()),
            field_type: FieldType::Text,
            label: "Name".to_string(),
            placeholder: Some("Enter your name".to_string()),
            required: true,
            options: None,
        },
        FieldInput {
            id: Some(FieldId::new()),
            field_type: FieldType::Email,
            label: "Email Address".to_string(),
            placeholder: Some("Enter your email".to_string()),
            required: true,
            options: None,
        },
    ]
}

fn choice_field(
    field_type: FieldType,
    label: &str,
    required: bool,
    options: &[&str],
) -> FieldInput {
    FieldInput {
        id: Some(FieldId::new()),
        field_type,
        label: label.to_string(),
        placeholder: None,
        required,
        options: Some(options.iter().map(|o| o.to_string()).collect()),
    }
}

/// Lowercase and split on anything that is not a letter or digit.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn contains_any(words: &[String], keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| contains_phrase(words, &tokenize(kw)))
}

/// Whether `phrase` occurs as consecutive words. The last word may carry a
/// plural `s`.
fn contains_phrase(words: &[String], phrase: &[String]) -> bool {
    let Some((last, head)) = phrase.split_last() else {
        return false;
    };
    if words.len() < phrase.len() {
        return false;
    }

    words.windows(phrase.len()).any(|window| {
        let (window_last, window_head) = match window.split_last() {
            Some(parts) => parts,
            None => return false,
        };
        window_head == head
            && (window_last == last || window_last.strip_suffix('s') == Some(last.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(fields: &[FieldInput]) -> Vec<FieldType> {
        fields.iter().map(|f| f.field_type).collect()
    }

    #[test]
    fn test_contact_form_scenario() {
        let draft = HeuristicGenerator::new()
            .draft("Create a contact form with name, email, phone, and message fields")
            .unwrap();
        assert_eq!(
            types(&draft.form.fields),
            vec![
                FieldType::Text,
                FieldType::Email,
                FieldType::Phone,
                FieldType::Textarea
            ]
        );
        assert_eq!(
            draft.form.title.as_deref(),
            Some("Create a contact form with name, email, phone, ...")
        );
        assert_eq!(draft.strategy, GenerationStrategy::Heuristic);
        assert_eq!(draft.form.published, Some(false));
    }

    #[test]
    fn test_fields_are_required_with_placeholders() {
        let fields = fields_for_prompt("phone and email");
        assert_eq!(fields[0].label, "Email Address");
        assert_eq!(fields[0].placeholder.as_deref(), Some("Enter your email address"));
        assert!(fields.iter().all(|f| f.required));
        assert!(fields.iter().all(|f| f.id.is_some()));
    }

    #[test]
    fn test_scan_order_is_table_order() {
        let fields = fields_for_prompt("rating then upload then birthday then name");
        assert_eq!(
            types(&fields),
            vec![FieldType::Text, FieldType::Date, FieldType::File, FieldType::Rating]
        );
    }

    #[test]
    fn test_multi_word_and_hyphenated_keywords() {
        assert_eq!(types(&fields_for_prompt("your e-mail please")), vec![FieldType::Email]);
        assert_eq!(
            types(&fields_for_prompt("a contact number")),
            vec![FieldType::Phone, FieldType::Number]
        );
    }

    #[test]
    fn test_plural_keywords_match() {
        assert_eq!(
            types(&fields_for_prompt("collect comments and attachments")),
            vec![FieldType::Textarea, FieldType::File]
        );
    }

    #[test]
    fn test_word_boundaries() {
        // "message" contains "age", "profile" contains "file"
        assert_eq!(
            types(&fields_for_prompt("leave a message on my profile")),
            vec![FieldType::Textarea]
        );
    }

    #[test]
    fn test_select_and_checkbox() {
        let fields = fields_for_prompt("choose a plan and tick all that apply");
        assert_eq!(types(&fields), vec![FieldType::Select, FieldType::Checkbox]);
        assert_eq!(fields[0].label, "Please Select");
        assert!(fields[0].required);
        assert_eq!(fields[0].options.as_ref().unwrap().len(), 3);
        assert_eq!(fields[1].label, "Select All That Apply");
        assert!(!fields[1].required);
        assert_eq!(
            fields[1].options.as_deref().unwrap(),
            ["Choice 1", "Choice 2", "Choice 3"]
        );
    }

    #[test]
    fn test_default_fields_when_nothing_matches() {
        let fields = fields_for_prompt("something about cats");
        assert_eq!(types(&fields), vec![FieldType::Text, FieldType::Email]);
        assert_eq!(fields[0].placeholder.as_deref(), Some("Enter your name"));
        assert_eq!(fields[1].placeholder.as_deref(), Some("Enter your email"));
    }

    #[test]
    fn test_title_rules() {
        assert_eq!(derive_title("event signup"), "Event signup");
        assert_eq!(derive_title("   "), FALLBACK_TITLE);
        let long = "a".repeat(60);
        let title = derive_title(&long);
        assert_eq!(title.chars().count(), 50);
        assert!(title.starts_with('A'));
        assert!(title.ends_with("..."));
        let exact = "b".repeat(50);
        assert_eq!(derive_title(&exact).chars().count(), 50);
        assert!(!derive_title(&exact).ends_with("..."));
    }

    #[test]
    fn test_empty_prompt_rejected() {
        assert!(matches!(
            HeuristicGenerator::new().draft("  "),
            Err(GenerationError::EmptyPrompt)
        ));
    }

    #[tokio::test]
    async fn test_generate_via_trait() {
        let generator = HeuristicGenerator::new();
        let draft = generator.generate("feedback survey with stars").await.unwrap();
        assert_eq!(
            types(&draft.form.fields),
            vec![FieldType::Textarea, FieldType::Rating]
        );
        assert!(draft.metadata.is_none());
    }
}
