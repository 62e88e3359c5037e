use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::user::UserId;

/// Title used when a form is created without one.
pub const DEFAULT_TITLE: &str = "Untitled Form";

/// Confirmation shown to respondents when the owner has not set one.
pub const DEFAULT_SUBMIT_MESSAGE: &str = "Thank you for your submission!";

/// Unique identifier for a form, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormId(pub Uuid);

impl FormId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for FormId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FormId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Identifier of a field within its form.
///
/// Free-form string so that ids chosen by the builder UI or a model survive
/// unchanged; new fields get a UUID v7 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(pub String);

impl FieldId {
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FieldId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The fixed set of input kinds a field can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Phone,
    Number,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Date,
    File,
    Rating,
}

impl FieldType {
    pub const ALL: [FieldType; 11] = [
        FieldType::Text,
        FieldType::Email,
        FieldType::Phone,
        FieldType::Number,
        FieldType::Textarea,
        FieldType::Select,
        FieldType::Radio,
        FieldType::Checkbox,
        FieldType::Date,
        FieldType::File,
        FieldType::Rating,
    ];

    /// Choice fields must carry a non-empty option list.
    pub fn requires_options(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Radio | FieldType::Checkbox)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::Number => "number",
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::Date => "date",
            FieldType::File => "file",
            FieldType::Rating => "rating",
        };
        f.write_str(s)
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(FieldType::Text),
            "email" => Ok(FieldType::Email),
            "phone" => Ok(FieldType::Phone),
            "number" => Ok(FieldType::Number),
            "textarea" => Ok(FieldType::Textarea),
            "select" => Ok(FieldType::Select),
            "radio" => Ok(FieldType::Radio),
            "checkbox" => Ok(FieldType::Checkbox),
            "date" => Ok(FieldType::Date),
            "file" => Ok(FieldType::File),
            "rating" => Ok(FieldType::Rating),
            other => Err(format!("invalid field type: '{other}'")),
        }
    }
}

/// Presentation theme tag applied by the rendering UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormTheme {
    Default,
    Modern,
    Minimal,
}

impl fmt::Display for FormTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormTheme::Default => write!(f, "default"),
            FormTheme::Modern => write!(f, "modern"),
            FormTheme::Minimal => write!(f, "minimal"),
        }
    }
}

impl FromStr for FormTheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(FormTheme::Default),
            "modern" => Ok(FormTheme::Modern),
            "minimal" => Ok(FormTheme::Minimal),
            other => Err(format!("invalid form theme: '{other}'")),
        }
    }
}

impl Default for FormTheme {
    fn default() -> Self {
        FormTheme::Default
    }
}

/// One typed input definition within a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub id: FieldId,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    /// Ordered choices; only meaningful for select, radio and checkbox.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

/// A form owned by a user.
///
/// `response_count` is only changed by the submission and response-deletion
/// paths; owner updates never touch it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Form {
    pub id: FormId,
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    /// Fields in display order.
    pub fields: Vec<FormField>,
    pub theme: FormTheme,
    pub submit_message: String,
    pub redirect_url: Option<String>,
    pub published: bool,
    pub response_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Form {
    /// Look up a field by id.
    pub fn field(&self, id: &FieldId) -> Option<&FormField> {
        self.fields.iter().find(|f| &f.id == id)
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner_id == user
    }
}

/// Field definition as supplied by a client. The id is optional and is
/// generated when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldInput {
    #[serde(default)]
    pub id: Option<FieldId>,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

impl FieldInput {
    /// Materialize into a stored field, assigning an id if missing.
    pub fn into_field(self) -> FormField {
        FormField {
            id: self.id.unwrap_or_default(),
            field_type: self.field_type,
            label: self.label,
            placeholder: self.placeholder,
            required: self.required,
            options: self.options,
        }
    }
}

impl From<FormField> for FieldInput {
    fn from(field: FormField) -> Self {
        Self {
            id: Some(field.id),
            field_type: field.field_type,
            label: field.label,
            placeholder: field.placeholder,
            required: field.required,
            options: field.options,
        }
    }
}

/// Request to create a form. Everything is optional; missing values get
/// the defaults (untitled, default theme, unpublished).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateFormRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldInput>,
    #[serde(default)]
    pub theme: Option<FormTheme>,
    #[serde(default)]
    pub submit_message: Option<String>,
    #[serde(default)]
    pub redirect_url: Option<String>,
    #[serde(default)]
    pub published: Option<bool>,
}

/// Partial update of a form. A present `fields` list replaces the whole
/// ordered field list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFormRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub fields: Option<Vec<FieldInput>>,
    pub theme: Option<FormTheme>,
    pub submit_message: Option<String>,
    /// An empty string clears the redirect URL.
    pub redirect_url: Option<String>,
    pub published: Option<bool>,
}
