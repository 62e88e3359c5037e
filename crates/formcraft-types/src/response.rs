use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::form::{FieldId, FormId};

/// Unique identifier for a stored response, wrapping a UUID v7.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResponseId(pub Uuid);

impl ResponseId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ResponseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ResponseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ResponseId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Metadata of an uploaded file answer. Only the name is required; the
/// upload itself lives outside this service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A single submitted answer.
///
/// Serialized untagged so that plain JSON values from the UI map directly:
/// `true`, `42`, `"text"`, `["a", "b"]`, `{"name": "cv.pdf"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
    File(FileRef),
}

impl FieldValue {
    /// Whether the value counts as "not provided" for the required rule.
    ///
    /// Whitespace-only text and empty lists are empty; `false` and `0` are
    /// real answers.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::File(file) => file.name.trim().is_empty(),
            FieldValue::Bool(_) | FieldValue::Number(_) => false,
        }
    }

    /// Flat text rendering used for exports and spreadsheet rows.
    ///
    /// Lists are joined with `"; "` and files render as their file name.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::List(items) => items.join(LIST_SEPARATOR),
            FieldValue::File(file) => file.name.clone(),
        }
    }
}

/// Separator between the items of a list answer in flat renderings.
pub const LIST_SEPARATOR: &str = "; ";

/// One end-user submission against a form. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormResponse {
    pub id: ResponseId,
    pub form_id: FormId,
    /// Answers keyed by field id.
    pub data: BTreeMap<FieldId, FieldValue>,
    pub submitted_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Requester details captured alongside a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// A validation failure for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field_id: FieldId,
    pub label: String,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field_id, self.message)
    }
}

/// Outcome of the best-effort spreadsheet sync after a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetSyncStatus {
    Synced,
    Skipped,
    Failed,
}

impl fmt::Display for SheetSyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetSyncStatus::Synced => write!(f, "synced"),
            SheetSyncStatus::Skipped => write!(f, "skipped"),
            SheetSyncStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Returned to the respondent after a successful submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub response_id: ResponseId,
    pub form_id: FormId,
    pub submitted_at: DateTime<Utc>,
    pub submit_message: String,
    pub redirect_url: Option<String>,
    pub sheet_sync: SheetSyncStatus,
}

/// Responses received on one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

/// Response statistics for a form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormAnalytics {
    pub form_id: FormId,
    /// Aggregate count of stored responses.
    pub total_responses: i64,
    /// The form's stored counter, for comparison with the aggregate.
    pub stored_counter: i64,
    pub today: i64,
    pub last_7_days: i64,
    pub last_30_days: i64,
    /// One entry per day for the last 7 days, oldest first, zero-filled.
    pub daily: Vec<DailyCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_untagged_decoding() {
        let values: Vec<FieldValue> =
            serde_json::from_str(r#"[true, 4, "hi", ["a", "b"], {"name": "cv.pdf", "size": 12}]"#)
                .unwrap();
        assert_eq!(values[0], FieldValue::Bool(true));
        assert_eq!(values[1], FieldValue::Number(4.0));
        assert_eq!(values[2], FieldValue::Text("hi".to_string()));
        assert_eq!(
            values[3],
            FieldValue::List(vec!["a".to_string(), "b".to_string()])
        );
        match &values[4] {
            FieldValue::File(file) => {
                assert_eq!(file.name, "cv.pdf");
                assert_eq!(file.size, Some(12));
            }
            other => panic!("expected file, got {other:?}"),
        }
    }

    #[test]
    fn test_field_value_is_empty() {
        assert!(FieldValue::Text("   ".to_string()).is_empty());
        assert!(FieldValue::List(vec![]).is_empty());
        assert!(!FieldValue::Bool(false).is_empty());
        assert!(!FieldValue::Number(0.0).is_empty());
        assert!(!FieldValue::Text("x".to_string()).is_empty());
    }

    #[test]
    fn test_field_value_render() {
        assert_eq!(FieldValue::Number(42.0).render(), "42");
        assert_eq!(FieldValue::Number(3.5).render(), "3.5");
        assert_eq!(FieldValue::Bool(false).render(), "false");
        assert_eq!(
            FieldValue::List(vec!["red".to_string(), "blue".to_string()]).render(),
            "red; blue"
        );
        let file = FieldValue::File(FileRef {
            name: "photo.png".to_string(),
            size: None,
            content_type: Some("image/png".to_string()),
            url: None,
        });
        assert_eq!(file.render(), "photo.png");
    }

    #[test]
    fn test_sheet_sync_status_serde() {
        let json = serde_json::to_string(&SheetSyncStatus::Skipped).unwrap();
        assert_eq!(json, "\"skipped\"");
    }
}
