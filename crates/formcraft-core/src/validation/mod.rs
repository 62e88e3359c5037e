//! Per-field validation of submitted values.
//!
//! `validate_field` is a pure function: the required rule runs first, then
//! the type rule for the field's kind. `validate_submission` applies it to
//! every field of a form and collects all failures instead of stopping at
//! the first one.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate};
use regex::Regex;

use formcraft_types::form::{FieldId, FieldType, Form, FormField};
use formcraft_types::response::{FieldError, FieldValue};

pub const INVALID_EMAIL: &str = "Please enter a valid email address";
pub const INVALID_PHONE: &str = "Please enter a valid phone number";
pub const INVALID_NUMBER: &str = "Please enter a valid number";
pub const INVALID_DATE: &str = "Please enter a valid date";
pub const INVALID_RATING: &str = "Please select a rating between 1 and 5";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{0,15}$").expect("phone pattern compiles"));

/// Characters removed from phone numbers before matching.
const PHONE_SEPARATORS: [char; 5] = [' ', '-', '(', ')', '.'];

/// Validate one candidate value against a field definition.
///
/// Returns the user-facing error message, or `None` when the value is
/// acceptable. A missing or empty value on an optional field is always
/// acceptable.
pub fn validate_field(field: &FormField, value: Option<&FieldValue>) -> Option<String> {
    let value = match value {
        Some(v) if !v.is_empty() => v,
        _ => {
            return field
                .required
                .then(|| format!("{} is required", field.label));
        }
    };

    let valid = match field.field_type {
        FieldType::Email => is_valid_email(value),
        FieldType::Phone => is_valid_phone(value),
        FieldType::Number => is_valid_number(value),
        FieldType::Date => is_valid_date(value),
        FieldType::Rating => is_valid_rating(value),
        FieldType::Text
        | FieldType::Textarea
        | FieldType::Select
        | FieldType::Radio
        | FieldType::Checkbox
        | FieldType::File => true,
    };

    if valid {
        None
    } else {
        Some(type_error_message(field.field_type).to_string())
    }
}

/// Validate a whole submission against a form, in field order.
///
/// Values for ids that are not fields of the form are ignored here; the
/// submission service drops them before storage.
pub fn validate_submission(form: &Form, values: &BTreeMap<FieldId, FieldValue>) -> Vec<FieldError> {
    form.fields
        .iter()
        .filter_map(|field| {
            validate_field(field, values.get(&field.id)).map(|message| FieldError {
                field_id: field.id.clone(),
                label: field.label.clone(),
                message,
            })
        })
        .collect()
}

fn type_error_message(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::Email => INVALID_EMAIL,
        FieldType::Phone => INVALID_PHONE,
        FieldType::Number => INVALID_NUMBER,
        FieldType::Date => INVALID_DATE,
        FieldType::Rating => INVALID_RATING,
        _ => "Invalid value",
    }
}

/// Whether a string has the `local@domain.tld` shape.
pub fn looks_like_email(s: &str) -> bool {
    EMAIL_RE.is_match(s.trim())
}

fn is_valid_email(value: &FieldValue) -> bool {
    match value {
        FieldValue::Text(s) => looks_like_email(s),
        _ => false,
    }
}

fn is_valid_phone(value: &FieldValue) -> bool {
    let raw = match value {
        FieldValue::Text(s) => s.clone(),
        FieldValue::Number(n) if n.is_finite() => n.to_string(),
        _ => return false,
    };
    let digits: String = raw.chars().filter(|c| !PHONE_SEPARATORS.contains(c)).collect();
    PHONE_RE.is_match(&digits)
}

fn as_number(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Number(n) => Some(*n),
        FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn is_valid_number(value: &FieldValue) -> bool {
    as_number(value).is_some()
}

fn is_valid_date(value: &FieldValue) -> bool {
    match value {
        FieldValue::Text(s) => {
            let s = s.trim();
            NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
                || DateTime::parse_from_rfc3339(s).is_ok()
        }
        _ => false,
    }
}

fn is_valid_rating(value: &FieldValue) -> bool {
    as_number(value).is_some_and(|n| n.fract() == 0.0 && (1.0..=5.0).contains(&n))
}
