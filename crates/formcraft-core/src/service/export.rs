//! CSV export of form responses.
//!
//! Header: `Response ID`, `Submitted At`, `IP Address`, then each field
//! label in form order. Every cell is quote-wrapped with embedded quotes
//! doubled, and rows are joined with `\n`.

use chrono::{DateTime, SecondsFormat, Utc};

use formcraft_types::form::Form;
use formcraft_types::response::FormResponse;

/// A rendered export ready to be written or downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
    /// Number of response rows, excluding the header.
    pub row_count: usize,
}

const FIXED_HEADERS: [&str; 3] = ["Response ID", "Submitted At", "IP Address"];

/// Column headers for a form's export.
pub fn header_row(form: &Form) -> Vec<String> {
    FIXED_HEADERS
        .iter()
        .map(|h| h.to_string())
        .chain(form.fields.iter().map(|f| f.label.clone()))
        .collect()
}

/// Cells of one response, aligned with [`header_row`]. Values for fields
/// the response does not carry render as empty cells.
pub fn response_row(form: &Form, response: &FormResponse) -> Vec<String> {
    let mut row = Vec::with_capacity(FIXED_HEADERS.len() + form.fields.len());
    row.push(response.id.to_string());
    row.push(format_timestamp(&response.submitted_at));
    row.push(response.ip_address.clone().unwrap_or_default());
    row.extend(form.fields.iter().map(|field| {
        response
            .data
            .get(&field.id)
            .map(|value| value.render())
            .unwrap_or_default()
    }));
    row
}

/// ISO-8601 UTC with milliseconds, e.g. `2024-05-01T10:00:00.000Z`.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Render the full CSV document. Row order follows `responses`.
pub fn responses_to_csv(form: &Form, responses: &[FormResponse]) -> String {
    std::iter::once(header_row(form))
        .chain(responses.iter().map(|r| response_row(form, r)))
        .map(|row| {
            row.iter()
                .map(|cell| quote_cell(cell))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Download name: non-alphanumerics in the title become `_`.
pub fn export_file_name(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{stem}_responses.csv")
}

fn quote_cell(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}
