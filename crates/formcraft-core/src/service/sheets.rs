//! Spreadsheet sync port.
//!
//! After a response is stored the submission service pushes one row to an
//! external spreadsheet. The push is best-effort: its outcome is reported
//! in the receipt and never fails the submission.

use serde::Serialize;
use thiserror::Error;

use formcraft_types::form::Form;
use formcraft_types::response::FormResponse;

use super::export;

#[derive(Debug, Error)]
pub enum SyncError {
    /// No spreadsheet target is configured.
    #[error("spreadsheet sync is disabled")]
    Disabled,

    #[error("spreadsheet transport error: {0}")]
    Transport(String),

    #[error("spreadsheet endpoint rejected row (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },
}

/// One exported row together with the headers it lines up with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetRow {
    pub form_id: String,
    pub form_title: String,
    pub response_id: String,
    pub submitted_at: String,
    pub headers: Vec<String>,
    pub row: Vec<String>,
}

impl SheetRow {
    /// Build the row with the same cells as the CSV export.
    pub fn new(form: &Form, response: &FormResponse) -> Self {
        Self {
            form_id: form.id.to_string(),
            form_title: form.title.clone(),
            response_id: response.id.to_string(),
            submitted_at: export::format_timestamp(&response.submitted_at),
            headers: export::header_row(form),
            row: export::response_row(form, response),
        }
    }
}

/// Port for appending responses to an external spreadsheet.
pub trait SpreadsheetSync: Send + Sync {
    /// Whether a target is configured. Disabled syncs are reported as skipped.
    fn is_enabled(&self) -> bool;

    fn append(
        &self,
        row: &SheetRow,
    ) -> impl std::future::Future<Output = Result<(), SyncError>> + Send;
}

/// Sync used when no spreadsheet target is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSpreadsheetSync;

impl SpreadsheetSync for DisabledSpreadsheetSync {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn append(&self, _row: &SheetRow) -> Result<(), SyncError> {
        Err(SyncError::Disabled)
    }
}
