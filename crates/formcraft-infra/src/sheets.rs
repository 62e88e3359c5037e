//! Spreadsheet webhook adapter.
//!
//! Posts each stored response as a JSON [`SheetRow`] to a configured URL
//! (typically a spreadsheet script endpoint that appends the row).

use std::time::Duration;

use formcraft_core::service::sheets::{
    DisabledSpreadsheetSync, SheetRow, SpreadsheetSync, SyncError,
};
use formcraft_types::config::SheetsConfig;

/// Appends rows by POSTing them to a webhook.
pub struct WebhookSpreadsheetSync {
    client: reqwest::Client,
    url: String,
}

impl WebhookSpreadsheetSync {
    pub fn new(url: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, url }
    }
}

impl SpreadsheetSync for WebhookSpreadsheetSync {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn append(&self, row: &SheetRow) -> Result<(), SyncError> {
        let response = self
            .client
            .post(&self.url)
            .json(row)
            .send()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SyncError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        tracing::debug!(response_id = %row.response_id, "row appended to spreadsheet");
        Ok(())
    }
}

/// The spreadsheet sync chosen from configuration.
pub enum ConfiguredSpreadsheetSync {
    Webhook(WebhookSpreadsheetSync),
    Disabled(DisabledSpreadsheetSync),
}

impl ConfiguredSpreadsheetSync {
    pub fn from_config(config: &SheetsConfig) -> Self {
        match config
            .webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
        {
            Some(url) => Self::Webhook(WebhookSpreadsheetSync::new(
                url.to_string(),
                Duration::from_secs(config.timeout_secs),
            )),
            None => Self::Disabled(DisabledSpreadsheetSync),
        }
    }
}

impl SpreadsheetSync for ConfiguredSpreadsheetSync {
    fn is_enabled(&self) -> bool {
        match self {
            Self::Webhook(s) => s.is_enabled(),
            Self::Disabled(s) => s.is_enabled(),
        }
    }

    async fn append(&self, row: &SheetRow) -> Result<(), SyncError> {
        match self {
            Self::Webhook(s) => s.append(row).await,
            Self::Disabled(s) => s.append(row).await,
        }
    }
}
