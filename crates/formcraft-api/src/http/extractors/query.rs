//! Query parameter extractors for list endpoints.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use formcraft_core::repository::SortOrder;

/// Query parameters for the form list endpoint.
#[derive(Debug, Deserialize, Default)]
pub struct FormListQuery {
    /// Filter by published state.
    pub published: Option<bool>,
    /// Sort order on `updated_at` (asc, desc).
    #[serde(default = "default_order")]
    pub order: String,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl FormListQuery {
    pub fn sort_order(&self) -> SortOrder {
        match self.order.to_lowercase().as_str() {
            "asc" => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }
}

/// Query parameters for the response list endpoint.
#[derive(Debug, Deserialize, Default)]
pub struct ResponseListQuery {
    /// Only responses submitted at or after this instant (RFC 3339).
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn default_order() -> String {
    "desc".to_string()
}
