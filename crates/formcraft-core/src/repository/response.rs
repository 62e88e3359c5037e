//! Response repository trait definition.

use chrono::{DateTime, Utc};

use formcraft_types::error::RepositoryError;
use formcraft_types::form::FormId;
use formcraft_types::response::{DailyCount, FormResponse, ResponseId};

/// Pagination and time window for listing responses (newest first).
#[derive(Debug, Clone, Default)]
pub struct ResponseFilter {
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Repository trait for response persistence and the owning form's counter.
pub trait ResponseRepository: Send + Sync {
    /// Store a response and increment the owning form's `response_count`.
    ///
    /// Both writes happen atomically: either the response exists and the
    /// counter was bumped, or neither happened.
    fn create(
        &self,
        response: &FormResponse,
    ) -> impl std::future::Future<Output = Result<FormResponse, RepositoryError>> + Send;

    fn get_by_id(
        &self,
        id: &ResponseId,
    ) -> impl std::future::Future<Output = Result<Option<FormResponse>, RepositoryError>> + Send;

    /// Responses of a form ordered by submission time, newest first.
    fn list_for_form(
        &self,
        form_id: &FormId,
        filter: ResponseFilter,
    ) -> impl std::future::Future<Output = Result<Vec<FormResponse>, RepositoryError>> + Send;

    /// Count responses of a form, optionally only those submitted at or after `since`.
    fn count_for_form(
        &self,
        form_id: &FormId,
        since: Option<DateTime<Utc>>,
    ) -> impl std::future::Future<Output = Result<i64, RepositoryError>> + Send;

    /// Per-day (UTC) response counts since the given instant. Days without
    /// responses are omitted; ordering is oldest first.
    fn daily_counts(
        &self,
        form_id: &FormId,
        since: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Vec<DailyCount>, RepositoryError>> + Send;

    /// Delete a response and decrement the owning form's counter (never
    /// below zero), atomically. Returns `RepositoryError::NotFound` for
    /// unknown ids.
    fn delete(
        &self,
        id: &ResponseId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
