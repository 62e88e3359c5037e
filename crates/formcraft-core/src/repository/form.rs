//! Form repository trait definition.

use formcraft_types::error::RepositoryError;
use formcraft_types::form::{Form, FormId};
use formcraft_types::user::UserId;

use super::SortOrder;

/// Filter criteria for listing forms. Results are ordered by `updated_at`.
#[derive(Debug, Clone, Default)]
pub struct FormFilter {
    /// Only forms owned by this user.
    pub owner_id: Option<UserId>,
    /// Filter by published state.
    pub published: Option<bool>,
    pub sort_order: Option<SortOrder>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Repository trait for form persistence.
///
/// A form is stored together with its ordered fields; implementations must
/// persist field order explicitly and cascade deletes to fields and
/// responses. Uses native async fn in traits (Rust 2024 edition, no
/// async_trait macro).
pub trait FormRepository: Send + Sync {
    /// Create a new form with its fields. Returns the created form.
    fn create(
        &self,
        form: &Form,
    ) -> impl std::future::Future<Output = Result<Form, RepositoryError>> + Send;

    /// Get a form (with fields in order) by its ID.
    fn get_by_id(
        &self,
        id: &FormId,
    ) -> impl std::future::Future<Output = Result<Option<Form>, RepositoryError>> + Send;

    /// List forms with optional filtering and pagination.
    fn list(
        &self,
        filter: FormFilter,
    ) -> impl std::future::Future<Output = Result<Vec<Form>, RepositoryError>> + Send;

    /// Update a form's settings and replace its field list.
    ///
    /// Never writes `response_count`; that counter belongs to the response
    /// repository. Returns `RepositoryError::NotFound` for unknown ids.
    fn update(
        &self,
        form: &Form,
    ) -> impl std::future::Future<Output = Result<Form, RepositoryError>> + Send;

    /// Permanently delete a form, its fields and its responses.
    fn delete(
        &self,
        id: &FormId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
