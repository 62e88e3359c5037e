//! User repository trait definition.

use formcraft_types::error::RepositoryError;
use formcraft_types::user::{User, UserId};

/// Repository trait for user records mirrored from the identity provider.
pub trait UserRepository: Send + Sync {
    /// Insert the user, or update email/name of the existing user with the
    /// same `external_id`. Returns the stored record (existing id preserved).
    fn upsert(
        &self,
        user: &User,
    ) -> impl std::future::Future<Output = Result<User, RepositoryError>> + Send;

    fn get_by_id(
        &self,
        id: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    fn get_by_external_id(
        &self,
        external_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// All users, oldest first.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<User>, RepositoryError>> + Send;

    /// Delete a user; their forms cascade.
    fn delete(
        &self,
        id: &UserId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
