//! User service.
//!
//! Users are mirrored from the external identity provider: the service only
//! upserts by external id and never manages credentials itself.

use formcraft_types::error::{RepositoryError, UserError};
use formcraft_types::user::{SyncUserRequest, User, UserId};

use crate::repository::user::UserRepository;
use crate::validation::looks_like_email;

pub struct UserService<U: UserRepository> {
    user_repo: U,
}

impl<U: UserRepository> UserService<U> {
    pub fn new(user_repo: U) -> Self {
        Self { user_repo }
    }

    /// Insert or refresh the user identified by `external_id`.
    pub async fn sync_user(&self, request: SyncUserRequest) -> Result<User, UserError> {
        let external_id = request.external_id.trim();
        if external_id.is_empty() {
            return Err(UserError::Invalid("external id cannot be empty".to_string()));
        }
        let email = request.email.trim();
        if !looks_like_email(email) {
            return Err(UserError::Invalid(format!("invalid email address: '{email}'")));
        }

        let now = chrono::Utc::now();
        let user = User {
            id: UserId::new(),
            external_id: external_id.to_string(),
            email: email.to_string(),
            name: request
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            created_at: now,
            updated_at: now,
        };

        let user = self
            .user_repo
            .upsert(&user)
            .await
            .map_err(|e| UserError::StorageError(e.to_string()))?;
        tracing::debug!(user_id = %user.id, "user synced");
        Ok(user)
    }

    pub async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.user_repo
            .get_by_id(id)
            .await
            .map_err(|e| UserError::StorageError(e.to_string()))?
            .ok_or(UserError::NotFound)
    }

    pub async fn get_by_external_id(&self, external_id: &str) -> Result<User, UserError> {
        self.user_repo
            .get_by_external_id(external_id.trim())
            .await
            .map_err(|e| UserError::StorageError(e.to_string()))?
            .ok_or(UserError::NotFound)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.user_repo
            .list()
            .await
            .map_err(|e| UserError::StorageError(e.to_string()))
    }

    /// Delete a user and, through the store's cascade, all their forms.
    pub async fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        self.user_repo.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound => UserError::NotFound,
            other => UserError::StorageError(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::memory::MemoryStore;

    fn request(external_id: &str, email: &str, name: Option<&str>) -> SyncUserRequest {
        SyncUserRequest {
            external_id: external_id.to_string(),
            email: email.to_string(),
            name: name.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_sync_user_upserts_by_external_id() {
        let svc = UserService::new(MemoryStore::new());
        let first = svc
            .sync_user(request("user_1", "a@example.com", Some("Ada")))
            .await
            .unwrap();
        let second = svc
            .sync_user(request("user_1", "ada@example.com", None))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.email, "ada@example.com");
        assert!(second.name.is_none());
        assert_eq!(svc.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sync_user_validates_input() {
        let svc = UserService::new(MemoryStore::new());
        assert!(matches!(
            svc.sync_user(request(" ", "a@example.com", None)).await,
            Err(UserError::Invalid(_))
        ));
        assert!(matches!(
            svc.sync_user(request("u", "not-an-email", None)).await,
            Err(UserError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn test_lookup_and_delete() {
        let svc = UserService::new(MemoryStore::new());
        let user = svc
            .sync_user(request("ext", "e@example.com", Some("  ")))
            .await
            .unwrap();
        assert!(user.name.is_none());

        assert_eq!(svc.get_by_external_id("ext").await.unwrap().id, user.id);
        assert_eq!(svc.get_user(&user.id).await.unwrap().external_id, "ext");

        svc.delete_user(&user.id).await.unwrap();
        assert!(matches!(svc.get_user(&user.id).await, Err(UserError::NotFound)));
        assert!(matches!(svc.delete_user(&user.id).await, Err(UserError::NotFound)));
    }
}
