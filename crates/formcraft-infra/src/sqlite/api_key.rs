//! API key storage.
//!
//! Keys are shown once at creation; only their SHA-256 hash is stored.
//! Each key belongs to a user, and authenticating a key yields that user.

use chrono::Utc;
use formcraft_types::error::RepositoryError;
use formcraft_types::user::UserId;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use sqlx::Row;
use uuid::Uuid;

use super::format_datetime;
use super::pool::DatabasePool;

/// Prefix that makes Formcraft keys recognizable in logs and configs.
pub const API_KEY_PREFIX: &str = "fc_";

/// Metadata of a stored key (never the key itself).
#[derive(Debug, Clone)]
pub struct ApiKeyInfo {
    pub id: String,
    pub user_id: UserId,
    pub name: String,
    pub created_at: String,
    pub last_used_at: Option<String>,
}

/// Hex-encoded SHA-256 of a plaintext key.
pub fn hash_api_key(key: &str) -> String {
    format!("{:x}", Sha256::digest(key.as_bytes()))
}

/// Generate a new random key: prefix + 32 random bytes as hex.
pub fn generate_api_key() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!("{API_KEY_PREFIX}{hex}")
}

#[derive(Clone)]
pub struct SqliteApiKeyRepository {
    pool: DatabasePool,
}

impl SqliteApiKeyRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Create a key for `user_id` and return the plaintext.
    pub async fn issue(&self, user_id: &UserId, name: &str) -> Result<String, RepositoryError> {
        let key = generate_api_key();

        sqlx::query(
            "INSERT INTO api_keys (id, user_id, key_hash, name, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(Uuid::now_v7().to_string())
        .bind(user_id.to_string())
        .bind(hash_api_key(&key))
        .bind(name)
        .bind(format_datetime(&Utc::now()))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.message().contains("FOREIGN KEY") => {
                RepositoryError::NotFound
            }
            other => RepositoryError::Query(other.to_string()),
        })?;

        tracing::info!(user_id = %user_id, name, "issued API key");
        Ok(key)
    }

    /// Resolve a plaintext key to its owner.
    ///
    /// Updates `last_used_at` on success; that write is best effort and
    /// never fails the lookup.
    pub async fn authenticate(&self, key: &str) -> Result<Option<UserId>, RepositoryError> {
        let row = sqlx::query("SELECT id, user_id FROM api_keys WHERE key_hash = ?")
            .bind(hash_api_key(key))
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id: String = row
            .try_get("id")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let user_id: String = row
            .try_get("user_id")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let user_id = user_id
            .parse::<UserId>()
            .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?;

        if let Err(e) = sqlx::query("UPDATE api_keys SET last_used_at = ? WHERE id = ?")
            .bind(format_datetime(&Utc::now()))
            .bind(&id)
            .execute(&self.pool.writer)
            .await
        {
            tracing::debug!("failed to record API key use: {e}");
        }

        Ok(Some(user_id))
    }

    pub async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ApiKeyInfo>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, created_at, last_used_at FROM api_keys
             WHERE user_id = ? ORDER BY created_at ASC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                Ok(ApiKeyInfo {
                    id: row.try_get("id").map_err(|e| RepositoryError::Query(e.to_string()))?,
                    user_id: user_id.clone(),
                    name: row.try_get("name").map_err(|e| RepositoryError::Query(e.to_string()))?,
                    created_at: row
                        .try_get("created_at")
                        .map_err(|e| RepositoryError::Query(e.to_string()))?,
                    last_used_at: row
                        .try_get("last_used_at")
                        .map_err(|e| RepositoryError::Query(e.to_string()))?,
                })
            })
            .collect()
    }
}
