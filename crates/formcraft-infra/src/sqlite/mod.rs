//! SQLite storage layer.
//!
//! Repository implementations backed by SQLite with WAL mode and split
//! read/write connection pools.

pub mod api_key;
pub mod form;
pub mod pool;
pub mod response;
pub mod user;

use chrono::{DateTime, SecondsFormat, Utc};

use formcraft_types::error::RepositoryError;

/// Timestamps are stored as fixed-width RFC 3339 strings (microseconds,
/// `Z` suffix) so that string comparison matches time order.
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.message().contains("UNIQUE"))
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use formcraft_core::repository::user::UserRepository;
    use formcraft_types::form::{FieldId, FieldType, Form, FormField, FormId, FormTheme};
    use formcraft_types::user::{User, UserId};

    use super::pool::DatabasePool;
    use super::user::SqliteUserRepository;

    pub async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    pub fn make_user(external_id: &str) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            external_id: external_id.to_string(),
            email: format!("{external_id}@example.com"),
            name: Some("Test User".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Insert a user so forms can reference it.
    pub async fn seed_user(pool: &DatabasePool, external_id: &str) -> User {
        SqliteUserRepository::new(pool.clone())
            .upsert(&make_user(external_id))
            .await
            .unwrap()
    }

    pub fn field(id: &str, field_type: FieldType, label: &str) -> FormField {
        FormField {
            id: FieldId::from(id),
            field_type,
            label: label.to_string(),
            placeholder: None,
            required: false,
            options: field_type
                .requires_options()
                .then(|| vec!["One".to_string(), "Two".to_string()]),
        }
    }

    pub fn make_form(owner: &UserId, title: &str) -> Form {
        let now = Utc::now();
        Form {
            id: FormId::new(),
            owner_id: owner.clone(),
            title: title.to_string(),
            description: "A test form".to_string(),
            fields: vec![
                field("name", FieldType::Text, "Name"),
                field("email", FieldType::Email, "Email"),
                field("plan", FieldType::Select, "Plan"),
            ],
            theme: FormTheme::Modern,
            submit_message: "Thanks".to_string(),
            redirect_url: None,
            published: true,
            response_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
