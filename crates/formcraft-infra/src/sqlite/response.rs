//! SQLite response repository implementation.
//!
//! Responses are immutable once stored. The parent form's `response_count`
//! is maintained in the same transaction as every insert and delete.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use formcraft_core::repository::response::{ResponseFilter, ResponseRepository};
use formcraft_types::error::RepositoryError;
use formcraft_types::form::{FieldId, FormId};
use formcraft_types::response::{DailyCount, FieldValue, FormResponse, ResponseId};
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `ResponseRepository`.
#[derive(Clone)]
pub struct SqliteResponseRepository {
    pool: DatabasePool,
}

impl SqliteResponseRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.message().contains("FOREIGN KEY"))
}

fn row_to_response(row: &sqlx::sqlite::SqliteRow) -> Result<FormResponse, RepositoryError> {
    let get_err = |e: sqlx::Error| RepositoryError::Query(e.to_string());

    let id: String = row.try_get("id").map_err(get_err)?;
    let form_id: String = row.try_get("form_id").map_err(get_err)?;
    let data_json: String = row.try_get("data").map_err(get_err)?;
    let submitted_at: String = row.try_get("submitted_at").map_err(get_err)?;
    let ip_address: Option<String> = row.try_get("ip_address").map_err(get_err)?;
    let user_agent: Option<String> = row.try_get("user_agent").map_err(get_err)?;

    let data: BTreeMap<FieldId, FieldValue> = serde_json::from_str(&data_json)
        .map_err(|e| RepositoryError::Query(format!("invalid response data: {e}")))?;

    Ok(FormResponse {
        id: id
            .parse::<ResponseId>()
            .map_err(|e| RepositoryError::Query(format!("invalid response id: {e}")))?,
        form_id: form_id
            .parse::<FormId>()
            .map_err(|e| RepositoryError::Query(format!("invalid form id: {e}")))?,
        data,
        submitted_at: parse_datetime(&submitted_at)?,
        ip_address,
        user_agent,
    })
}

impl ResponseRepository for SqliteResponseRepository {
    async fn create(&self, response: &FormResponse) -> Result<FormResponse, RepositoryError> {
        let data_json = serde_json::to_string(&response.data)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let form_id = response.form_id.to_string();

        // INSERT response + UPDATE forms.response_count
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query(
            "INSERT INTO form_responses (id, form_id, data, submitted_at, ip_address, user_agent)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(response.id.to_string())
        .bind(&form_id)
        .bind(&data_json)
        .bind(format_datetime(&response.submitted_at))
        .bind(&response.ip_address)
        .bind(&response.user_agent)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                RepositoryError::NotFound
            } else {
                RepositoryError::Query(e.to_string())
            }
        })?;

        let result =
            sqlx::query("UPDATE forms SET response_count = response_count + 1 WHERE id = ?")
                .bind(&form_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(response.clone())
    }

    async fn get_by_id(&self, id: &ResponseId) -> Result<Option<FormResponse>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM form_responses WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.as_ref().map(row_to_response).transpose()
    }

    async fn list_for_form(
        &self,
        form_id: &FormId,
        filter: ResponseFilter,
    ) -> Result<Vec<FormResponse>, RepositoryError> {
        let mut sql = String::from("SELECT * FROM form_responses WHERE form_id = ?");
        if filter.since.is_some() {
            sql.push_str(" AND submitted_at >= ?");
        }
        sql.push_str(" ORDER BY submitted_at DESC, id DESC");

        match (filter.limit, filter.offset) {
            (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
            (None, None) => {}
        }

        let mut query = sqlx::query(&sql).bind(form_id.to_string());
        if let Some(since) = filter.since {
            query = query.bind(format_datetime(&since));
        }

        let rows = query
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(row_to_response).collect()
    }

    async fn count_for_form(
        &self,
        form_id: &FormId,
        since: Option<DateTime<Utc>>,
    ) -> Result<i64, RepositoryError> {
        let count: i64 = match since {
            Some(since) => sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM form_responses WHERE form_id = ? AND submitted_at >= ?",
            )
            .bind(form_id.to_string())
            .bind(format_datetime(&since))
            .fetch_one(&self.pool.reader)
            .await,
            None => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM form_responses WHERE form_id = ?",
                )
                .bind(form_id.to_string())
                .fetch_one(&self.pool.reader)
                .await
            }
        }
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(count)
    }

    async fn daily_counts(
        &self,
        form_id: &FormId,
        since: DateTime<Utc>,
    ) -> Result<Vec<DailyCount>, RepositoryError> {
        // Stored timestamps are UTC RFC 3339, so the first 10 chars are the day.
        let rows = sqlx::query(
            "SELECT substr(submitted_at, 1, 10) AS day, COUNT(*) AS count
             FROM form_responses
             WHERE form_id = ? AND submitted_at >= ?
             GROUP BY day
             ORDER BY day ASC",
        )
        .bind(form_id.to_string())
        .bind(format_datetime(&since))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                let day: String = row
                    .try_get("day")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                let count: i64 = row
                    .try_get("count")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                    .map_err(|e| RepositoryError::Query(format!("invalid day '{day}': {e}")))?;
                Ok(DailyCount { date, count })
            })
            .collect()
    }

    async fn delete(&self, id: &ResponseId) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let form_id: Option<String> =
            sqlx::query_scalar("SELECT form_id FROM form_responses WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let Some(form_id) = form_id else {
            return Err(RepositoryError::NotFound);
        };

        sqlx::query("DELETE FROM form_responses WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query(
            "UPDATE forms SET response_count = MAX(response_count - 1, 0) WHERE id = ?",
        )
        .bind(&form_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }
}
