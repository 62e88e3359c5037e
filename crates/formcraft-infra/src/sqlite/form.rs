//! SQLite form repository implementation.
//!
//! A form row plus its `form_fields` rows. Field order is the explicit
//! `position` column; create and update write both tables in one
//! transaction.

use formcraft_core::repository::SortOrder;
use formcraft_core::repository::form::{FormFilter, FormRepository};
use formcraft_types::error::RepositoryError;
use formcraft_types::form::{FieldId, FieldType, Form, FormField, FormId, FormTheme};
use formcraft_types::user::UserId;
use sqlx::{Row, Sqlite, Transaction};

use super::pool::DatabasePool;
use super::{format_datetime, is_unique_violation, parse_datetime};

/// SQLite-backed implementation of `FormRepository`.
#[derive(Clone)]
pub struct SqliteFormRepository {
    pool: DatabasePool,
}

impl SqliteFormRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    async fn load_fields(&self, form_id: &str) -> Result<Vec<FormField>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM form_fields WHERE form_id = ? ORDER BY position ASC",
        )
        .bind(form_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(row_to_field).collect()
    }

    async fn hydrate(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Form, RepositoryError> {
        let form_row = FormRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
        let fields = self.load_fields(&form_row.id).await?;
        form_row.into_form(fields)
    }
}

struct FormRow {
    id: String,
    owner_id: String,
    title: String,
    description: String,
    theme: String,
    submit_message: String,
    redirect_url: Option<String>,
    published: bool,
    response_count: i64,
    created_at: String,
    updated_at: String,
}

impl FormRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            theme: row.try_get("theme")?,
            submit_message: row.try_get("submit_message")?,
            redirect_url: row.try_get("redirect_url")?,
            published: row.try_get("published")?,
            response_count: row.try_get("response_count")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_form(self, fields: Vec<FormField>) -> Result<Form, RepositoryError> {
        let id = self
            .id
            .parse::<FormId>()
            .map_err(|e| RepositoryError::Query(format!("invalid form id: {e}")))?;
        let owner_id = self
            .owner_id
            .parse::<UserId>()
            .map_err(|e| RepositoryError::Query(format!("invalid owner id: {e}")))?;
        let theme = self
            .theme
            .parse::<FormTheme>()
            .map_err(RepositoryError::Query)?;

        Ok(Form {
            id,
            owner_id,
            title: self.title,
            description: self.description,
            fields,
            theme,
            submit_message: self.submit_message,
            redirect_url: self.redirect_url,
            published: self.published,
            response_count: self.response_count,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn row_to_field(row: &sqlx::sqlite::SqliteRow) -> Result<FormField, RepositoryError> {
    let get_err = |e: sqlx::Error| RepositoryError::Query(e.to_string());

    let id: String = row.try_get("id").map_err(get_err)?;
    let field_type: String = row.try_get("field_type").map_err(get_err)?;
    let label: String = row.try_get("label").map_err(get_err)?;
    let placeholder: Option<String> = row.try_get("placeholder").map_err(get_err)?;
    let required: bool = row.try_get("required").map_err(get_err)?;
    let options_json: Option<String> = row.try_get("options").map_err(get_err)?;

    let options = options_json
        .map(|json| serde_json::from_str::<Vec<String>>(&json))
        .transpose()
        .map_err(|e| RepositoryError::Query(format!("invalid field options: {e}")))?;

    Ok(FormField {
        id: FieldId(id),
        field_type: field_type
            .parse::<FieldType>()
            .map_err(RepositoryError::Query)?,
        label,
        placeholder,
        required,
        options,
    })
}

async fn insert_fields(
    tx: &mut Transaction<'_, Sqlite>,
    form_id: &str,
    fields: &[FormField],
) -> Result<(), RepositoryError> {
    for (position, field) in fields.iter().enumerate() {
        let options_json = field
            .options
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query(
            "INSERT INTO form_fields (form_id, id, position, field_type, label, placeholder, required, options)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(form_id)
        .bind(field.id.as_str())
        .bind(position as i64)
        .bind(field.field_type.to_string())
        .bind(&field.label)
        .bind(&field.placeholder)
        .bind(field.required)
        .bind(options_json)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepositoryError::Conflict(format!("duplicate field id '{}'", field.id))
            } else {
                RepositoryError::Query(e.to_string())
            }
        })?;
    }

    Ok(())
}

impl FormRepository for SqliteFormRepository {
    async fn create(&self, form: &Form) -> Result<Form, RepositoryError> {
        let form_id = form.id.to_string();
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query(
            "INSERT INTO forms (id, owner_id, title, description, theme, submit_message, redirect_url, published, response_count, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&form_id)
        .bind(form.owner_id.to_string())
        .bind(&form.title)
        .bind(&form.description)
        .bind(form.theme.to_string())
        .bind(&form.submit_message)
        .bind(&form.redirect_url)
        .bind(form.published)
        .bind(form.response_count)
        .bind(format_datetime(&form.created_at))
        .bind(format_datetime(&form.updated_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepositoryError::Conflict(format!("form '{}' already exists", form.id))
            } else {
                RepositoryError::Query(e.to_string())
            }
        })?;

        insert_fields(&mut tx, &form_id, &form.fields).await?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(form.clone())
    }

    async fn get_by_id(&self, id: &FormId) -> Result<Option<Form>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM forms WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => Ok(Some(self.hydrate(&row).await?)),
            None => Ok(None),
        }
    }

    async fn list(&self, filter: FormFilter) -> Result<Vec<Form>, RepositoryError> {
        let mut sql = String::from("SELECT * FROM forms");
        let mut conditions: Vec<&str> = Vec::new();

        if filter.owner_id.is_some() {
            conditions.push("owner_id = ?");
        }
        if filter.published.is_some() {
            conditions.push("published = ?");
        }
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        let order = match filter.sort_order.unwrap_or_default() {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        sql.push_str(&format!(" ORDER BY updated_at {order}, id {order}"));

        // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded.
        match (filter.limit, filter.offset) {
            (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
            (None, None) => {}
        }

        let mut query = sqlx::query(&sql);
        if let Some(ref owner_id) = filter.owner_id {
            query = query.bind(owner_id.to_string());
        }
        if let Some(published) = filter.published {
            query = query.bind(published);
        }

        let rows = query
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut forms = Vec::with_capacity(rows.len());
        for row in &rows {
            forms.push(self.hydrate(row).await?);
        }

        Ok(forms)
    }

    async fn update(&self, form: &Form) -> Result<Form, RepositoryError> {
        let form_id = form.id.to_string();
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let result = sqlx::query(
            "UPDATE forms SET title = ?, description = ?, theme = ?, submit_message = ?, redirect_url = ?, published = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&form.title)
        .bind(&form.description)
        .bind(form.theme.to_string())
        .bind(&form.submit_message)
        .bind(&form.redirect_url)
        .bind(form.published)
        .bind(format_datetime(&form.updated_at))
        .bind(&form_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("DELETE FROM form_fields WHERE form_id = ?")
            .bind(&form_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        insert_fields(&mut tx, &form_id, &form.fields).await?;

        // The stored counter wins over whatever the caller carried.
        let response_count: i64 =
            sqlx::query_scalar("SELECT response_count FROM forms WHERE id = ?")
                .bind(&form_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(Form {
            response_count,
            ..form.clone()
        })
    }

    async fn delete(&self, id: &FormId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM forms WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
