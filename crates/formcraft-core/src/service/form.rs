//! Form management service.
//!
//! Owner-scoped create/read/update/delete plus publishing. Every write goes
//! through [`validate_definition`], so a stored form always has unique
//! field ids, labelled fields and options on every choice field.

use std::collections::HashSet;

use formcraft_types::error::{FormError, RepositoryError};
use formcraft_types::form::{
    CreateFormRequest, DEFAULT_SUBMIT_MESSAGE, DEFAULT_TITLE, FieldInput, Form, FormField, FormId,
    UpdateFormRequest,
};
use formcraft_types::user::UserId;

use crate::repository::form::{FormFilter, FormRepository};

/// Longest accepted form title, in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// Service orchestrating the form lifecycle for its owner.
pub struct FormService<F: FormRepository> {
    form_repo: F,
}

impl<F: FormRepository> FormService<F> {
    pub fn new(form_repo: F) -> Self {
        Self { form_repo }
    }

    /// Create a form owned by `owner_id`. Missing values get defaults.
    pub async fn create_form(
        &self,
        owner_id: &UserId,
        request: CreateFormRequest,
    ) -> Result<Form, FormError> {
        let now = chrono::Utc::now();
        let form = Form {
            id: FormId::new(),
            owner_id: owner_id.clone(),
            title: request
                .title
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            description: request.description.unwrap_or_default(),
            fields: normalize_fields(request.fields),
            theme: request.theme.unwrap_or_default(),
            submit_message: request
                .submit_message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SUBMIT_MESSAGE.to_string()),
            redirect_url: normalize_redirect(request.redirect_url),
            published: request.published.unwrap_or(false),
            response_count: 0,
            created_at: now,
            updated_at: now,
        };

        validate_definition(&form)?;

        let form = self
            .form_repo
            .create(&form)
            .await
            .map_err(|e| FormError::StorageError(e.to_string()))?;

        tracing::info!(form_id = %form.id, fields = form.fields.len(), "form created");
        Ok(form)
    }

    /// List the owner's forms. The owner in `filter` is always overridden.
    pub async fn list_forms(
        &self,
        owner_id: &UserId,
        filter: FormFilter,
    ) -> Result<Vec<Form>, FormError> {
        let filter = FormFilter {
            owner_id: Some(owner_id.clone()),
            ..filter
        };
        self.form_repo
            .list(filter)
            .await
            .map_err(|e| FormError::StorageError(e.to_string()))
    }

    /// Fetch a form, checking that `owner_id` owns it.
    pub async fn get_owned_form(&self, owner_id: &UserId, id: &FormId) -> Result<Form, FormError> {
        let form = self.load(id).await?;
        if !form.is_owned_by(owner_id) {
            return Err(FormError::AccessDenied);
        }
        Ok(form)
    }

    /// Fetch a form for respondents. Unpublished forms are reported as
    /// missing so their existence is not revealed.
    pub async fn get_public_form(&self, id: &FormId) -> Result<Form, FormError> {
        let form = self.load(id).await?;
        if !form.published {
            return Err(FormError::NotFound);
        }
        Ok(form)
    }

    /// Apply a partial update. A supplied field list replaces the whole
    /// ordered list.
    pub async fn update_form(
        &self,
        owner_id: &UserId,
        id: &FormId,
        request: UpdateFormRequest,
    ) -> Result<Form, FormError> {
        let mut form = self.get_owned_form(owner_id, id).await?;

        if let Some(title) = request.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(FormError::InvalidDefinition(
                    "title cannot be empty".to_string(),
                ));
            }
            form.title = title.to_string();
        }
        if let Some(description) = request.description {
            form.description = description;
        }
        if let Some(fields) = request.fields {
            form.fields = normalize_fields(fields);
        }
        if let Some(theme) = request.theme {
            form.theme = theme;
        }
        if let Some(message) = request.submit_message {
            form.submit_message = if message.trim().is_empty() {
                DEFAULT_SUBMIT_MESSAGE.to_string()
            } else {
                message
            };
        }
        if let Some(url) = request.redirect_url {
            form.redirect_url = normalize_redirect(Some(url));
        }
        if let Some(published) = request.published {
            form.published = published;
        }
        form.updated_at = chrono::Utc::now();

        validate_definition(&form)?;
        self.save(&form).await
    }

    /// Publish or unpublish a form.
    pub async fn set_published(
        &self,
        owner_id: &UserId,
        id: &FormId,
        published: bool,
    ) -> Result<Form, FormError> {
        let mut form = self.get_owned_form(owner_id, id).await?;
        if form.published == published {
            return Ok(form);
        }
        form.published = published;
        form.updated_at = chrono::Utc::now();
        let form = self.save(&form).await?;
        tracing::info!(form_id = %form.id, published, "form visibility changed");
        Ok(form)
    }

    /// Delete a form together with its fields and responses.
    pub async fn delete_form(&self, owner_id: &UserId, id: &FormId) -> Result<(), FormError> {
        self.get_owned_form(owner_id, id).await?;
        self.form_repo.delete(id).await.map_err(map_repo_error)?;
        tracing::info!(form_id = %id, "form deleted");
        Ok(())
    }

    async fn load(&self, id: &FormId) -> Result<Form, FormError> {
        self.form_repo
            .get_by_id(id)
            .await
            .map_err(|e| FormError::StorageError(e.to_string()))?
            .ok_or(FormError::NotFound)
    }

    async fn save(&self, form: &Form) -> Result<Form, FormError> {
        self.form_repo.update(form).await.map_err(map_repo_error)
    }
}

fn map_repo_error(e: RepositoryError) -> FormError {
    match e {
        RepositoryError::NotFound => FormError::NotFound,
        other => FormError::StorageError(other.to_string()),
    }
}

/// Check the structural rules every stored form satisfies.
pub fn validate_definition(form: &Form) -> Result<(), FormError> {
    let invalid = |msg: String| Err(FormError::InvalidDefinition(msg));

    if form.title.trim().is_empty() {
        return invalid("title cannot be empty".to_string());
    }
    if form.title.chars().count() > MAX_TITLE_CHARS {
        return invalid(format!("title exceeds {MAX_TITLE_CHARS} characters"));
    }

    let mut seen = HashSet::new();
    for (index, field) in form.fields.iter().enumerate() {
        let position = index + 1;
        if field.id.as_str().trim().is_empty() {
            return invalid(format!("field {position} has an empty id"));
        }
        if !seen.insert(&field.id) {
            return invalid(format!("duplicate field id '{}'", field.id));
        }
        if field.label.trim().is_empty() {
            return invalid(format!("field {position} has an empty label"));
        }
        if field.field_type.requires_options()
            && field.options.as_ref().is_none_or(|o| o.is_empty())
        {
            return invalid(format!(
                "{} field '{}' needs at least one option",
                field.field_type, field.label
            ));
        }
    }

    if let Some(url) = &form.redirect_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return invalid(format!("redirect URL must be http(s): '{url}'"));
        }
    }

    Ok(())
}

/// Materialize client fields: assign missing ids, trim labels, drop blank
/// options and strip options from non-choice fields.
fn normalize_fields(fields: Vec<FieldInput>) -> Vec<FormField> {
    fields
        .into_iter()
        .map(|input| {
            let mut field = input.into_field();
            field.label = field.label.trim().to_string();
            field.placeholder = field.placeholder.filter(|p| !p.trim().is_empty());
            field.options = if field.field_type.requires_options() {
                field.options.map(|options| {
                    options
                        .into_iter()
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
            } else {
                None
            };
            field
        })
        .collect()
}

fn normalize_redirect(url: Option<String>) -> Option<String> {
    url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())
}
