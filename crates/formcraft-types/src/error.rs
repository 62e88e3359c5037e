use thiserror::Error;

use crate::response::FieldError;

/// Errors related to form management.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("form not found")]
    NotFound,

    /// The caller does not own the form.
    #[error("access to form denied")]
    AccessDenied,

    #[error("invalid form definition: {0}")]
    InvalidDefinition(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors related to submissions and stored responses.
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("form not found")]
    FormNotFound,

    #[error("response not found")]
    ResponseNotFound,

    #[error("access to responses denied")]
    AccessDenied,

    #[error("Form is not published")]
    NotPublished,

    /// One entry per offending field, in form order.
    #[error("submission failed validation ({} field error(s))", .0.len())]
    Validation(Vec<FieldError>),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors from turning a prompt into a form draft.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("prompt is required")]
    EmptyPrompt,

    #[error("generation provider error: {0}")]
    Provider(String),

    #[error("could not parse generated form: {0}")]
    Parse(String),

    #[error("generated form is invalid: {0}")]
    InvalidDraft(String),
}

/// Errors related to user records.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("user not found")]
    NotFound,

    #[error("invalid user: {0}")]
    Invalid(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors from repository operations (used by trait definitions in formcraft-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}
