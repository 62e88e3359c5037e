//! HTTP request handlers for the REST API.

pub mod form;
pub mod generate;
pub mod response;
pub mod user;

use formcraft_types::error::{FormError, ResponseError};
use formcraft_types::form::FormId;
use formcraft_types::response::ResponseId;

use crate::http::error::AppError;

/// Parse a form id path segment. Malformed ids are reported as missing forms.
pub(crate) fn parse_form_id(raw: &str) -> Result<FormId, AppError> {
    raw.parse().map_err(|_| AppError::Form(FormError::NotFound))
}

pub(crate) fn parse_response_id(raw: &str) -> Result<ResponseId, AppError> {
    raw.parse()
        .map_err(|_| AppError::Response(ResponseError::ResponseNotFound))
}
