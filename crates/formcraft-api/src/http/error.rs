//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use formcraft_types::error::{FormError, GenerationError, ResponseError, UserError};

use crate::http::response::{ApiErrorDetail, ApiResponse};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Form(FormError),
    Response(ResponseError),
    Generation(GenerationError),
    User(UserError),
    /// Missing or unknown API key.
    Unauthorized(String),
    /// Malformed input rejected before reaching a service.
    Validation(String),
    Internal(String),
}

impl From<FormError> for AppError {
    fn from(e: FormError) -> Self {
        AppError::Form(e)
    }
}

impl From<ResponseError> for AppError {
    fn from(e: ResponseError) -> Self {
        AppError::Response(e)
    }
}

impl From<GenerationError> for AppError {
    fn from(e: GenerationError) -> Self {
        AppError::Generation(e)
    }
}

impl From<UserError> for AppError {
    fn from(e: UserError) -> Self {
        AppError::User(e)
    }
}

impl AppError {
    /// Status code plus the envelope error entries for this error.
    fn status_and_errors(&self) -> (StatusCode, Vec<ApiErrorDetail>) {
        let single = |status: StatusCode, code: &str, message: String| {
            (status, vec![ApiErrorDetail::new(code, message)])
        };

        match self {
            AppError::Form(FormError::NotFound)
            | AppError::Response(ResponseError::FormNotFound) => {
                single(StatusCode::NOT_FOUND, "FORM_NOT_FOUND", "Form not found".to_string())
            }
            AppError::Form(FormError::AccessDenied)
            | AppError::Response(ResponseError::AccessDenied) => {
                single(
                    StatusCode::FORBIDDEN,
                    "FORBIDDEN",
                    "You do not own this form".to_string(),
                )
            }
            AppError::Form(FormError::InvalidDefinition(msg)) => {
                single(StatusCode::BAD_REQUEST, "INVALID_FORM", msg.clone())
            }
            AppError::Response(ResponseError::ResponseNotFound) => single(
                StatusCode::NOT_FOUND,
                "RESPONSE_NOT_FOUND",
                "Response not found".to_string(),
            ),
            AppError::Response(ResponseError::NotPublished) => single(
                StatusCode::BAD_REQUEST,
                "FORM_NOT_PUBLISHED",
                ResponseError::NotPublished.to_string(),
            ),
            AppError::Response(ResponseError::Validation(field_errors)) => {
                let errors: Vec<ApiErrorDetail> = field_errors
                    .iter()
                    .map(|fe| ApiErrorDetail {
                        code: "FIELD_INVALID".to_string(),
                        message: fe.message.clone(),
                        details: Some(json!({
                            "field_id": fe.field_id,
                            "label": fe.label,
                        })),
                    })
                    .collect();
                (StatusCode::BAD_REQUEST, errors)
            }
            AppError::Generation(GenerationError::EmptyPrompt) => single(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Prompt is required".to_string(),
            ),
            AppError::Generation(e @ GenerationError::Provider(_)) => {
                single(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "GENERATION_PROVIDER_ERROR",
                    e.to_string(),
                )
            }
            AppError::Generation(e) => {
                single(StatusCode::INTERNAL_SERVER_ERROR, "GENERATION_FAILED", e.to_string())
            }
            AppError::User(UserError::NotFound) => {
                single(StatusCode::NOT_FOUND, "USER_NOT_FOUND", "User not found".to_string())
            }
            AppError::User(UserError::Invalid(msg)) => {
                single(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Form(FormError::StorageError(msg))
            | AppError::Response(ResponseError::StorageError(msg))
            | AppError::User(UserError::StorageError(msg)) => {
                tracing::error!("storage failure: {msg}");
                single(StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", msg.clone())
            }
            AppError::Unauthorized(msg) => {
                single(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
            }
            AppError::Validation(msg) => {
                single(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                single(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, errors) = self.status_and_errors();
        let envelope = ApiResponse::errors(errors, uuid::Uuid::now_v7().to_string(), 0);

        let body = serde_json::to_string(&envelope).unwrap_or_else(|_| {
            r#"{"errors":[{"code":"SERIALIZATION_ERROR","message":"Failed to serialize response"}]}"#.to_string()
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}
