//! Submission and response management handlers.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use formcraft_core::repository::response::ResponseFilter;
use formcraft_types::form::FieldId;
use formcraft_types::response::{FieldValue, FormAnalytics, FormResponse, SubmissionReceipt};

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::extractors::client_info::Client;
use crate::http::extractors::query::ResponseListQuery;
use crate::http::handlers::{parse_form_id, parse_response_id};
use crate::http::response::{ApiResponse, RequestClock};
use crate::state::AppState;

/// POST /api/v1/forms/{id}/responses (and /api/v1/submit/{id}) - Public submission.
///
/// Accepts `{"data": {...}}` or a bare object of field values.
pub async fn submit_response(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Client(client): Client,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<ApiResponse<SubmissionReceipt>>), AppError> {
    let clock = RequestClock::start();
    let form_id = parse_form_id(&id)?;
    let values = submission_values(body)?;

    let receipt = state
        .submission_service
        .submit(&form_id, values, client)
        .await?;

    let link = format!("/api/v1/forms/{}/public", receipt.form_id);
    Ok((
        StatusCode::CREATED,
        Json(clock.respond(receipt).with_link("form", &link)),
    ))
}

/// Pull the field values out of a submission body. Null values count as
/// not answered.
fn submission_values(body: Value) -> Result<BTreeMap<FieldId, FieldValue>, AppError> {
    let object = match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Object(inner)) => inner,
            Some(other) => {
                map.insert("data".to_string(), other);
                map
            }
            None => map,
        },
        _ => {
            return Err(AppError::Validation(
                "Submission body must be a JSON object".to_string(),
            ));
        }
    };

    object
        .into_iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(key, v)| {
            let value = serde_json::from_value::<FieldValue>(v).map_err(|_| {
                AppError::Validation(format!("Unsupported value for field '{key}'"))
            })?;
            Ok((FieldId(key), value))
        })
        .collect()
}

/// GET /api/v1/forms/{id}/responses - Responses of an owned form, newest first.
pub async fn list_responses(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
    Query(query): Query<ResponseListQuery>,
) -> Result<Json<ApiResponse<Vec<FormResponse>>>, AppError> {
    let clock = RequestClock::start();
    let form_id = parse_form_id(&id)?;

    let filter = ResponseFilter {
        since: query.since,
        limit: query.limit,
        offset: query.offset,
    };
    let responses = state
        .submission_service
        .list_responses(&owner, &form_id, filter)
        .await?;

    let export = format!("/api/v1/forms/{form_id}/responses/export");
    Ok(Json(clock.respond(responses).with_link("export", &export)))
}

/// GET /api/v1/forms/{id}/responses/export - CSV download.
pub async fn export_responses(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let form_id = parse_form_id(&id)?;

    let export = state
        .submission_service
        .export_csv(&owner, &form_id)
        .await?;
    tracing::info!(form_id = %form_id, rows = export.row_count, "responses exported");

    let headers = [
        (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export.file_name),
        ),
    ];
    Ok((headers, export.content).into_response())
}

/// GET /api/v1/forms/{id}/analytics
pub async fn form_analytics(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FormAnalytics>>, AppError> {
    let clock = RequestClock::start();
    let form_id = parse_form_id(&id)?;

    let analytics = state.submission_service.analytics(&owner, &form_id).await?;
    Ok(Json(clock.respond(analytics)))
}

/// GET /api/v1/responses/{id}
pub async fn get_response(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FormResponse>>, AppError> {
    let clock = RequestClock::start();
    let response_id = parse_response_id(&id)?;

    let response = state
        .submission_service
        .get_response(&owner, &response_id)
        .await?;
    let form = format!("/api/v1/forms/{}", response.form_id);
    Ok(Json(clock.respond(response).with_link("form", &form)))
}

/// DELETE /api/v1/responses/{id}
pub async fn delete_response(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let clock = RequestClock::start();
    let response_id = parse_response_id(&id)?;

    state
        .submission_service
        .delete_response(&owner, &response_id)
        .await?;
    Ok(Json(clock.respond(
        json!({ "deleted": true, "id": response_id.to_string() }),
    )))
}
