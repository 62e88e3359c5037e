//! Form CRUD and publishing handlers for the REST API.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde_json::json;

use formcraft_core::repository::form::FormFilter;
use formcraft_types::form::{CreateFormRequest, Form, UpdateFormRequest};

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::extractors::query::FormListQuery;
use crate::http::handlers::parse_form_id;
use crate::http::response::{ApiResponse, RequestClock};
use crate::state::AppState;

fn form_links(resp: ApiResponse<Form>, form: &Form) -> ApiResponse<Form> {
    let base = format!("/api/v1/forms/{}", form.id);
    resp.with_link("self", &base)
        .with_link("public", &format!("{base}/public"))
        .with_link("responses", &format!("{base}/responses"))
}

/// GET /api/v1/forms - List the caller's forms.
pub async fn list_forms(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Query(query): Query<FormListQuery>,
) -> Result<Json<ApiResponse<Vec<Form>>>, AppError> {
    let clock = RequestClock::start();

    let filter = FormFilter {
        owner_id: None,
        published: query.published,
        sort_order: Some(query.sort_order()),
        limit: query.limit,
        offset: query.offset,
    };
    let forms = state.form_service.list_forms(&owner, filter).await?;

    Ok(Json(clock.respond(forms).with_link("self", "/api/v1/forms")))
}

/// POST /api/v1/forms - Create a form.
pub async fn create_form(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Json(body): Json<CreateFormRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Form>>), AppError> {
    let clock = RequestClock::start();

    let form = state.form_service.create_form(&owner, body).await?;
    let resp = form_links(clock.respond(form.clone()), &form);

    Ok((StatusCode::CREATED, Json(resp)))
}

/// GET /api/v1/forms/{id} - Get one of the caller's forms.
pub async fn get_form(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Form>>, AppError> {
    let clock = RequestClock::start();
    let id = parse_form_id(&id)?;

    let form = state.form_service.get_owned_form(&owner, &id).await?;
    Ok(Json(form_links(clock.respond(form.clone()), &form)))
}

/// PUT /api/v1/forms/{id} - Update a form's settings and fields.
pub async fn update_form(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateFormRequest>,
) -> Result<Json<ApiResponse<Form>>, AppError> {
    let clock = RequestClock::start();
    let id = parse_form_id(&id)?;

    let form = state.form_service.update_form(&owner, &id, body).await?;
    Ok(Json(form_links(clock.respond(form.clone()), &form)))
}

/// DELETE /api/v1/forms/{id} - Delete a form and all of its responses.
pub async fn delete_form(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let clock = RequestClock::start();
    let id = parse_form_id(&id)?;

    state.form_service.delete_form(&owner, &id).await?;
    Ok(Json(clock.respond(json!({ "deleted": true, "id": id.to_string() }))))
}

/// POST /api/v1/forms/{id}/publish
pub async fn publish_form(
    state: State<AppState>,
    owner: AuthUser,
    id: Path<String>,
) -> Result<Json<ApiResponse<Form>>, AppError> {
    set_published(state, owner, id, true).await
}

/// POST /api/v1/forms/{id}/unpublish
pub async fn unpublish_form(
    state: State<AppState>,
    owner: AuthUser,
    id: Path<String>,
) -> Result<Json<ApiResponse<Form>>, AppError> {
    set_published(state, owner, id, false).await
}

async fn set_published(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
    published: bool,
) -> Result<Json<ApiResponse<Form>>, AppError> {
    let clock = RequestClock::start();
    let id = parse_form_id(&id)?;

    let form = state
        .form_service
        .set_published(&owner, &id, published)
        .await?;
    Ok(Json(form_links(clock.respond(form.clone()), &form)))
}

/// GET /api/v1/forms/{id}/public - Published form for respondents (no auth).
pub async fn get_public_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Form>>, AppError> {
    let clock = RequestClock::start();
    let id = parse_form_id(&id)?;

    let form = state.form_service.get_public_form(&id).await?;
    let submit = format!("/api/v1/forms/{}/responses", form.id);
    Ok(Json(clock.respond(form).with_link("submit", &submit)))
}
