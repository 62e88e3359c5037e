//! User profile handlers.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use formcraft_types::user::{SyncUserRequest, User};

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::response::{ApiResponse, RequestClock};
use crate::state::AppState;

/// Profile fields pushed by the identity provider integration.
#[derive(Debug, Deserialize)]
pub struct SyncProfileRequest {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// POST /api/v1/users/sync - Upsert the caller's email and name.
pub async fn sync_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<SyncProfileRequest>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let clock = RequestClock::start();

    let current = state.user_service.get_user(&user_id).await?;
    let user = state
        .user_service
        .sync_user(SyncUserRequest {
            external_id: current.external_id,
            email: body.email,
            name: body.name,
        })
        .await?;

    Ok(Json(clock.respond(user)))
}
