//! Prompt-to-form generation handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use formcraft_core::generator::FormGenerator;
use formcraft_types::form::Form;
use formcraft_types::generation::{GenerationMetadata, GenerationStrategy};

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::response::{ApiResponse, RequestClock};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateFormRequest {
    pub prompt: String,
}

/// A persisted generated form plus the generator's notes.
#[derive(Debug, Serialize)]
pub struct GeneratedFormView {
    pub form: Form,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<GenerationMetadata>,
    pub strategy: GenerationStrategy,
}

/// POST /api/v1/forms/generate - Generate a draft from a prompt and save it.
///
/// The saved form starts unpublished regardless of the draft.
pub async fn generate_form(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Json(body): Json<GenerateFormRequest>,
) -> Result<(StatusCode, Json<ApiResponse<GeneratedFormView>>), AppError> {
    let clock = RequestClock::start();

    let mut draft = state.generator.generate(&body.prompt).await?;
    draft.form.published = Some(false);

    let form = state.form_service.create_form(&owner, draft.form).await?;
    tracing::info!(
        form_id = %form.id,
        strategy = %draft.strategy,
        fields = form.fields.len(),
        "generated form saved"
    );

    let self_link = format!("/api/v1/forms/{}", form.id);
    let view = GeneratedFormView {
        form,
        metadata: draft.metadata,
        strategy: draft.strategy,
    };

    Ok((
        StatusCode::CREATED,
        Json(clock.respond(view).with_link("form", &self_link)),
    ))
}
