//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`; `/health` sits at the root as well.
//! Middleware: CORS, request tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Form CRUD (owner)
        .route(
            "/forms",
            get(handlers::form::list_forms).post(handlers::form::create_form),
        )
        .route("/forms/generate", post(handlers::generate::generate_form))
        .route(
            "/forms/{id}",
            get(handlers::form::get_form)
                .put(handlers::form::update_form)
                .delete(handlers::form::delete_form),
        )
        .route("/forms/{id}/publish", post(handlers::form::publish_form))
        .route("/forms/{id}/unpublish", post(handlers::form::unpublish_form))
        // Respondent-facing (no auth)
        .route("/forms/{id}/public", get(handlers::form::get_public_form))
        .route(
            "/forms/{id}/responses",
            get(handlers::response::list_responses).post(handlers::response::submit_response),
        )
        .route("/submit/{id}", post(handlers::response::submit_response))
        // Responses (owner)
        .route(
            "/forms/{id}/responses/export",
            get(handlers::response::export_responses),
        )
        .route("/forms/{id}/analytics", get(handlers::response::form_analytics))
        .route(
            "/responses/{id}",
            get(handlers::response::get_response).delete(handlers::response::delete_response),
        )
        // Users
        .route("/users/sync", post(handlers::user::sync_user))
        .route("/health", get(health_check));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
