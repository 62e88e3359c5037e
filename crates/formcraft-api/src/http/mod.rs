//! HTTP/REST API layer for Formcraft.
//!
//! Axum-based REST API at `/api/v1/` with API key authentication for form
//! owners, open endpoints for respondents, and a JSON envelope on every
//! response.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
