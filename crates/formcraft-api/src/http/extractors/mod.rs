//! Request extractors shared by the handlers.

pub mod auth;
pub mod client_info;
pub mod query;
