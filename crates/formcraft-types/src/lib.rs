//! Shared domain types for Formcraft.
//!
//! This crate contains the domain types used across the Formcraft service:
//! Form, Field, Response, User, generated drafts, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod error;
pub mod form;
pub mod generation;
pub mod llm;
pub mod response;
pub mod user;
