//! Business logic and repository trait definitions for Formcraft.
//!
//! This crate defines the "ports" (repository, LLM provider and spreadsheet
//! sync traits) that the infrastructure layer implements, plus the pure
//! logic: field validation, heuristic form generation and CSV export.
//! It depends only on `formcraft-types` -- never on `formcraft-infra` or any
//! database/IO crate.

pub mod generator;
pub mod llm;
pub mod repository;
pub mod service;
pub mod validation;
