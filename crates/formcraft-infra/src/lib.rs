//! Infrastructure layer for Formcraft.
//!
//! Contains implementations of the ports defined in `formcraft-core`:
//! SQLite storage, the Gemini and Anthropic LLM providers, the model-backed
//! form generator, the spreadsheet webhook, and the `config.toml` loader.

pub mod config;
pub mod generator;
pub mod llm;
pub mod sheets;
pub mod sqlite;
