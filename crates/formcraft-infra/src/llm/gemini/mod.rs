//! Google Gemini LLM provider implementation.
//!
//! [`GeminiProvider`] talks to the Generative Language REST API
//! (`models/{model}:generateContent`) and supports its JSON response mode.

pub mod client;
pub mod types;

pub use client::GeminiProvider;
