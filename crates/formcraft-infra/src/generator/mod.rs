//! Form generators that need infrastructure: the model-backed strategy and
//! the configuration-driven selection between it and the heuristic.

pub mod configured;
pub mod llm_generator;

pub use configured::ConfiguredGenerator;
pub use llm_generator::LlmFormGenerator;
