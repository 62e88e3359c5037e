//! Business logic services (use cases).
//!
//! Services orchestrate repository calls and business rules. They depend on
//! traits (ports) -- never on concrete infrastructure implementations.

pub mod export;
pub mod form;
pub mod sheets;
pub mod submission;
pub mod user;

#[cfg(test)]
pub(crate) mod memory;
