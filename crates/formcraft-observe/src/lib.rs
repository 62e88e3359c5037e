//! Observability setup for Formcraft: the tracing subscriber, optional
//! JSON output and an optional OpenTelemetry bridge.

pub mod tracing_setup;
