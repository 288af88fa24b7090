//! Fault tolerance and observability for the pipeline.

pub mod circuit_breaker;
pub mod metrics;

pub use circuit_breaker::{CircuitBreaker, CircuitState};
