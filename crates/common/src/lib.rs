//! Shared utilities for Lineforge crates.
//!
//! Currently this crate carries the resilience toolkit protecting calls to
//! external dependencies: circuit breaker, retry with backoff, and the clock
//! abstraction both rely on for deterministic testing.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod resilience;

// Re-export commonly used types for convenience
pub use resilience::{
    BreakerError, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerStats, CircuitState, Clock,
    ConfigError, MockClock, RetryClass, RetryConfig, RetryError, RetryPolicy, SystemClock,
};
