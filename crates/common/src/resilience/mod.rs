//! Resilience patterns for fault tolerance
//!
//! Generic, reusable building blocks for calling unreliable dependencies:
//! - **Circuit breaker**: stops invoking a failing dependency for a cooldown
//!   period, then cautiously probes recovery
//! - **Retry**: bounded attempts with exponential backoff and jitter
//!
//! Both are generic over the caller's error type and carry no domain
//! knowledge; classification of what is worth retrying is supplied by the
//! caller through the [`RetryClass`] trait. Timing-sensitive behavior runs
//! through the [`Clock`] abstraction so tests stay deterministic.

use thiserror::Error;

pub mod circuit_breaker;
pub mod clock;
pub mod retry;

/// Error raised when a resilience configuration fails validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

// Re-export circuit breaker types
pub use circuit_breaker::{
    BreakerError, BreakerResult, CircuitBreaker, CircuitBreakerConfig,
    CircuitBreakerConfigBuilder, CircuitBreakerStats, CircuitState,
};
// Re-export clock types
pub use clock::{Clock, MockClock, SystemClock};
// Re-export retry types
pub use retry::{
    RetryClass, RetryConfig, RetryConfigBuilder, RetryError, RetryPolicy, RetryResult,
};
