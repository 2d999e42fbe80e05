//! Runtime configuration
//!
//! Settings for the resilience layer and the upstream dependency, loaded
//! from `LINEFORGE_*` environment variables with sensible defaults. Every
//! knob maps onto one field of the retry or breaker configuration.

pub mod loader;

use std::time::Duration;

use lineforge_common::resilience::{CircuitBreakerConfig, ConfigError, RetryConfig};

pub use loader::load;

/// Retry policy settings.
#[derive(Debug, Clone)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_factor: f64,
    pub jitter: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 10_000,
            backoff_factor: 2.0,
            jitter: true,
        }
    }
}

/// Circuit breaker settings.
#[derive(Debug, Clone)]
pub struct BreakerSettings {
    pub failure_threshold: u32,
    pub recovery_timeout_ms: u64,
    pub required_half_open_successes: u32,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout_ms: 60_000,
            required_half_open_successes: 3,
        }
    }
}

/// Upstream dependency settings.
#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    /// Budget for a single remote attempt.
    pub attempt_timeout_ms: u64,
    /// Artificial latency of the simulated dependency.
    pub simulated_latency_ms: u64,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self { attempt_timeout_ms: 30_000, simulated_latency_ms: 500 }
    }
}

/// Complete runtime settings.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub retry: RetrySettings,
    pub breaker: BreakerSettings,
    pub upstream: UpstreamSettings,
}

impl Settings {
    /// Build the validated retry configuration.
    pub fn retry_config(&self) -> Result<RetryConfig, ConfigError> {
        RetryConfig::builder()
            .max_retries(self.retry.max_retries)
            .base_delay(Duration::from_millis(self.retry.base_delay_ms))
            .max_delay(Duration::from_millis(self.retry.max_delay_ms))
            .backoff_factor(self.retry.backoff_factor)
            .jitter(self.retry.jitter)
            .build()
    }

    /// Build the validated circuit breaker configuration.
    pub fn breaker_config(&self) -> Result<CircuitBreakerConfig, ConfigError> {
        CircuitBreakerConfig::builder()
            .failure_threshold(self.breaker.failure_threshold)
            .recovery_timeout(Duration::from_millis(self.breaker.recovery_timeout_ms))
            .required_half_open_successes(self.breaker.required_half_open_successes)
            .build()
    }

    /// The per-attempt timeout for remote calls.
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream.attempt_timeout_ms)
    }

    /// The artificial latency of the simulated dependency.
    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.upstream.simulated_latency_ms)
    }
}
