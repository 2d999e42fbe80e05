//! Bounded retry with exponential backoff and jitter
//!
//! Wraps a single fallible async operation with a fixed retry budget. Delays
//! grow exponentially up to a cap, with optional random perturbation to avoid
//! synchronized retry storms against a recovering dependency.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use super::ConfigError;

/// Errors produced by a retry execution.
///
/// Generic over the wrapped operation's error type `E` so the original
/// failure is preserved for the caller.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every allowed attempt failed with a retryable error.
    #[error("all {attempts} attempts exhausted")]
    Exhausted {
        /// Total attempts made, including the first.
        attempts: u32,
        /// The failure from the final attempt.
        source: E,
    },

    /// The operation failed with an error that must not be retried.
    #[error("operation failed with non-retryable error")]
    NonRetryable {
        /// The failure from the single attempt made.
        source: E,
    },
}

impl<E> RetryError<E> {
    /// Borrow the underlying operation error.
    pub fn source_error(&self) -> &E {
        match self {
            Self::Exhausted { source, .. } | Self::NonRetryable { source } => source,
        }
    }

    /// Consume the error and return the underlying operation error.
    pub fn into_source(self) -> E {
        match self {
            Self::Exhausted { source, .. } | Self::NonRetryable { source } => source,
        }
    }
}

/// Result type for retry operations.
pub type RetryResult<T, E> = Result<T, RetryError<E>>;

/// Classification of an error as transient or permanent.
///
/// Implemented by the error type of the protected operation. Transient
/// network conditions (connection reset/refused, timeout, DNS failure),
/// upstream 5xx responses and 429 rate limiting are retryable; everything
/// else is surfaced after a single attempt.
pub trait RetryClass {
    /// Whether a retry is likely to succeed.
    fn is_retryable(&self) -> bool;
}

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Multiplier applied per attempt. Must be greater than 1.
    pub backoff_factor: f64,
    /// Whether to perturb each delay by up to ±25%.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
            backoff_factor: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a configuration builder.
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backoff_factor <= 1.0 {
            return Err(ConfigError::Invalid {
                message: "backoff_factor must be greater than 1".to_string(),
            });
        }

        if self.max_delay < self.base_delay {
            return Err(ConfigError::Invalid {
                message: "max_delay must not be smaller than base_delay".to_string(),
            });
        }

        Ok(())
    }
}

/// Builder for [`RetryConfig`] with fluent API.
#[derive(Debug)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl Default for RetryConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryConfigBuilder {
    pub fn new() -> Self {
        Self { config: RetryConfig::default() }
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.config.base_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.config.max_delay = delay;
        self
    }

    pub fn backoff_factor(mut self, factor: f64) -> Self {
        self.config.backoff_factor = factor;
        self
    }

    pub fn jitter(mut self, enabled: bool) -> Self {
        self.config.jitter = enabled;
        self
    }

    pub fn no_jitter(mut self) -> Self {
        self.config.jitter = false;
        self
    }

    pub fn build(self) -> Result<RetryConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Retry executor for a single protected operation.
///
/// Stateless across calls: all fields are fixed at construction and every
/// `execute` invocation is independent, so one policy value can safely be
/// shared by concurrent call chains.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Create a retry policy from a validated configuration.
    pub fn new(config: RetryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create a retry policy with the default configuration.
    pub fn with_defaults() -> Self {
        Self { config: RetryConfig::default() }
    }

    /// Access the active configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Execute an operation, retrying transient failures with backoff.
    ///
    /// Up to `max_retries + 1` total attempts are made. A success at any
    /// attempt returns immediately. A non-retryable failure is propagated
    /// without consuming the remaining budget. Backoff sleeps are plain
    /// awaits, so dropping the returned future cancels any pending retry.
    #[instrument(skip(self, operation), fields(max_retries = self.config.max_retries))]
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> RetryResult<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: RetryClass + fmt::Debug,
    {
        let mut attempt: u32 = 0;

        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(attempt = attempt + 1, "operation succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) => {
                    if attempt >= self.config.max_retries {
                        warn!(
                            attempts = attempt + 1,
                            error = ?error,
                            "all retry attempts exhausted"
                        );
                        return Err(RetryError::Exhausted { attempts: attempt + 1, source: error });
                    }

                    if !error.is_retryable() {
                        debug!(error = ?error, "non-retryable error, giving up");
                        return Err(RetryError::NonRetryable { source: error });
                    }

                    let delay = self.delay_for(attempt);
                    warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = ?error,
                        "attempt failed, retrying after backoff"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Compute the backoff delay for a 0-indexed attempt.
    ///
    /// `min(base_delay * backoff_factor^attempt, max_delay)`, then a uniform
    /// ±25% perturbation when jitter is enabled, floored at zero.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let raw = self.config.base_delay.as_secs_f64() * self.config.backoff_factor.powi(exponent);
        let capped = raw.min(self.config.max_delay.as_secs_f64());

        let jittered = if self.config.jitter {
            capped * rand::thread_rng().gen_range(0.75..=1.25)
        } else {
            capped
        };

        Duration::from_secs_f64(jittered.max(0.0))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::with_defaults()
    }
}
