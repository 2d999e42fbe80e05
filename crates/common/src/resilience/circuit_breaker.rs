//! Circuit breaker for protecting an unreliable dependency
//!
//! Tracks consecutive failures of a protected operation and short-circuits
//! calls entirely once a threshold is reached, then cautiously probes
//! recovery after a cooldown. One breaker instance is shared by every
//! in-flight call through the same dependency; all mutable state sits behind
//! a single mutex so concurrent outcomes cannot corrupt the counters.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::clock::{Clock, SystemClock};
use super::ConfigError;

/// Circuit breaker states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Circuit is closed, allowing requests.
    Closed,
    /// Circuit is open, rejecting requests.
    Open,
    /// Circuit is half-open, probing recovery.
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "CLOSED"),
            CircuitState::Open => write!(f, "OPEN"),
            CircuitState::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

/// Errors produced by a breaker-guarded execution.
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    /// Call rejected without invoking the operation: the circuit is open
    /// and the recovery timeout has not elapsed.
    #[error("circuit breaker is open, rejecting calls")]
    Open,

    /// The operation was attempted and failed.
    #[error("operation failed behind circuit breaker")]
    Operation {
        /// The underlying operation failure.
        source: E,
    },
}

impl<E> BreakerError<E> {
    /// Whether this call never reached the protected operation.
    pub fn is_short_circuit(&self) -> bool {
        matches!(self, Self::Open)
    }
}

/// Result type for breaker-guarded operations.
pub type BreakerResult<T, E> = Result<T, BreakerError<E>>;

/// Configuration for circuit breaker behavior.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before opening the circuit. Must be at least 1.
    pub failure_threshold: u32,
    /// Cooldown before an open circuit admits a probe call.
    pub recovery_timeout: Duration,
    /// Consecutive half-open successes required to close the circuit.
    pub required_half_open_successes: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(60),
            required_half_open_successes: 3,
        }
    }
}

impl CircuitBreakerConfig {
    /// Create a configuration builder.
    pub fn builder() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.failure_threshold == 0 {
            return Err(ConfigError::Invalid {
                message: "failure_threshold must be greater than 0".to_string(),
            });
        }

        if self.required_half_open_successes == 0 {
            return Err(ConfigError::Invalid {
                message: "required_half_open_successes must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Builder for [`CircuitBreakerConfig`].
#[derive(Debug)]
pub struct CircuitBreakerConfigBuilder {
    config: CircuitBreakerConfig,
}

impl Default for CircuitBreakerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CircuitBreakerConfigBuilder {
    pub fn new() -> Self {
        Self { config: CircuitBreakerConfig::default() }
    }

    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.config.failure_threshold = threshold;
        self
    }

    pub fn recovery_timeout(mut self, timeout: Duration) -> Self {
        self.config.recovery_timeout = timeout;
        self
    }

    pub fn required_half_open_successes(mut self, successes: u32) -> Self {
        self.config.required_half_open_successes = successes;
        self
    }

    pub fn build(self) -> Result<CircuitBreakerConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Read-only diagnostic snapshot of a circuit breaker.
///
/// `total_requests` counts every call evaluated by the breaker;
/// `rejected_requests` counts the subset short-circuited while open, so
/// executed calls are `total_requests - rejected_requests`.
#[derive(Debug, Clone)]
pub struct CircuitBreakerStats {
    pub state: CircuitState,
    pub failure_count: u32,
    pub half_open_successes: u32,
    pub total_requests: u64,
    pub rejected_requests: u64,
    pub last_failure_at: Option<Instant>,
}

/// Mutable breaker state, guarded as a unit.
#[derive(Debug)]
struct Inner {
    state: CircuitState,
    failure_count: u32,
    half_open_successes: u32,
    total_requests: u64,
    rejected_requests: u64,
    last_failure_at: Option<Instant>,
}

impl Inner {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            half_open_successes: 0,
            total_requests: 0,
            rejected_requests: 0,
            last_failure_at: None,
        }
    }
}

/// Failure-rate state machine guarding a protected dependency.
///
/// Cheap to clone: clones share the same state, so the breaker can be handed
/// to every call site of one dependency. Construct one breaker per protected
/// external capability and inject it explicitly rather than looking it up
/// through a global.
pub struct CircuitBreaker<C: Clock = SystemClock> {
    config: CircuitBreakerConfig,
    inner: Arc<Mutex<Inner>>,
    clock: Arc<C>,
}

impl<C: Clock> fmt::Debug for CircuitBreaker<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("CircuitBreaker")
            .field("config", &self.config)
            .field("state", &inner.state)
            .field("failure_count", &inner.failure_count)
            .finish()
    }
}

impl<C: Clock> Clone for CircuitBreaker<C> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            inner: Arc::clone(&self.inner),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl CircuitBreaker<SystemClock> {
    /// Create a new circuit breaker using the system clock.
    pub fn new(config: CircuitBreakerConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, SystemClock)
    }

    /// Create a circuit breaker with the default configuration.
    pub fn with_defaults() -> Self {
        Self { config: CircuitBreakerConfig::default(), inner: Arc::new(Mutex::new(Inner::new())), clock: Arc::new(SystemClock) }
    }
}

impl<C: Clock> CircuitBreaker<C> {
    /// Create a new circuit breaker with a custom clock (useful for testing).
    pub fn with_clock(config: CircuitBreakerConfig, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, inner: Arc::new(Mutex::new(Inner::new())), clock: Arc::new(clock) })
    }

    /// Execute an operation with circuit breaker protection.
    ///
    /// While open and inside the recovery timeout the operation is never
    /// invoked; the call fails fast with [`BreakerError::Open`]. Once the
    /// timeout elapses the next call transitions the breaker to half-open
    /// and probes the dependency. Every concurrent caller past the timeout
    /// is admitted as a probe; the shared counters then re-close or re-open
    /// the circuit based on the probe outcomes.
    #[instrument(skip(self, operation), fields(state = %self.state()))]
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> BreakerResult<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Debug,
    {
        self.admit()?;

        match operation().await {
            Ok(result) => {
                self.on_success();
                debug!("circuit breaker: operation succeeded");
                Ok(result)
            }
            Err(error) => {
                self.on_failure();
                warn!(error = ?error, "circuit breaker: operation failed");
                Err(BreakerError::Operation { source: error })
            }
        }
    }

    /// Gate a call, transitioning open → half-open when the cooldown has
    /// elapsed. Rejections are recorded so monitoring can tell short-circuited
    /// calls from executed ones.
    fn admit<E>(&self) -> Result<(), BreakerError<E>> {
        let mut inner = self.inner.lock();
        inner.total_requests += 1;

        if inner.state != CircuitState::Open {
            return Ok(());
        }

        let cooled_down = inner
            .last_failure_at
            .map(|at| self.clock.now().duration_since(at) >= self.config.recovery_timeout)
            .unwrap_or(true);

        if cooled_down {
            inner.state = CircuitState::HalfOpen;
            inner.half_open_successes = 0;
            info!("circuit breaker half-open, probing recovery");
            Ok(())
        } else {
            inner.rejected_requests += 1;
            debug!("circuit breaker open, rejecting call");
            Err(BreakerError::Open)
        }
    }

    /// Record a successful operation outcome.
    fn on_success(&self) {
        let mut inner = self.inner.lock();
        inner.failure_count = 0;

        if inner.state == CircuitState::HalfOpen {
            inner.half_open_successes += 1;
            if inner.half_open_successes >= self.config.required_half_open_successes {
                inner.state = CircuitState::Closed;
                info!(
                    successes = inner.half_open_successes,
                    "circuit breaker closed after successful probes"
                );
            }
        }
    }

    /// Record a failed operation outcome.
    fn on_failure(&self) {
        let mut inner = self.inner.lock();
        inner.failure_count += 1;
        inner.last_failure_at = Some(self.clock.now());

        if inner.state == CircuitState::HalfOpen {
            inner.state = CircuitState::Open;
            warn!("circuit breaker reopened after failed probe");
        } else if inner.state == CircuitState::Closed
            && inner.failure_count >= self.config.failure_threshold
        {
            inner.state = CircuitState::Open;
            warn!(failures = inner.failure_count, "circuit breaker opened at failure threshold");
        }
    }

    /// Get the current state of the circuit breaker.
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    /// Get a read-only stats snapshot for health checks and monitoring.
    pub fn stats(&self) -> CircuitBreakerStats {
        let inner = self.inner.lock();
        CircuitBreakerStats {
            state: inner.state,
            failure_count: inner.failure_count,
            half_open_successes: inner.half_open_successes,
            total_requests: inner.total_requests,
            rejected_requests: inner.rejected_requests,
            last_failure_at: inner.last_failure_at,
        }
    }

    /// Force the breaker back to closed with all counters zeroed.
    ///
    /// Administrative operation, not part of normal call handling.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        *inner = Inner::new();
        info!("circuit breaker manually reset to closed state");
    }

    /// Access the active configuration.
    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }
}

impl Default for CircuitBreaker<SystemClock> {
    fn default() -> Self {
        Self::with_defaults()
    }
}
