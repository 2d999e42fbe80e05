//! Resilient gateway around the provisioning dependency
//!
//! Composes the circuit breaker and retry policy around the abstract remote
//! call: `breaker.execute(|| retry.execute(|| remote_call(request)))`. The
//! ordering is significant: the breaker judges the aggregate outcome of a
//! full retry sequence as a single success or failure, so transient blips
//! absorbed by retries never open the circuit, while a persistently failing
//! dependency still does.

use std::sync::Arc;
use std::time::Duration;

use lineforge_common::resilience::{
    BreakerError, CircuitBreaker, CircuitBreakerStats, Clock, RetryError, RetryPolicy, SystemClock,
};
use thiserror::Error;
use tracing::instrument;

use super::ports::{ProvisionedNumber, ProvisioningApi, ProvisioningRequest, UpstreamError};

/// Default per-attempt budget for a remote call.
const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure surfaced by a gateway invocation.
///
/// Callers can distinguish "not attempted, circuit open" from "attempted and
/// failed"; the underlying [`UpstreamError`] is preserved for diagnostics.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Rejected without attempting the remote dependency: the breaker is
    /// open and its recovery timeout has not elapsed.
    #[error("provisioning dependency not attempted: circuit open")]
    CircuitOpen,

    /// Every allowed attempt failed with a transient error.
    #[error("provisioning failed after {attempts} attempts")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: UpstreamError,
    },

    /// A single attempt failed with a non-retryable error, including
    /// malformed upstream responses.
    #[error("provisioning attempt failed")]
    Upstream {
        #[source]
        source: UpstreamError,
    },
}

impl GatewayError {
    /// Whether the remote dependency was actually invoked.
    pub fn was_attempted(&self) -> bool {
        !matches!(self, Self::CircuitOpen)
    }

    /// The underlying upstream failure, when one exists.
    pub fn upstream(&self) -> Option<&UpstreamError> {
        match self {
            Self::CircuitOpen => None,
            Self::RetriesExhausted { source, .. } | Self::Upstream { source } => Some(source),
        }
    }
}

/// Single entry point composing breaker, retry and the remote call.
///
/// One gateway (and therefore one breaker) exists per protected dependency
/// and is shared by every concurrent invocation; the handle is injected
/// explicitly rather than resolved through a global.
pub struct ResilientGateway<C: Clock = SystemClock> {
    api: Arc<dyn ProvisioningApi>,
    retry: RetryPolicy,
    breaker: CircuitBreaker<C>,
    attempt_timeout: Duration,
}

impl<C: Clock> ResilientGateway<C> {
    /// Compose a gateway from its parts.
    pub fn new(api: Arc<dyn ProvisioningApi>, retry: RetryPolicy, breaker: CircuitBreaker<C>) -> Self {
        Self { api, retry, breaker, attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT }
    }

    /// Override the per-attempt timeout applied to each remote call.
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Invoke the provisioning dependency with full resilience protection.
    ///
    /// A request that ultimately succeeds after retries counts as one
    /// success for the breaker; a request that exhausts all retries counts
    /// as exactly one failure.
    #[instrument(skip(self, request), fields(key = %request.idempotency_key))]
    pub async fn invoke(
        &self,
        request: &ProvisioningRequest,
    ) -> Result<ProvisionedNumber, GatewayError> {
        let outcome = self.breaker.execute(|| self.attempt_with_retry(request)).await;

        match outcome {
            Ok(number) => Ok(number),
            Err(BreakerError::Open) => Err(GatewayError::CircuitOpen),
            Err(BreakerError::Operation { source }) => match source {
                RetryError::Exhausted { attempts, source } => {
                    Err(GatewayError::RetriesExhausted { attempts, source })
                }
                RetryError::NonRetryable { source } => Err(GatewayError::Upstream { source }),
            },
        }
    }

    /// Run the remote call under the retry policy, bounding each attempt
    /// with its own timeout. Expiry surfaces as a retryable transient
    /// failure.
    async fn attempt_with_retry(
        &self,
        request: &ProvisioningRequest,
    ) -> Result<ProvisionedNumber, RetryError<UpstreamError>> {
        self.retry
            .execute(|| async {
                match tokio::time::timeout(
                    self.attempt_timeout,
                    self.api.create_phone_number(request),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => Err(UpstreamError::Timeout { after: self.attempt_timeout }),
                }
            })
            .await
    }

    /// Read-only diagnostic snapshot of the shared breaker.
    pub fn stats(&self) -> CircuitBreakerStats {
        self.breaker.stats()
    }

    /// Administrative reset of the shared breaker.
    pub fn reset_breaker(&self) {
        self.breaker.reset();
    }
}
