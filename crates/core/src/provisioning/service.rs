//! Phone-line creation orchestration
//!
//! The service decides whether, when and how the remote provisioning call
//! runs: it deduplicates attempts by idempotency key, validates input before
//! any remote call, and records exactly one result per key. Failed attempts
//! persist nothing, so the key stays retryable.

use std::sync::Arc;

use dashmap::DashMap;
use lineforge_common::resilience::{CircuitBreakerStats, Clock, SystemClock};
use lineforge_domain::{AreaCode, DomainError, IdempotencyKey, PhoneLine, SubscriptionPlan};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::gateway::{GatewayError, ResilientGateway};
use super::ports::{PhoneLineRepository, ProvisioningRequest, StoreError, UpstreamError};

/// Business input for a creation attempt, before validation.
#[derive(Debug, Clone, Copy)]
pub struct NewPhoneLine {
    pub area_code: u32,
    pub plan_id: u32,
}

/// Failures surfaced by the provisioning service.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    /// Malformed business input. Never retried; raised before any remote
    /// call is attempted.
    #[error("validation failed")]
    Validation(#[from] DomainError),

    /// The remote dependency could not produce a result. Wraps the gateway
    /// failure so callers deciding on a fallback can still tell a rejected
    /// call (circuit open) from an exhausted retry sequence.
    #[error("upstream provisioning unavailable")]
    Unavailable(#[source] GatewayError),

    /// The idempotency-record store failed.
    #[error("storage failure")]
    Store(#[from] StoreError),
}

impl ProvisioningError {
    /// Whether the failure happened without the remote dependency being
    /// invoked at all.
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, Self::Unavailable(GatewayError::CircuitOpen))
    }
}

/// Idempotency-aware creation orchestrator.
///
/// Owns the read/write contract of the idempotency-record store. The
/// gateway (and the breaker inside it) is shared by all concurrent
/// invocations.
pub struct PhoneLineService<C: Clock = SystemClock> {
    repository: Arc<dyn PhoneLineRepository>,
    gateway: ResilientGateway<C>,
    // Serializes concurrent first-time creations per key so only one caller
    // performs the remote side effect; the others re-read its record.
    creation_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl<C: Clock> PhoneLineService<C> {
    /// Create the service from its collaborators.
    pub fn new(repository: Arc<dyn PhoneLineRepository>, gateway: ResilientGateway<C>) -> Self {
        Self { repository, gateway, creation_locks: DashMap::new() }
    }

    /// Create a phone line, or return the already-recorded result for the
    /// supplied idempotency key.
    ///
    /// When no key is supplied a fresh unique one is generated, so every
    /// creation attempt carries exactly one key. Validation completes before
    /// the resilience layer is entered; nothing is persisted for a failed
    /// attempt.
    #[instrument(skip(self, input, key), fields(area_code = input.area_code))]
    pub async fn create_phone_line(
        &self,
        input: NewPhoneLine,
        key: Option<IdempotencyKey>,
    ) -> Result<PhoneLine, ProvisioningError> {
        let key = key.unwrap_or_else(IdempotencyKey::generate);

        let key_lock = self.creation_lock(&key);
        let guard = key_lock.lock().await;
        let result = self.create_locked(input, &key).await;
        drop(guard);

        // Release the map entry on every exit path, but only when no other
        // caller still holds the lock: the map entry plus our clone account
        // for two references.
        self.creation_locks.remove_if(key.value(), |_, lock| Arc::strong_count(lock) <= 2);

        result
    }

    /// Creation body, called with the per-key lock held.
    async fn create_locked(
        &self,
        input: NewPhoneLine,
        key: &IdempotencyKey,
    ) -> Result<PhoneLine, ProvisioningError> {
        if let Some(existing) = self.repository.find_by_idempotency_key(key).await? {
            debug!(key = %key, "returning recorded result for idempotency key");
            return Ok(existing);
        }

        // Domain validation happens before any remote call
        let area_code = AreaCode::new(input.area_code)?;
        let plan = SubscriptionPlan::from_id(input.plan_id)?;

        let request = ProvisioningRequest {
            area_code,
            plan_id: plan.id,
            idempotency_key: key.clone(),
        };

        let provisioned = self.gateway.invoke(&request).await.map_err(|error| {
            warn!(key = %key, error = %error, "provisioning attempt failed, nothing recorded");
            ProvisioningError::Unavailable(error)
        })?;

        // The upstream answered; an invalid number is a malformed response,
        // not a caller validation failure.
        let line = PhoneLine::create(
            provisioned.phone_number.clone(),
            input.area_code,
            input.plan_id,
            key.clone(),
        )
        .map_err(|error| {
            ProvisioningError::Unavailable(GatewayError::Upstream {
                source: UpstreamError::MalformedResponse { detail: error.to_string() },
            })
        })?;

        self.repository.save(line.clone()).await?;
        info!(key = %key, number = %line.phone_number, "phone line created");

        Ok(line)
    }

    /// List phone lines, optionally filtered by a validated area code.
    pub async fn list_phone_lines(
        &self,
        area_code: Option<u32>,
    ) -> Result<Vec<PhoneLine>, ProvisioningError> {
        match area_code {
            Some(raw) => {
                let area_code = AreaCode::new(raw)?;
                Ok(self.repository.find_by_area_code(area_code).await?)
            }
            None => Ok(self.repository.find_all().await?),
        }
    }

    /// Fetch a phone line by id.
    pub async fn get_phone_line(&self, id: Uuid) -> Result<Option<PhoneLine>, ProvisioningError> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Diagnostic snapshot of the shared circuit breaker, for health checks.
    pub fn breaker_stats(&self) -> CircuitBreakerStats {
        self.gateway.stats()
    }

    /// Administrative reset of the shared circuit breaker.
    pub fn reset_breaker(&self) {
        self.gateway.reset_breaker();
    }

    /// Fetch or create the per-key creation lock without holding the map
    /// shard guard across an await point.
    fn creation_lock(&self, key: &IdempotencyKey) -> Arc<Mutex<()>> {
        let entry = self
            .creation_locks
            .entry(key.value().to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())));
        Arc::clone(entry.value())
    }

    /// Number of per-key creation locks currently held.
    ///
    /// Entries exist only while a creation for that key is in flight, so
    /// this stays near zero in steady state regardless of outcome.
    pub fn pending_creation_locks(&self) -> usize {
        self.creation_locks.len()
    }

    /// The subscription plan catalog offered to callers.
    pub fn available_plans(&self) -> Vec<SubscriptionPlan> {
        SubscriptionPlan::all()
    }
}
