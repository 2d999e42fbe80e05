//! Service composition
//!
//! Wires the concrete adapters and the resilience layer into a ready
//! [`PhoneLineService`]. The breaker and retry policy are constructed once
//! here and injected explicitly, so every caller of the returned service
//! shares the same breaker state.

use std::sync::Arc;

use lineforge_common::resilience::{CircuitBreaker, ConfigError, RetryPolicy};
use lineforge_core::provisioning::{
    PhoneLineRepository, PhoneLineService, ProvisioningApi, ResilientGateway,
};

use crate::config::Settings;
use crate::store::InMemoryPhoneLineRepository;
use crate::upstream::SimulatedProvisioningApi;

/// Compose a service from explicit adapters and validated settings.
///
/// # Errors
/// Returns `ConfigError::Invalid` when the settings fail validation.
pub fn wire(
    api: Arc<dyn ProvisioningApi>,
    repository: Arc<dyn PhoneLineRepository>,
    settings: &Settings,
) -> Result<PhoneLineService, ConfigError> {
    let retry = RetryPolicy::new(settings.retry_config()?)?;
    let breaker = CircuitBreaker::new(settings.breaker_config()?)?;
    let gateway =
        ResilientGateway::new(api, retry, breaker).with_attempt_timeout(settings.attempt_timeout());

    Ok(PhoneLineService::new(repository, gateway))
}

/// Compose a service backed by the simulated dependency and the in-memory
/// store, for local runs and end-to-end tests.
pub fn build_simulated_service(settings: &Settings) -> Result<PhoneLineService, ConfigError> {
    let api = SimulatedProvisioningApi::new().with_latency(settings.simulated_latency());
    let repository = InMemoryPhoneLineRepository::new();

    wire(Arc::new(api), Arc::new(repository), settings)
}
