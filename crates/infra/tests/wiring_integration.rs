//! End-to-end tests of the composed service
//!
//! Exercises the full wiring (simulated dependency, in-memory store,
//! breaker and retry) through the public composition helpers.

use std::sync::Arc;
use std::time::Duration;

use lineforge_common::resilience::CircuitState;
use lineforge_domain::{IdempotencyKey, PhoneNumber};
use lineforge_infra::config::Settings;
use lineforge_infra::{build_simulated_service, wire, InMemoryPhoneLineRepository};
use lineforge_infra::SimulatedProvisioningApi;
use lineforge_core::provisioning::{NewPhoneLine, UpstreamError};

fn fast_settings() -> Settings {
    let mut settings = Settings::default();
    settings.upstream.simulated_latency_ms = 0;
    settings
}

#[tokio::test(flavor = "multi_thread")]
async fn test_end_to_end_creation_and_replay() {
    let service = build_simulated_service(&fast_settings()).expect("valid settings");
    let key = IdempotencyKey::new("order-1").expect("valid key");

    let created = service
        .create_phone_line(NewPhoneLine { area_code: 11, plan_id: 2 }, Some(key.clone()))
        .await
        .expect("creation succeeds");

    assert_eq!(created.area_code.value(), 11);
    assert_eq!(created.plan.id, 2);
    assert!(created.phone_number.value().starts_with("+55119"));

    let replayed = service
        .create_phone_line(NewPhoneLine { area_code: 11, plan_id: 2 }, Some(key))
        .await
        .expect("replay succeeds");
    assert_eq!(created, replayed);

    let all = service.list_phone_lines(None).await.expect("listing works");
    assert_eq!(all.len(), 1);

    let stats = service.breaker_stats();
    assert_eq!(stats.state, CircuitState::Closed);
    assert_eq!(stats.failure_count, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_simulated_numbers_survive_domain_validation() {
    let service = build_simulated_service(&fast_settings()).expect("valid settings");

    for area_code in [11, 21, 31, 99] {
        let line = service
            .create_phone_line(NewPhoneLine { area_code, plan_id: 1 }, None)
            .await
            .expect("creation succeeds");
        assert!(PhoneNumber::new(line.phone_number.value()).is_ok());
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wire_accepts_custom_adapters() {
    let api = SimulatedProvisioningApi::new().with_latency(Duration::ZERO);
    let repository = Arc::new(InMemoryPhoneLineRepository::new());

    let service = wire(Arc::new(api), Arc::clone(&repository) as _, &fast_settings())
        .expect("valid settings");

    service
        .create_phone_line(NewPhoneLine { area_code: 21, plan_id: 3 }, None)
        .await
        .expect("creation succeeds");

    assert_eq!(repository.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_transient_failures_recovered_end_to_end() {
    let api = Arc::new(SimulatedProvisioningApi::new().with_latency(Duration::ZERO));
    let repository = Arc::new(InMemoryPhoneLineRepository::new());

    let mut settings = fast_settings();
    settings.retry.base_delay_ms = 1;
    settings.retry.max_delay_ms = 5;
    settings.retry.jitter = false;

    let service = wire(Arc::clone(&api) as _, Arc::clone(&repository) as _, &settings)
        .expect("valid settings");

    api.fail_next_with([UpstreamError::ConnectionReset, UpstreamError::Status { code: 503 }]);

    service
        .create_phone_line(NewPhoneLine { area_code: 11, plan_id: 1 }, None)
        .await
        .expect("succeeds after absorbed retries");

    assert_eq!(repository.len(), 1);
    let stats = service.breaker_stats();
    assert_eq!(stats.failure_count, 0, "absorbed retries never feed the breaker");
}

#[test]
fn test_invalid_settings_fail_wiring() {
    let mut settings = fast_settings();
    settings.breaker.failure_threshold = 0;
    assert!(build_simulated_service(&settings).is_err());
}
