//! Simulated provisioning dependency
//!
//! Stand-in for the real carrier API: allocates a random Brazilian mobile
//! number in the requested area code after a short artificial delay. Used
//! for local runs and end-to-end tests of the full composition; tests can
//! queue failures to exercise the resilience layer.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use lineforge_core::provisioning::{
    ProvisionedNumber, ProvisioningApi, ProvisioningRequest, UpstreamError,
};
use rand::Rng;
use tracing::debug;

const DEFAULT_LATENCY: Duration = Duration::from_millis(500);

/// [`ProvisioningApi`] producing `+55XX9XXXXXXXX` numbers.
///
/// Succeeds by default; queued failures are consumed first, one per call.
#[derive(Debug)]
pub struct SimulatedProvisioningApi {
    latency: Duration,
    failure_plan: Mutex<VecDeque<UpstreamError>>,
}

impl Default for SimulatedProvisioningApi {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedProvisioningApi {
    /// Create a simulator with the default 500ms latency.
    pub fn new() -> Self {
        Self { latency: DEFAULT_LATENCY, failure_plan: Mutex::new(VecDeque::new()) }
    }

    /// Override the artificial latency. Tests use zero.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Queue failures to be returned by the next calls, in order.
    pub fn fail_next_with(&self, failures: impl IntoIterator<Item = UpstreamError>) {
        if let Ok(mut plan) = self.failure_plan.lock() {
            plan.extend(failures);
        }
    }

    fn next_planned_failure(&self) -> Option<UpstreamError> {
        self.failure_plan.lock().ok().and_then(|mut plan| plan.pop_front())
    }
}

#[async_trait]
impl ProvisioningApi for SimulatedProvisioningApi {
    async fn create_phone_number(
        &self,
        request: &ProvisioningRequest,
    ) -> Result<ProvisionedNumber, UpstreamError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if let Some(failure) = self.next_planned_failure() {
            debug!(error = %failure, "simulated provisioning failed as planned");
            return Err(failure);
        }

        // 9 + eight random digits, matching the mobile numbering plan
        let suffix: u32 = rand::thread_rng().gen_range(10_000_000..100_000_000);
        let phone_number = format!("+55{}9{suffix}", request.area_code.value());
        debug!(
            area_code = request.area_code.value(),
            plan_id = request.plan_id,
            number = %phone_number,
            "simulated provisioning succeeded"
        );

        Ok(ProvisionedNumber { phone_number })
    }
}
