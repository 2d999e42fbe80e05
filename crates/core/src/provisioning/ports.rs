//! Port interfaces for phone-line provisioning
//!
//! These traits define the boundaries between the orchestration core and
//! infrastructure implementations: the external provisioning dependency and
//! the idempotency-record store.

use std::time::Duration;

use async_trait::async_trait;
use lineforge_common::resilience::RetryClass;
use lineforge_domain::{AreaCode, IdempotencyKey, PhoneLine};
use thiserror::Error;
use uuid::Uuid;

/// Failure taxonomy of the remote provisioning capability.
///
/// The core treats the dependency as opaque except for this classification,
/// which drives the retry policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// Connection reset by the upstream peer.
    #[error("connection reset by upstream")]
    ConnectionReset,

    /// Connection refused by the upstream peer.
    #[error("connection refused by upstream")]
    ConnectionRefused,

    /// The call did not complete within its attempt budget.
    #[error("upstream call timed out after {after:?}")]
    Timeout { after: Duration },

    /// The upstream host could not be resolved.
    #[error("upstream host could not be resolved")]
    DnsFailure,

    /// The upstream answered with a non-success HTTP status.
    #[error("upstream responded with status {code}")]
    Status { code: u16 },

    /// The upstream answered but the response lacked required fields.
    ///
    /// Treated as a failure of the attempt, not a transport error.
    #[error("malformed upstream response: {detail}")]
    MalformedResponse { detail: String },
}

impl RetryClass for UpstreamError {
    /// Transient network conditions, 5xx responses and 429 rate limiting are
    /// retryable; every other failure is surfaced after a single attempt.
    fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionReset
            | Self::ConnectionRefused
            | Self::Timeout { .. }
            | Self::DnsFailure => true,
            Self::Status { code } => *code >= 500 || *code == 429,
            Self::MalformedResponse { .. } => false,
        }
    }
}

/// Request sent to the provisioning dependency.
#[derive(Debug, Clone)]
pub struct ProvisioningRequest {
    pub area_code: AreaCode,
    pub plan_id: u32,
    pub idempotency_key: IdempotencyKey,
}

/// Successful response from the provisioning dependency.
#[derive(Debug, Clone)]
pub struct ProvisionedNumber {
    /// The allocated phone number, still unvalidated at this boundary.
    pub phone_number: String,
}

/// The external phone-number provisioning capability.
#[async_trait]
pub trait ProvisioningApi: Send + Sync {
    /// Allocate a phone number for the given request.
    async fn create_phone_number(
        &self,
        request: &ProvisioningRequest,
    ) -> Result<ProvisionedNumber, UpstreamError>;
}

/// Failure raised by the idempotency-record store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("store failure: {0}")]
    Backend(String),
}

/// Keyed store of provisioned phone lines.
///
/// At most one record exists per idempotency key; once written a record is
/// immutable. Eviction and durability are external concerns.
#[async_trait]
pub trait PhoneLineRepository: Send + Sync {
    /// Persist a phone line, indexing it by its idempotency key.
    async fn save(&self, line: PhoneLine) -> Result<(), StoreError>;

    /// Fetch a phone line by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PhoneLine>, StoreError>;

    /// Fetch the phone line recorded for an idempotency key, if any.
    async fn find_by_idempotency_key(
        &self,
        key: &IdempotencyKey,
    ) -> Result<Option<PhoneLine>, StoreError>;

    /// Fetch every phone line within an area code.
    async fn find_by_area_code(&self, area_code: AreaCode) -> Result<Vec<PhoneLine>, StoreError>;

    /// Fetch every phone line.
    async fn find_all(&self) -> Result<Vec<PhoneLine>, StoreError>;
}
