//! Domain error types

use thiserror::Error;

/// Validation failures raised by domain constructors.
///
/// These never reach the resilience layer: the orchestrator validates input
/// before any remote call is attempted, and a validation failure is never
/// retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("invalid area code: {area_code}, must be between 11 and 99")]
    InvalidAreaCode { area_code: u32 },

    #[error("invalid phone number format: {phone_number}")]
    InvalidPhoneNumber { phone_number: String },

    #[error("invalid subscription plan id: {plan_id}")]
    InvalidSubscriptionPlan { plan_id: u32 },

    #[error("idempotency key must not be empty")]
    EmptyIdempotencyKey,
}

/// Result type alias for domain operations.
pub type DomainResult<T> = std::result::Result<T, DomainError>;
