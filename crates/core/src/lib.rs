//! # Lineforge Core
//!
//! Orchestration layer for phone-line provisioning: the resilient gateway
//! composing circuit breaker and retry around the remote dependency, the
//! idempotent creation service, and the port traits infrastructure
//! implements.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod provisioning;

pub use provisioning::{
    GatewayError, NewPhoneLine, PhoneLineRepository, PhoneLineService, ProvisionedNumber,
    ProvisioningApi, ProvisioningError, ProvisioningRequest, ResilientGateway, StoreError,
    UpstreamError,
};
