//! Phone-line provisioning core
//!
//! Composition of the resilience primitives around the abstract remote
//! provisioning capability, plus the idempotency-aware orchestration that
//! callers interact with. Transport, routing and storage durability live in
//! infrastructure crates behind the ports defined here.

pub mod gateway;
pub mod ports;
pub mod service;

pub use gateway::{GatewayError, ResilientGateway};
pub use ports::{
    PhoneLineRepository, ProvisionedNumber, ProvisioningApi, ProvisioningRequest, StoreError,
    UpstreamError,
};
pub use service::{NewPhoneLine, PhoneLineService, ProvisioningError};
