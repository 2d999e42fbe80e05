//! # Lineforge Domain
//!
//! Business domain types for phone-line provisioning.
//!
//! This crate contains:
//! - Value objects (`AreaCode`, `PhoneNumber`, `IdempotencyKey`)
//! - The `PhoneLine` entity and the `SubscriptionPlan` catalog
//! - Domain error types and Result definitions
//!
//! ## Architecture
//! - No dependencies on other Lineforge crates
//! - Pure domain models; validation lives in the constructors

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod errors;
pub mod types;

// Re-export commonly used items
pub use errors::{DomainError, DomainResult};
pub use types::{AreaCode, IdempotencyKey, PhoneLine, PhoneNumber, SubscriptionPlan};
