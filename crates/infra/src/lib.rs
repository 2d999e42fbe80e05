//! # Lineforge Infrastructure
//!
//! Infrastructure implementations of the core provisioning ports.
//!
//! This crate contains:
//! - The in-memory idempotency-record store
//! - The simulated provisioning dependency
//! - Environment-based configuration loading
//! - Service composition helpers
//!
//! ## Architecture
//! - Implements traits defined in `lineforge-core`
//! - Contains all wiring; the core stays free of concrete adapters

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod bootstrap;
pub mod config;
pub mod store;
pub mod upstream;

// Re-export commonly used items
pub use bootstrap::{build_simulated_service, wire};
pub use config::Settings;
pub use store::InMemoryPhoneLineRepository;
pub use upstream::SimulatedProvisioningApi;
