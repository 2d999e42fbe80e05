//! Provisioning dependency implementations

pub mod simulated;

pub use simulated::SimulatedProvisioningApi;
