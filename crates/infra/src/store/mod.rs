//! Idempotency-record store implementations

pub mod memory;

pub use memory::InMemoryPhoneLineRepository;
