//! Idempotency key value object

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{DomainError, DomainResult};

/// Token identifying a logical creation attempt.
///
/// Repeated attempts with the same key must yield the same result without
/// duplicate side effects. Every creation attempt carries exactly one key:
/// callers may supply their own, otherwise a fresh unique token is
/// generated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Wrap a caller-supplied key. Empty keys are rejected.
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::EmptyIdempotencyKey);
        }
        Ok(Self(value))
    }

    /// Generate a fresh unique key.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The key value.
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
