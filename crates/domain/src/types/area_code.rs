//! Area code value object

use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};

/// Brazilian two-digit area code, valid range 11..=99.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AreaCode(u32);

impl AreaCode {
    /// Construct a validated area code.
    pub fn new(value: u32) -> DomainResult<Self> {
        if (11..=99).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidAreaCode { area_code: value })
        }
    }

    /// The numeric value.
    pub fn value(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for AreaCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for AreaCode {
    type Error = DomainError;

    fn try_from(value: u32) -> DomainResult<Self> {
        Self::new(value)
    }
}
