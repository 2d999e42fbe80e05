//! Subscription plan catalog

use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};

/// A commercial subscription plan attached to a phone line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    pub id: u32,
    pub name: String,
}

impl SubscriptionPlan {
    fn catalog_name(id: u32) -> Option<&'static str> {
        match id {
            1 => Some("WhatsApp"),
            2 => Some("1 GB"),
            3 => Some("3 GB"),
            4 => Some("5 GB"),
            _ => None,
        }
    }

    /// Look up a plan by id, validating it exists in the catalog.
    pub fn from_id(id: u32) -> DomainResult<Self> {
        Self::catalog_name(id)
            .map(|name| Self { id, name: name.to_string() })
            .ok_or(DomainError::InvalidSubscriptionPlan { plan_id: id })
    }

    /// All available plans.
    pub fn all() -> Vec<Self> {
        (1..=4)
            .filter_map(|id| Self::from_id(id).ok())
            .collect()
    }
}
