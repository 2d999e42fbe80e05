//! Phone line entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainResult;

use super::{AreaCode, IdempotencyKey, PhoneNumber, SubscriptionPlan};

/// A provisioned phone line.
///
/// Constructed only through [`PhoneLine::create`], which validates every
/// component. Once persisted under an idempotency key the record is
/// immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneLine {
    pub id: Uuid,
    pub phone_number: PhoneNumber,
    pub area_code: AreaCode,
    pub plan: SubscriptionPlan,
    pub created_at: DateTime<Utc>,
    pub idempotency_key: IdempotencyKey,
}

impl PhoneLine {
    /// Build a phone line from raw inputs, validating each one.
    pub fn create(
        phone_number: impl Into<String>,
        area_code: u32,
        plan_id: u32,
        idempotency_key: IdempotencyKey,
    ) -> DomainResult<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            phone_number: PhoneNumber::new(phone_number)?,
            area_code: AreaCode::new(area_code)?,
            plan: SubscriptionPlan::from_id(plan_id)?,
            created_at: Utc::now(),
            idempotency_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_validates_components() {
        let line = PhoneLine::create("11999998888", 11, 1, IdempotencyKey::generate())
            .expect("valid line");
        assert_eq!(line.area_code.value(), 11);
        assert_eq!(line.plan.id, 1);
    }

    #[test]
    fn test_create_rejects_invalid_number() {
        assert!(PhoneLine::create("bogus", 11, 1, IdempotencyKey::generate()).is_err());
    }

    #[test]
    fn test_create_rejects_invalid_plan() {
        assert!(PhoneLine::create("11999998888", 11, 7, IdempotencyKey::generate()).is_err());
    }

    #[test]
    fn test_created_lines_have_distinct_ids() {
        let a = PhoneLine::create("11999998888", 11, 1, IdempotencyKey::generate())
            .expect("valid line");
        let b = PhoneLine::create("11999998888", 11, 1, IdempotencyKey::generate())
            .expect("valid line");
        assert_ne!(a.id, b.id);
    }
}
