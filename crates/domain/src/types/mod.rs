//! Domain data types for phone-line provisioning

mod area_code;
mod idempotency_key;
mod phone_line;
mod phone_number;
mod subscription_plan;

pub use area_code::AreaCode;
pub use idempotency_key::IdempotencyKey;
pub use phone_line::PhoneLine;
pub use phone_number::PhoneNumber;
pub use subscription_plan::SubscriptionPlan;
