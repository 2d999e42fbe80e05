//! Phone number value object

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};

// Accepted Brazilian mobile formats
#[allow(clippy::expect_used)]
static FORMATS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        // (XX) 9XXXX-XXXX
        Regex::new(r"^\(\d{2}\) 9\d{4}-\d{4}$").expect("static pattern"),
        // XX9XXXXXXXX
        Regex::new(r"^\d{2}9\d{8}$").expect("static pattern"),
        // +55XX9XXXXXXXX
        Regex::new(r"^\+55\d{2}9\d{8}$").expect("static pattern"),
    ]
});

/// Validated Brazilian mobile number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Construct a validated phone number. Accepts `(XX) 9XXXX-XXXX`,
    /// `XX9XXXXXXXX` and `+55XX9XXXXXXXX` formats.
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        if FORMATS.iter().any(|pattern| pattern.is_match(&value)) {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidPhoneNumber { phone_number: value })
        }
    }

    /// The raw value as supplied.
    pub fn value(&self) -> &str {
        &self.0
    }

    /// Normalize to the `(XX) 9XXXX-XXXX` display form.
    ///
    /// Returns the stored value unchanged when it cannot be normalized.
    pub fn normalized(&self) -> String {
        let digits: String = self.0.chars().filter(char::is_ascii_digit).collect();
        let national = digits.strip_prefix("55").filter(|rest| rest.len() == 11).unwrap_or(&digits);

        if national.len() == 11 {
            format!("({}) {}-{}", &national[..2], &national[2..7], &national[7..])
        } else {
            self.0.clone()
        }
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
