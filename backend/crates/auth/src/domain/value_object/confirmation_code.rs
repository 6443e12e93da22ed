//! Confirmation Code Value Object
//!
//! A six digit numeric string mailed to the user. It proves ownership of the
//! address and is exchanged for an access token. At most one code is live per
//! user: issuing a new one overwrites the previous value.

use std::fmt;

use platform::crypto::{constant_time_eq, random_numeric_code};

/// Number of digits in a confirmation code
pub const CONFIRMATION_CODE_DIGITS: u32 = 6;

#[derive(Clone, PartialEq, Eq)]
pub struct ConfirmationCode(String);

impl ConfirmationCode {
    /// Draw a fresh uniformly random code (leading zeros allowed)
    pub fn generate() -> Self {
        Self(random_numeric_code(CONFIRMATION_CODE_DIGITS))
    }

    /// Create from database value
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare against a client-supplied candidate in constant time
    pub fn matches(&self, candidate: &str) -> bool {
        !candidate.is_empty() && constant_time_eq(self.0.as_bytes(), candidate.as_bytes())
    }
}

// Codes are credentials; keep them out of debug output and logs.
impl fmt::Debug for ConfirmationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConfirmationCode(******)")
    }
}
