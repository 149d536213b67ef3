//! Business status embedded in every gateway response.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The only status code that denotes a successful transaction.
pub const SUCCESS_CODE: u32 = 20000;

/// Status of a gateway request: a numeric business code and its message.
///
/// Codes are listed in the gateway documentation under "Transaction status
/// codes". The HTTP layer only tells whether the gateway processed the
/// request; this object tells what the outcome was (approved, declined,
/// invalid card, 3-D Secure problem, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Gateway status code.
    pub code: u32,

    /// Message associated with the status code.
    #[serde(default)]
    pub message: String,
}

impl Status {
    /// Creates a status from a code and message.
    #[must_use]
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Returns `true` if the code is exactly [`SUCCESS_CODE`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}
