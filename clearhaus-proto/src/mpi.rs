//! 3-D Secure MPI responses.
//!
//! The MPI has no numeric status convention; enrollment and authentication
//! results are the raw 3-D Secure flags (`Y`, `N`, `U`, `A`).

use serde::{Deserialize, Serialize};

use crate::de::opt_string_or_number;

/// Error object reported by the MPI service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpiError {
    /// Additional detail, if any.
    #[serde(default)]
    pub detail: Option<String>,

    /// Error message.
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of `POST /enrolled`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentStatus {
    /// URL of the issuer's Access Control Server.
    #[serde(default)]
    pub acs_url: Option<String>,

    /// `PAReq` to forward to [`acs_url`](Self::acs_url).
    #[serde(default)]
    pub pareq: Option<String>,

    /// Whether the card is enrolled for 3-D Secure (`Y`, `N` or `U`).
    #[serde(default)]
    pub enrolled: Option<String>,

    /// Electronic Commerce Indicator, when the flow ends here.
    #[serde(default)]
    pub eci: Option<String>,

    /// Error reported by the service.
    #[serde(default)]
    pub error: Option<MpiError>,
}

impl EnrollmentStatus {
    /// Returns `true` if the card is enrolled and the 3-D Secure flow should
    /// continue at the ACS.
    #[must_use]
    pub fn is_enrolled(&self) -> bool {
        self.enrolled.as_deref() == Some("Y")
    }
}

/// Response of `POST /check`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    /// Amount of the transaction.
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub amount: Option<String>,

    /// Currency of the transaction.
    #[serde(default)]
    pub currency: Option<String>,

    /// Cardholder Authentication Verification Value.
    #[serde(default)]
    pub cavv: Option<String>,

    /// Algorithm used to compute the CAVV.
    #[serde(default)]
    pub cavv_algorithm: Option<String>,

    /// Electronic Commerce Indicator.
    #[serde(default)]
    pub eci: Option<String>,

    /// Merchant ID of the associated merchant.
    #[serde(default)]
    pub merchant_id: Option<String>,

    /// Last four digits of the PAN.
    #[serde(default)]
    pub last4: Option<String>,

    /// `TX.Status` of the `PARes`.
    #[serde(default)]
    pub status: Option<String>,

    /// Merchant transaction ID.
    #[serde(default)]
    pub xid: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrollment_status_enrolled() {
        let json = r#"{
            "acs_url": "https://acs.example.com/pareq",
            "pareq": "eJxVUttygjAQ",
            "enrolled": "Y"
        }"#;
        let status: EnrollmentStatus = serde_json::from_str(json).unwrap();
        assert!(status.is_enrolled());
        assert_eq!(status.acs_url.as_deref(), Some("https://acs.example.com/pareq"));
        assert!(status.error.is_none());
    }

    #[test]
    fn test_enrollment_status_error() {
        let json = r#"{ "error": { "message": "invalid card number" } }"#;
        let status: EnrollmentStatus = serde_json::from_str(json).unwrap();
        assert!(!status.is_enrolled());
        assert_eq!(
            status.error.unwrap().message.as_deref(),
            Some("invalid card number")
        );
    }

    #[test]
    fn test_check_response_deserialize() {
        let json = r#"{
            "amount": 100,
            "currency": "DKK",
            "cavv": "AAABBJg0VhI0VniQEjRWAAAAAAA=",
            "cavv_algorithm": "2",
            "eci": "5",
            "merchant_id": "1234",
            "last4": "0004",
            "status": "Y",
            "xid": "ZWNmYjBkNzBiNjY0NDI0ZjNjMTE="
        }"#;
        let check: CheckResponse = serde_json::from_str(json).unwrap();
        assert_eq!(check.amount.as_deref(), Some("100"));
        assert_eq!(check.status.as_deref(), Some("Y"));
        assert_eq!(check.eci.as_deref(), Some("5"));
    }
}
