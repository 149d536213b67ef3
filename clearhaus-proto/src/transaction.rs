//! Transaction results returned by the gateway.
//!
//! Every transaction shape carries the same three fields (`id`, `status`,
//! `processed_at`) plus operation-specific data. The shared part is exposed
//! through the [`Transaction`] trait so that success is decided in exactly
//! one place.
//!
//! `id` and `processed_at` are optional because validation failures
//! (answered with HTTP 400) contain only a `status` object.

use serde::{Deserialize, Serialize};

use crate::de::opt_string_or_number;
use crate::status::Status;

/// Common view over all transaction result shapes.
pub trait Transaction {
    /// Gateway-assigned transaction identifier, if one was assigned.
    fn id(&self) -> Option<&str>;

    /// Business status of the transaction.
    fn status(&self) -> &Status;

    /// Timestamp at which the gateway processed the transaction.
    fn processed_at(&self) -> Option<&str>;

    /// Returns `true` if and only if `status.code == 20000`.
    ///
    /// Do not infer success from the absence of an error: a declined
    /// transaction decodes into a normal result whose `is_success` is `false`.
    fn is_success(&self) -> bool {
        self.status().is_success()
    }
}

macro_rules! impl_transaction {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Transaction for $ty {
                fn id(&self) -> Option<&str> {
                    self.id.as_deref()
                }

                fn status(&self) -> &Status {
                    &self.status
                }

                fn processed_at(&self) -> Option<&str> {
                    self.processed_at.as_deref()
                }
            }
        )+
    };
}

impl_transaction!(Authorization, Capture, Refund, Void, Credit);

/// A completed authorization (reservation of funds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    /// UUID identifying the authorization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Business status.
    pub status: Status,

    /// Datetime the authorization was processed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<String>,

    /// Result of the card security code check.
    #[serde(default, rename = "csc", skip_serializing_if = "Option::is_none")]
    pub csc_status: Option<CscStatus>,
}

/// Status of the card security code for an authorization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CscStatus {
    /// Whether a CSC was present in the authorization.
    #[serde(default)]
    pub present: bool,

    /// Whether the CSC matched.
    #[serde(default)]
    pub matches: bool,
}

/// A capture of reserved funds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capture {
    /// UUID identifying the capture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Business status.
    pub status: Status,

    /// Datetime the capture was processed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<String>,

    /// Amount captured, in minor units.
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<String>,
}

/// A refund of captured funds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    /// UUID identifying the refund.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Business status.
    pub status: Status,

    /// Datetime the refund was processed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<String>,

    /// Amount refunded, in minor units.
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<String>,
}

/// A void (annulment) of an authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Void {
    /// UUID identifying the void.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Business status.
    pub status: Status,

    /// Datetime the void was processed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<String>,
}

/// A credit: transfer of funds to a cardholder account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credit {
    /// UUID identifying the credit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Business status.
    pub status: Status,

    /// Datetime the credit was processed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<String>,

    /// Amount transferred, in minor units.
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<String>,
}

impl Credit {
    /// Creates a credit result that was never sent, carrying the status that
    /// prevented it (e.g. a failed card tokenization).
    #[must_use]
    pub const fn not_attempted(status: Status) -> Self {
        Self {
            id: None,
            status,
            processed_at: None,
            amount: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_deserialize_success() {
        let json = r#"{
            "id": "84412a34-fa29-4369-a098-0165a80e8fda",
            "status": { "code": 20000, "message": "Approved" },
            "processed_at": "2024-01-21T13:15:12+00:00",
            "amount": 100,
            "currency": "DKK",
            "csc": { "present": true, "matches": true }
        }"#;
        let auth: Authorization = serde_json::from_str(json).unwrap();
        assert!(auth.is_success());
        assert_eq!(auth.id(), Some("84412a34-fa29-4369-a098-0165a80e8fda"));
        assert_eq!(auth.processed_at(), Some("2024-01-21T13:15:12+00:00"));
        assert_eq!(
            auth.csc_status,
            Some(CscStatus {
                present: true,
                matches: true
            })
        );
    }

    #[test]
    fn test_validation_failure_has_only_status() {
        let json = r#"{ "status": { "code": 40001, "message": "invalid amount" } }"#;
        let auth: Authorization = serde_json::from_str(json).unwrap();
        assert!(!auth.is_success());
        assert!(auth.id().is_none());
        assert!(auth.processed_at().is_none());
        assert_eq!(auth.status().message, "invalid amount");
    }

    #[test]
    fn test_missing_status_is_rejected() {
        let result: Result<Void, _> = serde_json::from_str(r#"{ "id": "abc" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_amount_accepts_string_and_number() {
        let capture: Capture =
            serde_json::from_str(r#"{"status":{"code":20000},"amount":150}"#).unwrap();
        assert_eq!(capture.amount.as_deref(), Some("150"));

        let refund: Refund =
            serde_json::from_str(r#"{"status":{"code":20000},"amount":"75"}"#).unwrap();
        assert_eq!(refund.amount.as_deref(), Some("75"));

        let credit: Credit = serde_json::from_str(r#"{"status":{"code":20000}}"#).unwrap();
        assert!(credit.amount.is_none());
    }

    #[test]
    fn test_success_is_uniform_across_shapes() {
        fn check<T: Transaction + serde::de::DeserializeOwned>(code: u32) -> bool {
            let json = format!(r#"{{"id":"x","status":{{"code":{code},"message":""}}}}"#);
            serde_json::from_str::<T>(&json).unwrap().is_success()
        }
        for code in [0, 200, 201, 20000, 20001, 20100, 29999, 40000, 40110, 50000] {
            let expected = code == 20000;
            assert_eq!(check::<Authorization>(code), expected, "authorization {code}");
            assert_eq!(check::<Capture>(code), expected, "capture {code}");
            assert_eq!(check::<Refund>(code), expected, "refund {code}");
            assert_eq!(check::<Void>(code), expected, "void {code}");
            assert_eq!(check::<Credit>(code), expected, "credit {code}");
        }
    }

    #[test]
    fn test_credit_not_attempted_keeps_status() {
        let credit = Credit::not_attempted(Status::new(40110, "invalid card number"));
        assert!(!credit.is_success());
        assert!(credit.id().is_none());
        assert_eq!(credit.status().code, 40110);
    }
}
