//! Account information and card tokens.

use serde::{Deserialize, Serialize};

use crate::de::opt_string_or_number;
use crate::status::Status;

/// Merchant account information returned by `GET account/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// ID of the merchant in the Clearhaus system.
    #[serde(default)]
    pub merchant_id: Option<String>,

    /// The default `text_on_statement`.
    #[serde(default)]
    pub descriptor: Option<String>,

    /// Merchant name.
    #[serde(default)]
    pub name: Option<String>,

    /// Merchant country.
    #[serde(default)]
    pub country: Option<String>,

    /// Merchant Category Code.
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub mcc: Option<String>,

    /// Acquirer BIN information.
    #[serde(default)]
    pub acquirer: Option<Acquirer>,

    /// Transaction rules in the Clearhaus rule language.
    #[serde(default)]
    pub transaction_rules: Option<String>,
}

/// Acquirer BINs per card scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acquirer {
    /// BIN for VISA.
    #[serde(default)]
    pub visa_bin: Option<String>,

    /// BIN for Mastercard.
    #[serde(default)]
    pub mastercard_bin: Option<String>,
}

/// A card tokenized by the gateway through `POST cards/`.
///
/// Only used as the first half of a credit; this crate never stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizedCard {
    /// UUID of the card resource.
    #[serde(default)]
    pub id: Option<String>,

    /// Last four digits of the PAN.
    #[serde(default)]
    pub last4: Option<String>,

    /// Card scheme (e.g. `visa`, `mastercard`).
    #[serde(default)]
    pub scheme: Option<String>,

    /// Business status, when the gateway reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl TokenizedCard {
    /// Returns the card id if tokenization succeeded.
    ///
    /// Tokenization succeeded when an id was assigned and the status (if
    /// present) is a success.
    #[must_use]
    pub fn usable_id(&self) -> Option<&str> {
        let accepted = self.status.as_ref().is_none_or(Status::is_success);
        self.id
            .as_deref()
            .filter(|id| accepted && !id.trim().is_empty())
    }
}
