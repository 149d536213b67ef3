//! Payment methods and request descriptions for gateway operations.
//!
//! Each type maps its fields to form keys by hand. Required fields are
//! checked when the parameters are built, before anything is signed or sent.

use std::fmt;

use crate::error::{Error, Result};
use crate::params::{Params, ToParams};

/// A payment card.
#[derive(Clone, PartialEq, Eq)]
pub struct Card {
    /// Primary Account Number.
    pub pan: String,
    /// Month of expiry, `MM`.
    pub expire_month: String,
    /// Year of expiry, `YYYY`.
    pub expire_year: String,
    /// Card security code. Only signed requests from trusted integrators may
    /// omit it.
    pub csc: Option<String>,
}

impl Card {
    /// Creates a card without CSC.
    #[must_use]
    pub fn new(
        pan: impl Into<String>,
        expire_month: impl Into<String>,
        expire_year: impl Into<String>,
    ) -> Self {
        Self {
            pan: pan.into(),
            expire_month: expire_month.into(),
            expire_year: expire_year.into(),
            csc: None,
        }
    }

    /// Sets the card security code.
    #[must_use]
    pub fn with_csc(mut self, csc: impl Into<String>) -> Self {
        self.csc = Some(csc.into());
        self
    }

    /// Card fields in authorization order: the CSC and `PARes` sit between
    /// PAN and expiry.
    fn write_authorization_params(&self, params: &mut Params, pares: Option<&str>) -> Result<()> {
        params.add_required("card[pan]", &self.pan)?;
        params.add_if_present("card[csc]", self.csc.as_deref());
        params.add_if_present("card[pares]", pares);
        params.add_required("card[expire_month]", &self.expire_month)?;
        params.add_required("card[expire_year]", &self.expire_year)?;
        Ok(())
    }
}

/// Tokenization order: PAN, expiry, then CSC.
impl ToParams for Card {
    fn write_params(&self, params: &mut Params) -> Result<()> {
        params.add_required("card[pan]", &self.pan)?;
        params.add_required("card[expire_month]", &self.expire_month)?;
        params.add_required("card[expire_year]", &self.expire_year)?;
        params.add_if_present("card[csc]", self.csc.as_deref());
        Ok(())
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Card")
            .field("pan", &MaskedPan(&self.pan))
            .field("expire_month", &self.expire_month)
            .field("expire_year", &self.expire_year)
            .field("csc", &self.csc.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Card details delivered by MobilePay Online.
#[derive(Clone, PartialEq, Eq)]
pub struct MobilePayOnlineInfo {
    /// Primary Account Number.
    pub pan: String,
    /// Month of expiry.
    pub expire_month: String,
    /// Year of expiry.
    pub expire_year: String,
    /// Phone number of the payer.
    pub phone_number: Option<String>,
}

impl MobilePayOnlineInfo {
    /// Creates MobilePay Online details.
    #[must_use]
    pub fn new(
        pan: impl Into<String>,
        expire_month: impl Into<String>,
        expire_year: impl Into<String>,
    ) -> Self {
        Self {
            pan: pan.into(),
            expire_month: expire_month.into(),
            expire_year: expire_year.into(),
            phone_number: None,
        }
    }

    /// Sets the payer's phone number.
    #[must_use]
    pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    fn write_authorization_params(&self, params: &mut Params, pares: Option<&str>) -> Result<()> {
        params.add_required("mobilepayonline[pan]", &self.pan)?;
        params.add_required("mobilepayonline[expire_month]", &self.expire_month)?;
        params.add_required("mobilepayonline[expire_year]", &self.expire_year)?;
        params.add_if_present("mobilepayonline[phone_number]", self.phone_number.as_deref());
        params.add_if_present("mobilepayonline[pares]", pares);
        Ok(())
    }
}

impl fmt::Debug for MobilePayOnlineInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MobilePayOnlineInfo")
            .field("pan", &MaskedPan(&self.pan))
            .field("expire_month", &self.expire_month)
            .field("expire_year", &self.expire_year)
            .field("phone_number", &self.phone_number)
            .finish()
    }
}

/// Apple Pay payment token details.
#[derive(Clone, PartialEq, Eq)]
pub struct ApplePayInfo {
    /// `paymentData` of the Apple Pay `PKPaymentToken`.
    pub payment_token: String,
    /// Symmetric key used to decrypt the `data` key of `paymentData`.
    pub symmetric_key: String,
}

impl ApplePayInfo {
    /// Creates Apple Pay details.
    #[must_use]
    pub fn new(payment_token: impl Into<String>, symmetric_key: impl Into<String>) -> Self {
        Self {
            payment_token: payment_token.into(),
            symmetric_key: symmetric_key.into(),
        }
    }
}

impl ToParams for ApplePayInfo {
    fn write_params(&self, params: &mut Params) -> Result<()> {
        params.add_required("applepay[payment_token]", &self.payment_token)?;
        params.add_required("applepay[symmetric_key]", &self.symmetric_key)?;
        Ok(())
    }
}

impl fmt::Debug for ApplePayInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplePayInfo").finish_non_exhaustive()
    }
}

/// The instrument an authorization is made against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Plain card details.
    Card(Card),
    /// MobilePay Online card details.
    MobilePayOnline(MobilePayOnlineInfo),
    /// Apple Pay token.
    ApplePay(ApplePayInfo),
}

impl From<Card> for PaymentMethod {
    fn from(card: Card) -> Self {
        Self::Card(card)
    }
}

impl From<MobilePayOnlineInfo> for PaymentMethod {
    fn from(info: MobilePayOnlineInfo) -> Self {
        Self::MobilePayOnline(info)
    }
}

impl From<ApplePayInfo> for PaymentMethod {
    fn from(info: ApplePayInfo) -> Self {
        Self::ApplePay(info)
    }
}

/// Optional fields of an authorization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationOptions {
    /// Marks the authorization as recurring.
    pub recurring: bool,
    /// IPv4/IPv6 address of the cardholder.
    pub ip: Option<String>,
    /// Text on the cardholder's bank statement.
    pub text_on_statement: Option<String>,
    /// Merchant reference.
    pub reference: Option<String>,
}

impl ToParams for AuthorizationOptions {
    fn write_params(&self, params: &mut Params) -> Result<()> {
        if self.recurring {
            params.add("recurring", "true");
        }
        params.add_if_present("ip", self.ip.as_deref());
        params.add_if_present("text_on_statement", self.text_on_statement.as_deref());
        params.add_if_present("reference", self.reference.as_deref());
        Ok(())
    }
}

/// Everything needed for `POST authorizations/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    /// Amount to reserve, in minor units of `currency`.
    pub amount: String,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Instrument to authorize against.
    pub method: PaymentMethod,
    /// 3-D Secure `PARes` returned by the ACS.
    pub pares: Option<String>,
    /// Optional fields.
    pub options: AuthorizationOptions,
}

impl AuthorizationRequest {
    /// Creates a request without `PARes` or options.
    #[must_use]
    pub fn new(
        amount: impl Into<String>,
        currency: impl Into<String>,
        method: impl Into<PaymentMethod>,
    ) -> Self {
        Self {
            amount: amount.into(),
            currency: currency.into(),
            method: method.into(),
            pares: None,
            options: AuthorizationOptions::default(),
        }
    }

    /// Attaches a 3-D Secure `PARes`.
    #[must_use]
    pub fn with_pares(mut self, pares: impl Into<String>) -> Self {
        self.pares = Some(pares.into());
        self
    }

    /// Sets the optional fields.
    #[must_use]
    pub fn with_options(mut self, options: AuthorizationOptions) -> Self {
        self.options = options;
        self
    }
}

impl ToParams for AuthorizationRequest {
    fn write_params(&self, params: &mut Params) -> Result<()> {
        params.add_required("amount", &self.amount)?;
        params.add_required("currency", &self.currency)?;
        let pares = self.pares.as_deref();
        match &self.method {
            PaymentMethod::Card(card) => card.write_authorization_params(params, pares)?,
            PaymentMethod::MobilePayOnline(info) => {
                info.write_authorization_params(params, pares)?;
            }
            PaymentMethod::ApplePay(info) => {
                if pares.is_some_and(|p| !p.trim().is_empty()) {
                    return Err(Error::InvalidParameter {
                        key: "pares".to_owned(),
                        reason: "not supported with Apple Pay",
                    });
                }
                params.add_from(info)?;
            }
        }
        params.add_from(&self.options)?;
        Ok(())
    }
}

/// Everything needed for a credit to a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditRequest {
    /// Amount to transfer, in minor units of `currency`.
    pub amount: String,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Card to transfer to.
    pub card: Card,
    /// Text on the cardholder's bank statement.
    pub text_on_statement: Option<String>,
    /// Merchant reference.
    pub reference: Option<String>,
}

impl CreditRequest {
    /// Creates a credit request without statement text or reference.
    #[must_use]
    pub fn new(amount: impl Into<String>, currency: impl Into<String>, card: Card) -> Self {
        Self {
            amount: amount.into(),
            currency: currency.into(),
            card,
            text_on_statement: None,
            reference: None,
        }
    }

    /// Sets the statement text.
    #[must_use]
    pub fn with_text_on_statement(mut self, text: impl Into<String>) -> Self {
        self.text_on_statement = Some(text.into());
        self
    }

    /// Sets the merchant reference.
    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Parameters of `POST cards/{id}/credits` for an already tokenized card.
    pub(crate) fn credit_params(&self, card_id: &str) -> Result<Params> {
        let mut params = Params::new();
        params.add_required("id", card_id)?;
        params.add_required("amount", &self.amount)?;
        params.add_required("currency", &self.currency)?;
        params.add_if_present("text_on_statement", self.text_on_statement.as_deref());
        params.add_if_present("reference", self.reference.as_deref());
        Ok(params)
    }
}

struct MaskedPan<'a>(&'a str);

impl fmt::Debug for MaskedPan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.trim();
        let tail = digits
            .char_indices()
            .rev()
            .nth(3)
            .map_or(digits, |(i, _)| &digits[i..]);
        write!(f, "\"****{tail}\"")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staging_card() -> Card {
        Card::new("4111111111111111", "12", "2020").with_csc("584")
    }

    fn body(params: Params) -> String {
        String::from_utf8(params.into_body().into_bytes()).unwrap()
    }

    fn keys(params: &Params) -> Vec<&str> {
        params.pairs().iter().map(|(k, _)| k.as_str()).collect()
    }

    #[test]
    fn test_card_authorization_body() {
        let request = AuthorizationRequest::new("100", "DKK", staging_card());
        assert_eq!(
            body(request.to_params().unwrap()),
            "amount=100&currency=DKK&card%5Bpan%5D=4111111111111111&card%5Bcsc%5D=584\
             &card%5Bexpire_month%5D=12&card%5Bexpire_year%5D=2020"
        );
    }

    #[test]
    fn test_blank_csc_is_omitted() {
        let mut card = staging_card();
        card.csc = Some(String::new());
        let params = AuthorizationRequest::new("100", "DKK", card).to_params().unwrap();
        assert!(params.get("card[csc]").is_none());
        assert_eq!(
            keys(&params),
            ["amount", "currency", "card[pan]", "card[expire_month]", "card[expire_year]"]
        );
    }

    #[test]
    fn test_card_pares_sits_after_csc() {
        let params = AuthorizationRequest::new("100", "DKK", staging_card())
            .with_pares("eJzVWNmy")
            .to_params()
            .unwrap();
        assert_eq!(
            keys(&params),
            [
                "amount",
                "currency",
                "card[pan]",
                "card[csc]",
                "card[pares]",
                "card[expire_month]",
                "card[expire_year]"
            ]
        );
    }

    #[test]
    fn test_options_follow_method_fields() {
        let options = AuthorizationOptions {
            recurring: true,
            ip: Some("1.1.1.1".into()),
            text_on_statement: Some(String::new()),
            reference: Some("afhAsdgg".into()),
        };
        let params = AuthorizationRequest::new("100", "DKK", staging_card())
            .with_options(options)
            .to_params()
            .unwrap();
        let keys = keys(&params);
        assert_eq!(&keys[keys.len() - 3..], ["recurring", "ip", "reference"]);
        assert_eq!(params.get("recurring"), Some("true"));
    }

    #[test]
    fn test_recurring_false_is_not_sent() {
        let params = AuthorizationOptions::default().to_params().unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn test_required_fields_are_enforced() {
        let err = AuthorizationRequest::new("", "DKK", staging_card())
            .to_params()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { ref key, .. } if key == "amount"));

        let mut card = staging_card();
        card.expire_year = " ".into();
        let err = AuthorizationRequest::new("100", "DKK", card).to_params().unwrap_err();
        assert!(
            matches!(err, Error::InvalidParameter { ref key, .. } if key == "card[expire_year]")
        );
    }

    #[test]
    fn test_mobilepay_online_fields() {
        let info = MobilePayOnlineInfo::new("4111111111111111", "12", "2020")
            .with_phone_number("12445678");
        let params = AuthorizationRequest::new("100", "DKK", info)
            .with_pares("pares")
            .to_params()
            .unwrap();
        assert_eq!(
            keys(&params),
            [
                "amount",
                "currency",
                "mobilepayonline[pan]",
                "mobilepayonline[expire_month]",
                "mobilepayonline[expire_year]",
                "mobilepayonline[phone_number]",
                "mobilepayonline[pares]"
            ]
        );
    }

    #[test]
    fn test_apple_pay_fields() {
        let params = AuthorizationRequest::new("100", "DKK", ApplePayInfo::new("{}", "abcd"))
            .to_params()
            .unwrap();
        assert_eq!(params.get("applepay[payment_token]"), Some("{}"));
        assert_eq!(params.get("applepay[symmetric_key]"), Some("abcd"));
    }

    #[test]
    fn test_apple_pay_rejects_pares() {
        let err = AuthorizationRequest::new("100", "DKK", ApplePayInfo::new("{}", "abcd"))
            .with_pares("pares")
            .to_params()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { ref key, .. } if key == "pares"));
    }

    #[test]
    fn test_tokenization_order() {
        let params = staging_card().to_params().unwrap();
        assert_eq!(
            keys(&params),
            ["card[pan]", "card[expire_month]", "card[expire_year]", "card[csc]"]
        );
    }

    #[test]
    fn test_credit_params() {
        let request = CreditRequest::new("100", "DKK", staging_card()).with_reference("ref-1");
        let params = request.credit_params("card-id").unwrap();
        assert_eq!(keys(&params), ["id", "amount", "currency", "reference"]);
        assert_eq!(params.get("id"), Some("card-id"));
    }

    #[test]
    fn test_card_debug_masks_pan() {
        let debug = format!("{:?}", staging_card());
        assert!(debug.contains("****1111"));
        assert!(!debug.contains("4111111111111111"));
        assert!(!debug.contains("584"));
    }
}
