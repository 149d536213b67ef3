//! 3-D Secure MPI facade.
//!
//! The MPI service (`3dsecure.io`) runs the enrollment check against the
//! card scheme directory and verifies the `PARes` returned by the issuer's
//! ACS. The resulting CAVV and ECI are then passed on to the gateway
//! authorization, usually by attaching the `PARes` with
//! [`AuthorizationRequest::with_pares`](crate::AuthorizationRequest::with_pares).
//!
//! MPI requests are never signed.

use std::time::Duration;

use clearhaus_proto::{CheckResponse, EnrollmentStatus};

use crate::config::MpiConfig;
use crate::constants::{DEFAULT_MPI_TIMEOUT, MPI_URL, paths};
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::params::{Params, ToParams};

/// Input of the enrollment check. Every field is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollCheck {
    /// Transaction amount in minor units.
    pub amount: String,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Unique transaction identifier.
    pub order_id: String,
    /// IP address of the cardholder.
    pub cardholder_ip: String,
    /// Primary Account Number.
    pub card_number: String,
    /// Month of card expiry.
    pub card_expire_month: String,
    /// Year of card expiry.
    pub card_expire_year: String,
    /// Acquirer BIN for the card scheme.
    pub merchant_acquirer_bin: String,
    /// Country of the merchant.
    pub merchant_country: String,
    /// Merchant ID.
    pub merchant_id: String,
    /// Merchant name.
    pub merchant_name: String,
    /// URL of the merchant's site.
    pub merchant_url: String,
}

impl ToParams for EnrollCheck {
    fn write_params(&self, params: &mut Params) -> Result<()> {
        params
            .add_required("amount", &self.amount)?
            .add_required("currency", &self.currency)?
            .add_required("order_id", &self.order_id)?
            .add_required("cardholder_ip", &self.cardholder_ip)?
            .add_required("card[number]", &self.card_number)?
            .add_required("card[expire_month]", &self.card_expire_month)?
            .add_required("card[expire_year]", &self.card_expire_year)?
            .add_required("merchant[acquirer_bin]", &self.merchant_acquirer_bin)?
            .add_required("merchant[country]", &self.merchant_country)?
            .add_required("merchant[id]", &self.merchant_id)?
            .add_required("merchant[name]", &self.merchant_name)?
            .add_required("merchant[url]", &self.merchant_url)?;
        Ok(())
    }
}

/// Client for the MPI service.
#[derive(Debug, Clone)]
pub struct Mpi {
    dispatcher: Dispatcher,
}

impl Mpi {
    /// Creates a client against the production MPI.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`](crate::Error::Configuration) if the
    /// API key is blank.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_url(api_key, MPI_URL)
    }

    /// Creates a client against `mpi_url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`](crate::Error::Configuration) if the
    /// API key is blank or the URL is invalid.
    pub fn with_url(api_key: impl Into<String>, mpi_url: &str) -> Result<Self> {
        Ok(Self {
            dispatcher: Dispatcher::new(mpi_url, api_key, DEFAULT_MPI_TIMEOUT)?,
        })
    }

    /// Creates a client from an `[mpi]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`](crate::Error::Configuration) if a
    /// configured value is invalid.
    pub fn from_config(config: &MpiConfig) -> Result<Self> {
        let mut mpi = Self::with_url(config.api_key.as_str(), &config.url)?;
        if let Some(timeout) = config.timeout() {
            mpi.dispatcher.set_timeout(timeout);
        }
        Ok(mpi)
    }

    /// Sets the per-call timeout (default 40 seconds).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.dispatcher.set_timeout(timeout);
        self
    }

    /// Returns the per-call timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.dispatcher.timeout()
    }

    /// Checks whether the card is enrolled for 3-D Secure.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`](crate::Error::InvalidParameter) for a
    /// blank field, otherwise transport, protocol and decoding errors.
    pub async fn enroll_check(&self, check: &EnrollCheck) -> Result<EnrollmentStatus> {
        let params = check.to_params()?;
        self.dispatcher.post(paths::ENROLLED, &[], params, None).await
    }

    /// Verifies a `PARes` returned by the ACS.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`](crate::Error::InvalidParameter) for a
    /// blank `pares`, otherwise transport, protocol and decoding errors.
    pub async fn check_pares(&self, pares: &str) -> Result<CheckResponse> {
        let mut params = Params::new();
        params.add_required("pares", pares)?;
        self.dispatcher.post(paths::CHECK, &[], params, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SIGNATURE_HEADER;
    use crate::error::Error;
    use serde_json::json;
    use wiremock::matchers::{body_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn enroll_check() -> EnrollCheck {
        EnrollCheck {
            amount: "100".into(),
            currency: "DKK".into(),
            order_id: "order-1".into(),
            cardholder_ip: "1.1.1.1".into(),
            card_number: "4111111111111111".into(),
            card_expire_month: "12".into(),
            card_expire_year: "2030".into(),
            merchant_acquirer_bin: "412345".into(),
            merchant_country: "DK".into(),
            merchant_id: "1234".into(),
            merchant_name: "Shop".into(),
            merchant_url: "https://shop.example".into(),
        }
    }

    #[test]
    fn test_enroll_check_field_order() {
        let params = enroll_check().to_params().unwrap();
        let keys: Vec<&str> = params.pairs().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            [
                "amount",
                "currency",
                "order_id",
                "cardholder_ip",
                "card[number]",
                "card[expire_month]",
                "card[expire_year]",
                "merchant[acquirer_bin]",
                "merchant[country]",
                "merchant[id]",
                "merchant[name]",
                "merchant[url]"
            ]
        );
    }

    #[test]
    fn test_enroll_check_requires_every_field() {
        let mut check = enroll_check();
        check.merchant_url = String::new();
        let err = check.to_params().unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { ref key, .. } if key == "merchant[url]"));
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(Mpi::new("key").unwrap().timeout(), Duration::from_secs(40));
    }

    #[tokio::test]
    async fn test_enroll_check_enrolled() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/enrolled"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "acs_url": "https://acs.example/pareq",
                "pareq": "eJxVUttygjAQ",
                "enrolled": "Y"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mpi = Mpi::with_url("key", &server.uri()).unwrap();
        let status = mpi.enroll_check(&enroll_check()).await.unwrap();
        assert!(status.is_enrolled());
        assert_eq!(status.pareq.as_deref(), Some("eJxVUttygjAQ"));

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get(SIGNATURE_HEADER).is_none());
    }

    #[tokio::test]
    async fn test_check_pares() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/check"))
            .and(body_string("pares=eJzV%2BWOy"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "Y",
                "eci": "5",
                "cavv": "AAABBJg0VhI0VniQEjRWAAAAAAA="
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mpi = Mpi::with_url("key", &server.uri()).unwrap();
        let check = mpi.check_pares("eJzV+WOy").await.unwrap();
        assert_eq!(check.status.as_deref(), Some("Y"));
        assert_eq!(check.eci.as_deref(), Some("5"));
    }

    #[tokio::test]
    async fn test_check_pares_requires_value() {
        let mpi = Mpi::with_url("key", "http://127.0.0.1:9").unwrap();
        let err = mpi.check_pares(" ").await.unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { ref key, .. } if key == "pares"));
    }

    #[tokio::test]
    async fn test_unauthorized_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let mpi = Mpi::with_url("bad", &server.uri()).unwrap();
        assert!(matches!(mpi.check_pares("x").await.unwrap_err(), Error::Auth));
    }
}
