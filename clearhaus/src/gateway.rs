//! Gateway account facade.
//!
//! An [`Account`] wraps one API key and, optionally, a signing credential.
//! Every `POST` it issues is signed once a credential has been set; `GET`
//! requests never are.
//!
//! ```no_run
//! use clearhaus::{Account, AuthorizationRequest, Card, Transaction};
//!
//! # async fn run() -> clearhaus::Result<()> {
//! let account = Account::with_url("my-api-key", clearhaus::GATEWAY_TEST_URL)?;
//! let card = Card::new("4111111111111111", "12", "2030").with_csc("123");
//! let auth = account
//!     .authorize(&AuthorizationRequest::new("100", "DKK", card))
//!     .await?;
//! if !auth.is_success() {
//!     println!("declined: {}", auth.status());
//! }
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use clearhaus_proto::{
    AccountInfo, Authorization, Capture, Credit, Refund, Status, TokenizedCard, Void,
};

use crate::config::GatewayConfig;
use crate::constants::{DEFAULT_GATEWAY_TIMEOUT, GATEWAY_URL, paths};
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::params::{Params, ToParams};
use crate::payment::{AuthorizationRequest, Card, CreditRequest};
use crate::signing::RequestSigner;

/// A merchant account at the Clearhaus gateway.
#[derive(Debug, Clone)]
pub struct Account {
    dispatcher: Dispatcher,
    signer: Option<RequestSigner>,
}

impl Account {
    /// Creates an account against the production gateway.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the API key is blank.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_url(api_key, GATEWAY_URL)
    }

    /// Creates an account against `gateway_url`, e.g.
    /// [`GATEWAY_TEST_URL`](crate::GATEWAY_TEST_URL).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the API key is blank or the URL is
    /// invalid.
    pub fn with_url(api_key: impl Into<String>, gateway_url: &str) -> Result<Self> {
        Ok(Self {
            dispatcher: Dispatcher::new(gateway_url, api_key, DEFAULT_GATEWAY_TIMEOUT)?,
            signer: None,
        })
    }

    /// Creates an account from a `[gateway]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if any configured value is invalid,
    /// including the signing credential.
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        let mut account = Self::with_url(config.api_key.as_str(), &config.url)?;
        if let Some(timeout) = config.timeout() {
            account.dispatcher.set_timeout(timeout);
        }
        if let Some(signing) = &config.signing {
            account = account.with_signing_keys(signing.api_key.as_str(), &signing.private_key)?;
        }
        Ok(account)
    }

    /// Sets the per-call timeout (default 30 seconds).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.dispatcher.set_timeout(timeout);
        self
    }

    /// Signs all subsequent `POST` requests with the given credential.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if a credential is already set, or if
    /// the credential is blank or the key is not a valid RSA private key.
    pub fn with_signing_keys(
        mut self,
        signing_api_key: impl Into<String>,
        private_key_pem: &str,
    ) -> Result<Self> {
        if self.signer.is_some() {
            return Err(Error::Configuration(
                "signing keys are already set for this account".to_owned(),
            ));
        }
        self.signer = Some(RequestSigner::from_pem(signing_api_key, private_key_pem)?);
        Ok(self)
    }

    /// Returns `true` if `POST` requests are signed.
    #[must_use]
    pub const fn is_signing(&self) -> bool {
        self.signer.is_some()
    }

    /// Returns the per-call timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.dispatcher.timeout()
    }

    /// Checks the API key against the gateway root.
    ///
    /// # Errors
    ///
    /// Any error other than [`Error::Auth`] and [`Error::Protocol`], which
    /// yield `Ok(false)`.
    pub async fn valid_api_key(&self) -> Result<bool> {
        match self.dispatcher.probe(paths::ROOT).await {
            Err(Error::Auth | Error::Protocol { .. }) => Ok(false),
            other => other,
        }
    }

    /// Fetches merchant information for the account.
    ///
    /// # Errors
    ///
    /// Transport, protocol and decoding errors from the dispatcher.
    pub async fn fetch_account_info(&self) -> Result<AccountInfo> {
        self.dispatcher.get(paths::ACCOUNT, &[]).await
    }

    /// Reserves money on a card, MobilePay Online or Apple Pay instrument.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] for a blank required field, otherwise
    /// transport, protocol and decoding errors. A declined authorization is
    /// an `Ok` result with a non-success status.
    pub async fn authorize(&self, request: &AuthorizationRequest) -> Result<Authorization> {
        let params = request.to_params()?;
        self.post(paths::AUTHORIZATIONS, &[], params).await
    }

    /// Voids authorization `id`, releasing the reserved money.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] for a blank `id`, otherwise transport,
    /// protocol and decoding errors.
    pub async fn void(&self, id: &str) -> Result<Void> {
        self.post(paths::VOIDS, &[id], Params::new()).await
    }

    /// Captures money from authorization `id`. Without `amount` the full
    /// remaining amount is captured.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] for a blank `id`, otherwise transport,
    /// protocol and decoding errors.
    pub async fn capture(
        &self,
        id: &str,
        amount: Option<&str>,
        text_on_statement: Option<&str>,
    ) -> Result<Capture> {
        let mut params = Params::new();
        params
            .add_if_present("text_on_statement", text_on_statement)
            .add_if_present("amount", amount);
        self.post(paths::CAPTURES, &[id], params).await
    }

    /// Refunds money captured on authorization `id`. Without `amount` the
    /// full captured amount is refunded.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] for a blank `id`, otherwise transport,
    /// protocol and decoding errors.
    pub async fn refund(
        &self,
        id: &str,
        amount: Option<&str>,
        text_on_statement: Option<&str>,
    ) -> Result<Refund> {
        let mut params = Params::new();
        params
            .add_if_present("amount", amount)
            .add_if_present("text_on_statement", text_on_statement);
        self.post(paths::REFUNDS, &[id], params).await
    }

    /// Tokenizes `card` for later credits.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] for a blank required card field, otherwise
    /// transport, protocol and decoding errors.
    pub async fn tokenize_card(&self, card: &Card) -> Result<TokenizedCard> {
        let params = card.to_params()?;
        self.post(paths::CARDS, &[], params).await
    }

    /// Transfers money to a card.
    ///
    /// The card is tokenized first. If tokenization does not produce a usable
    /// card id, no credit is attempted and the returned [`Credit`] carries
    /// the tokenization status.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] for a blank required field, otherwise
    /// transport, protocol and decoding errors from either call.
    pub async fn credit(&self, request: &CreditRequest) -> Result<Credit> {
        let token = self.tokenize_card(&request.card).await?;
        let Some(card_id) = token.usable_id() else {
            #[cfg(feature = "telemetry")]
            tracing::warn!(
                status = ?token.status,
                "card tokenization failed, credit not attempted"
            );
            let status = token
                .status
                .unwrap_or_else(|| Status::new(0, "card tokenization returned no card id"));
            return Ok(Credit::not_attempted(status));
        };
        let params = request.credit_params(card_id)?;
        self.post(paths::CREDITS, &[card_id], params).await
    }

    async fn post<R>(&self, template: &str, segments: &[&str], params: Params) -> Result<R>
    where
        R: serde::de::DeserializeOwned,
    {
        self.dispatcher
            .post(template, segments, params, self.signer.as_ref())
            .await
    }
}
