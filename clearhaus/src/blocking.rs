//! Blocking wrappers around [`crate::Account`] and [`crate::Mpi`].
//!
//! Each wrapper owns a current-thread Tokio runtime and drives the async
//! facade on it, so the bytes sent and the error classification are the
//! same as in async code. Do not call these from inside an async runtime.

use std::fmt;
use std::time::Duration;

use clearhaus_proto::{
    AccountInfo, Authorization, Capture, CheckResponse, Credit, EnrollmentStatus, Refund,
    TokenizedCard, Void,
};
use tokio::runtime::{Builder, Runtime};

use crate::config::{GatewayConfig, MpiConfig};
use crate::error::{Error, Result};
use crate::mpi::EnrollCheck;
use crate::payment::{AuthorizationRequest, Card, CreditRequest};

fn runtime() -> Result<Runtime> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Configuration(format!("failed to start runtime: {e}")))
}

/// Blocking gateway account.
pub struct Account {
    inner: crate::Account,
    runtime: Runtime,
}

impl Account {
    /// See [`crate::Account::new`].
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] for an invalid API key or if the runtime
    /// cannot be started.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::wrap(crate::Account::new(api_key)?)
    }

    /// See [`crate::Account::with_url`].
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] for an invalid API key or URL, or if the
    /// runtime cannot be started.
    pub fn with_url(api_key: impl Into<String>, gateway_url: &str) -> Result<Self> {
        Self::wrap(crate::Account::with_url(api_key, gateway_url)?)
    }

    /// See [`crate::Account::from_config`].
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] for an invalid configuration or if the
    /// runtime cannot be started.
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        Self::wrap(crate::Account::from_config(config)?)
    }

    /// Wraps an async account. Its connection pool becomes bound to this
    /// wrapper's runtime, so do not keep using clones of it elsewhere.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] if the runtime cannot be started.
    pub fn wrap(inner: crate::Account) -> Result<Self> {
        Ok(Self {
            inner,
            runtime: runtime()?,
        })
    }

    /// See [`crate::Account::with_timeout`].
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.with_timeout(timeout);
        self
    }

    /// See [`crate::Account::with_signing_keys`].
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] if keys are already set or invalid.
    pub fn with_signing_keys(
        mut self,
        signing_api_key: impl Into<String>,
        private_key_pem: &str,
    ) -> Result<Self> {
        self.inner = self.inner.with_signing_keys(signing_api_key, private_key_pem)?;
        Ok(self)
    }

    /// See [`crate::Account::valid_api_key`].
    ///
    /// # Errors
    ///
    /// As the async method.
    pub fn valid_api_key(&self) -> Result<bool> {
        self.runtime.block_on(self.inner.valid_api_key())
    }

    /// See [`crate::Account::fetch_account_info`].
    ///
    /// # Errors
    ///
    /// As the async method.
    pub fn fetch_account_info(&self) -> Result<AccountInfo> {
        self.runtime.block_on(self.inner.fetch_account_info())
    }

    /// See [`crate::Account::authorize`].
    ///
    /// # Errors
    ///
    /// As the async method.
    pub fn authorize(&self, request: &AuthorizationRequest) -> Result<Authorization> {
        self.runtime.block_on(self.inner.authorize(request))
    }

    /// See [`crate::Account::void`].
    ///
    /// # Errors
    ///
    /// As the async method.
    pub fn void(&self, id: &str) -> Result<Void> {
        self.runtime.block_on(self.inner.void(id))
    }

    /// See [`crate::Account::capture`].
    ///
    /// # Errors
    ///
    /// As the async method.
    pub fn capture(
        &self,
        id: &str,
        amount: Option<&str>,
        text_on_statement: Option<&str>,
    ) -> Result<Capture> {
        self.runtime
            .block_on(self.inner.capture(id, amount, text_on_statement))
    }

    /// See [`crate::Account::refund`].
    ///
    /// # Errors
    ///
    /// As the async method.
    pub fn refund(
        &self,
        id: &str,
        amount: Option<&str>,
        text_on_statement: Option<&str>,
    ) -> Result<Refund> {
        self.runtime
            .block_on(self.inner.refund(id, amount, text_on_statement))
    }

    /// See [`crate::Account::tokenize_card`].
    ///
    /// # Errors
    ///
    /// As the async method.
    pub fn tokenize_card(&self, card: &Card) -> Result<TokenizedCard> {
        self.runtime.block_on(self.inner.tokenize_card(card))
    }

    /// See [`crate::Account::credit`].
    ///
    /// # Errors
    ///
    /// As the async method.
    pub fn credit(&self, request: &CreditRequest) -> Result<Credit> {
        self.runtime.block_on(self.inner.credit(request))
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

/// Blocking MPI client.
pub struct Mpi {
    inner: crate::Mpi,
    runtime: Runtime,
}

impl Mpi {
    /// See [`crate::Mpi::new`].
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] for an invalid API key or if the runtime
    /// cannot be started.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::wrap(crate::Mpi::new(api_key)?)
    }

    /// See [`crate::Mpi::with_url`].
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] for an invalid API key or URL, or if the
    /// runtime cannot be started.
    pub fn with_url(api_key: impl Into<String>, mpi_url: &str) -> Result<Self> {
        Self::wrap(crate::Mpi::with_url(api_key, mpi_url)?)
    }

    /// See [`crate::Mpi::from_config`].
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] for an invalid configuration or if the
    /// runtime cannot be started.
    pub fn from_config(config: &MpiConfig) -> Result<Self> {
        Self::wrap(crate::Mpi::from_config(config)?)
    }

    /// Wraps an async MPI client.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] if the runtime cannot be started.
    pub fn wrap(inner: crate::Mpi) -> Result<Self> {
        Ok(Self {
            inner,
            runtime: runtime()?,
        })
    }

    /// See [`crate::Mpi::with_timeout`].
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.with_timeout(timeout);
        self
    }

    /// See [`crate::Mpi::enroll_check`].
    ///
    /// # Errors
    ///
    /// As the async method.
    pub fn enroll_check(&self, check: &EnrollCheck) -> Result<EnrollmentStatus> {
        self.runtime.block_on(self.inner.enroll_check(check))
    }

    /// See [`crate::Mpi::check_pares`].
    ///
    /// # Errors
    ///
    /// As the async method.
    pub fn check_pares(&self, pares: &str) -> Result<CheckResponse> {
        self.runtime.block_on(self.inner.check_pares(pares))
    }
}

impl fmt::Debug for Mpi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mpi")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clearhaus_proto::Transaction;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PRIVATE_PEM: &str = include_str!("../testdata/signing_key.pem");

    fn request() -> AuthorizationRequest {
        AuthorizationRequest::new(
            "100",
            "DKK",
            Card::new("4111111111111111", "12", "2020").with_csc("584"),
        )
    }

    fn start_server(test_runtime: &tokio::runtime::Runtime) -> MockServer {
        test_runtime.block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/authorizations/"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "id": "auth-1",
                    "status": { "code": 20000 }
                })))
                .mount(&server)
                .await;
            server
        })
    }

    #[test]
    fn test_blocking_and_async_send_identical_requests() {
        let test_runtime = tokio::runtime::Runtime::new().unwrap();
        let server = start_server(&test_runtime);

        let account = || {
            crate::Account::with_url("api-key", &server.uri())
                .unwrap()
                .with_signing_keys("signing-id", PRIVATE_PEM)
                .unwrap()
        };
        // Separate accounts: pooled connections are bound to the runtime
        // that opened them.
        let async_account = account();
        let blocking_account = Account::wrap(account()).unwrap();

        let auth = blocking_account.authorize(&request()).unwrap();
        assert!(auth.is_success());
        test_runtime
            .block_on(async_account.authorize(&request()))
            .unwrap();

        let requests = test_runtime
            .block_on(server.received_requests())
            .unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].body, requests[1].body);
        assert_eq!(
            requests[0].headers.get("signature"),
            requests[1].headers.get("signature")
        );
    }

    #[test]
    fn test_blocking_network_failure() {
        let account = Account::with_url("api-key", "http://127.0.0.1:9")
            .unwrap()
            .with_timeout(Duration::from_secs(2));
        let err = account.authorize(&request()).unwrap_err();
        assert!(matches!(err, Error::Network { .. }));
    }
}
