//! Error taxonomy for the request pipeline.
//!
//! Only transport, protocol and configuration problems are errors. A
//! response that decodes into a result with a non-success status code is a
//! normal return value; check [`Transaction::is_success`].
//!
//! # Recovery
//!
//! - [`Error::Network`] and [`Error::Gateway`] are transient: retry with backoff
//! - [`Error::Auth`] needs new credentials
//! - [`Error::Configuration`] and [`Error::InvalidParameter`] need a code or config fix
//! - [`Error::Protocol`], [`Error::Decode`] and [`Error::Crypto`] are unexpected: report upward
//!
//! [`Transaction::is_success`]: clearhaus_proto::Transaction::is_success

use reqwest::StatusCode;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building, signing, sending or decoding a request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection, DNS, TLS or timeout failure.
    #[error("network error: {context}: {source}")]
    Network {
        /// Request that failed, e.g. `POST authorizations/`.
        context: String,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// The remote rejected the API key (HTTP 401).
    #[error("invalid API key")]
    Auth,

    /// The remote answered with HTTP 500.
    #[error("remote server responded with internal server error: {body}")]
    Gateway {
        /// The response body.
        body: String,
    },

    /// The remote answered with an HTTP status outside the accepted set.
    #[error("unexpected HTTP status {status}: {body}")]
    Protocol {
        /// The HTTP status code.
        status: StatusCode,
        /// The response body.
        body: String,
    },

    /// Missing or malformed configuration, including signing credentials.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Signature computation failed.
    #[error("signature computation failed: {0}")]
    Crypto(String),

    /// A request field was missing, blank or not allowed in this combination.
    #[error("invalid parameter `{key}`: {reason}")]
    InvalidParameter {
        /// Form key or path segment name.
        key: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// The body of an accepted response was not the expected JSON.
    #[error("failed to decode response body: {context}: {source}")]
    Decode {
        /// Request whose response failed to decode.
        context: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Returns `true` for errors that may succeed when the same request is
    /// issued again later (network and HTTP 500).
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Gateway { .. })
    }

    /// Returns `true` if the error was caused by the call timing out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network { source, .. } if source.is_timeout())
    }

    pub(crate) fn missing(key: impl Into<String>) -> Self {
        Self::InvalidParameter {
            key: key.into(),
            reason: "must be supplied",
        }
    }
}
