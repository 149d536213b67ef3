//! HTTP dispatch and outcome classification.
//!
//! A [`Dispatcher`] knows one base URL, one API key and one timeout. It
//! sends each request with HTTP Basic authentication (the API key as user
//! name, empty password) and sorts the outcome into the [`Error`] taxonomy:
//!
//! 1. transport failure, including timeouts and body reads: [`Error::Network`]
//! 2. `401`: [`Error::Auth`]
//! 3. `500`: [`Error::Gateway`]
//! 4. anything other than `200`, `201` or `400`: [`Error::Protocol`]
//! 5. otherwise the JSON body is decoded, failing with [`Error::Decode`]
//!
//! A `400` carries a regular result document whose `status.code` explains
//! the rejection, so it is decoded like a success.

use std::fmt;
use std::fmt::Display;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::{Span, instrument};

use crate::constants::{FORM_CONTENT_TYPE, SIGNATURE_HEADER};
use crate::error::{Error, Result};
use crate::params::{Params, is_blank};
use crate::signing::RequestSigner;

/// Sends requests to one remote service.
///
/// Clones share the connection pool.
#[derive(Clone)]
pub struct Dispatcher {
    base_url: Url,
    api_key: String,
    timeout: Duration,
    client: Client,
}

impl Dispatcher {
    /// Creates a dispatcher for `base_url`.
    ///
    /// Trailing slashes on `base_url` are normalized, so
    /// `https://gateway.clearhaus.com` and `https://gateway.clearhaus.com/`
    /// resolve resources identically.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the URL does not parse, cannot carry
    /// a path, or the API key is blank.
    pub fn new(base_url: &str, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let api_key = api_key.into();
        if is_blank(&api_key) {
            return Err(Error::Configuration("API key must be supplied".to_owned()));
        }
        let mut normalized = base_url.trim().trim_end_matches('/').to_owned();
        normalized.push('/');
        let base_url = Url::parse(&normalized)
            .map_err(|e| Error::Configuration(format!("invalid base URL `{base_url}`: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Configuration(format!(
                "base URL `{base_url}` cannot carry a path"
            )));
        }
        Ok(Self {
            base_url,
            api_key,
            timeout,
            client: Client::new(),
        })
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the per-call timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Replaces the per-call timeout.
    pub const fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Resolves a resource path against the base URL.
    ///
    /// `{N}` parts of `template` are replaced by `segments[N]`, each inserted
    /// as a single percent-encoded path segment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if a referenced segment is missing
    /// or blank.
    pub fn resolve(&self, template: &str, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                Error::Configuration("base URL cannot carry a path".to_owned())
            })?;
            path.pop_if_empty();
            for part in template.trim_start_matches('/').split('/') {
                match placeholder(part) {
                    Some(index) => {
                        let segment = segments
                            .get(index)
                            .copied()
                            .filter(|s| !is_blank(s))
                            .ok_or_else(|| Error::InvalidParameter {
                                key: format!("segment {index}"),
                                reason: "path segment must be supplied",
                            })?;
                        path.push(segment);
                    }
                    None => {
                        path.push(part);
                    }
                }
            }
        }
        Ok(url)
    }

    /// Issues an authenticated `GET` and decodes the response.
    ///
    /// # Errors
    ///
    /// See the module documentation for the classification.
    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "clearhaus.request",
            skip_all,
            fields(
                http.method = "GET",
                path = template,
                http.status_code = tracing::field::Empty,
                otel.status_code = tracing::field::Empty,
                error.message = tracing::field::Empty,
            )
        )
    )]
    pub async fn get<R>(&self, template: &str, segments: &[&str]) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let context = format!("GET {template}");
        let result = self
            .get_inner(template, segments, &context)
            .await
            .and_then(|(_, body)| decode(&body, context));
        record_result_on_span(&result);
        result
    }

    /// Issues an authenticated `GET` and reports whether the remote answered
    /// with a 2xx status, without decoding the body.
    ///
    /// # Errors
    ///
    /// Same classification as [`Dispatcher::get`], minus decoding.
    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "clearhaus.request",
            skip_all,
            fields(
                http.method = "GET",
                path = template,
                http.status_code = tracing::field::Empty,
                otel.status_code = tracing::field::Empty,
                error.message = tracing::field::Empty,
            )
        )
    )]
    pub async fn probe(&self, template: &str) -> Result<bool> {
        let context = format!("GET {template}");
        let result = self
            .get_inner(template, &[], &context)
            .await
            .map(|(status, _)| status.is_success());
        record_result_on_span(&result);
        result
    }

    /// Serializes `params`, signs the body when `signer` is given, and
    /// issues an authenticated form `POST`.
    ///
    /// The bytes handed to the signer are the bytes transmitted.
    ///
    /// # Errors
    ///
    /// [`Error::Crypto`] if signing fails, otherwise see the module
    /// documentation.
    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "clearhaus.request",
            skip_all,
            fields(
                http.method = "POST",
                path = template,
                signed = signer.is_some(),
                http.status_code = tracing::field::Empty,
                otel.status_code = tracing::field::Empty,
                error.message = tracing::field::Empty,
            )
        )
    )]
    pub async fn post<R>(
        &self,
        template: &str,
        segments: &[&str],
        params: Params,
        signer: Option<&RequestSigner>,
    ) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let context = format!("POST {template}");
        let result = self
            .post_inner(template, segments, params, signer, &context)
            .await
            .and_then(|body| decode(&body, context));
        record_result_on_span(&result);
        result
    }

    async fn get_inner(
        &self,
        template: &str,
        segments: &[&str],
        context: &str,
    ) -> Result<(StatusCode, Vec<u8>)> {
        let url = self.resolve(template, segments)?;
        self.execute(self.client.get(url), context).await
    }

    async fn post_inner(
        &self,
        template: &str,
        segments: &[&str],
        params: Params,
        signer: Option<&RequestSigner>,
        context: &str,
    ) -> Result<Vec<u8>> {
        let url = self.resolve(template, segments)?;
        let body = params.into_body();
        let mut request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        if let Some(signer) = signer {
            let signature = signer.signature_header(body.as_bytes())?;
            request = request.header(SIGNATURE_HEADER, signature);
        }
        let (_, response) = self
            .execute(request.body(body.into_bytes()), context)
            .await?;
        Ok(response)
    }

    async fn execute(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<(StatusCode, Vec<u8>)> {
        let response = request
            .basic_auth(&self.api_key, Some(""))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| Error::Network {
                context: context.to_owned(),
                source,
            })?;
        let status = response.status();
        record_status_on_span(status);
        let body = response
            .bytes()
            .await
            .map_err(|source| Error::Network {
                context: context.to_owned(),
                source,
            })?;
        classify(status, &body)?;
        Ok((status, body.to_vec()))
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Maps a status onto the error taxonomy. `Ok` means the body is a result
/// document.
fn classify(status: StatusCode, body: &[u8]) -> Result<()> {
    match status {
        StatusCode::UNAUTHORIZED => Err(Error::Auth),
        StatusCode::INTERNAL_SERVER_ERROR => Err(Error::Gateway {
            body: String::from_utf8_lossy(body).into_owned(),
        }),
        StatusCode::OK | StatusCode::CREATED | StatusCode::BAD_REQUEST => Ok(()),
        _ => Err(Error::Protocol {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        }),
    }
}

fn decode<R: DeserializeOwned>(body: &[u8], context: String) -> Result<R> {
    serde_json::from_slice(body).map_err(|source| Error::Decode { context, source })
}

/// Parses `{N}` into `N`.
fn placeholder(part: &str) -> Option<usize> {
    part.strip_prefix('{')?.strip_suffix('}')?.parse().ok()
}

/// Records the outcome of a request on the current span.
#[cfg(feature = "telemetry")]
fn record_result_on_span<R, E: Display>(result: &std::result::Result<R, E>) {
    let span = Span::current();
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            span.record("error.message", tracing::field::display(err));
            tracing::event!(tracing::Level::ERROR, error = %err, "Request to remote failed");
        }
    }
}

/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
fn record_result_on_span<R, E: Display>(_result: &std::result::Result<R, E>) {}

#[cfg(feature = "telemetry")]
fn record_status_on_span(status: StatusCode) {
    Span::current().record("http.status_code", status.as_u16());
}

#[cfg(not(feature = "telemetry"))]
const fn record_status_on_span(_status: StatusCode) {}
