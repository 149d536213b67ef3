//! `RS256-hex` request signing.
//!
//! The signature is RSA PKCS#1 v1.5 over SHA-256 of the exact body bytes,
//! hex encoded in lowercase. PKCS#1 v1.5 is deterministic, so the same key
//! and the same body always give the same header.

use std::fmt;

use reqwest::header::HeaderValue;
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use sha2::Sha256;

use crate::constants::SIGNATURE_SCHEME;
use crate::error::{Error, Result};
use crate::params::is_blank;

/// Signs request bodies with a merchant's RSA key.
#[derive(Clone)]
pub struct RequestSigner {
    signing_id: String,
    key: SigningKey<Sha256>,
}

impl RequestSigner {
    /// Creates a signer from the signing API key and an RSA private key in
    /// PEM form (PKCS#1 `RSA PRIVATE KEY` or PKCS#8 `PRIVATE KEY`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if either argument is blank, the
    /// signing API key cannot be sent in a header, or the key does not parse
    /// or validate.
    pub fn from_pem(signing_id: impl Into<String>, private_key_pem: &str) -> Result<Self> {
        let signing_id = signing_id.into();
        if is_blank(&signing_id) {
            return Err(Error::Configuration(
                "signing API key must be supplied".to_owned(),
            ));
        }
        if signing_id.contains(char::is_whitespace) || HeaderValue::from_str(&signing_id).is_err() {
            return Err(Error::Configuration(
                "signing API key is not a valid header token".to_owned(),
            ));
        }
        if is_blank(private_key_pem) {
            return Err(Error::Configuration(
                "signing private key must be supplied".to_owned(),
            ));
        }
        let key = parse_private_key(private_key_pem.trim())?;
        key.validate()
            .map_err(|e| Error::Configuration(format!("invalid RSA private key: {e}")))?;
        Ok(Self {
            signing_id,
            key: SigningKey::<Sha256>::new(key),
        })
    }

    /// Returns the signing API key placed in front of every signature.
    #[must_use]
    pub fn signing_id(&self) -> &str {
        &self.signing_id
    }

    /// Signs `body` and returns the lowercase hex signature.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Crypto`] if the RSA primitive fails.
    pub fn sign(&self, body: &[u8]) -> Result<String> {
        let signature = self
            .key
            .try_sign(body)
            .map_err(|e| Error::Crypto(e.to_string()))?;
        Ok(hex::encode(signature.to_bytes()))
    }

    /// Renders the `Signature` header value for `body`:
    /// `<signing-api-key> RS256-hex <signature>`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Crypto`] if the RSA primitive fails.
    pub fn signature_header(&self, body: &[u8]) -> Result<String> {
        let signature = self.sign(body)?;
        Ok(format!("{} {SIGNATURE_SCHEME} {signature}", self.signing_id()))
    }
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("signing_id", &self.signing_id)
            .finish_non_exhaustive()
    }
}

fn parse_private_key(pem: &str) -> Result<RsaPrivateKey> {
    match RsaPrivateKey::from_pkcs1_pem(pem) {
        Ok(key) => Ok(key),
        Err(pkcs1_err) => RsaPrivateKey::from_pkcs8_pem(pem).map_err(|pkcs8_err| {
            Error::Configuration(format!(
                "failed to parse RSA private key (PKCS#1: {pkcs1_err}; PKCS#8: {pkcs8_err})"
            ))
        }),
    }
}
