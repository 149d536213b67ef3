//! Ordered form parameters and their serialized body.
//!
//! [`Params`] is append-only. Insertion order is preserved all the way into
//! the body bytes, and those exact bytes are what gets signed, so two sets
//! with the same pairs in a different order are different requests.
//!
//! Domain types describe their fields through [`ToParams`], a hand-written
//! mapping that decides for each field its form key and whether it is
//! required (blank is an error) or optional (blank is omitted).

use url::form_urlencoded;

use crate::error::{Error, Result};

/// Describes how a domain type maps onto form parameters.
pub trait ToParams {
    /// Appends this value's fields to `params`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if a required field is blank.
    fn write_params(&self, params: &mut Params) -> Result<()>;

    /// Collects this value's fields into a fresh [`Params`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if a required field is blank.
    fn to_params(&self) -> Result<Params> {
        let mut params = Params::new();
        self.write_params(&mut params)?;
        Ok(params)
    }
}

/// An ordered list of `(key, value)` form parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    pairs: Vec<(String, String)>,
}

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Appends a pair unconditionally.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    /// Appends a pair only if `value` is present and not blank.
    pub fn add_if_present<V: AsRef<str>>(
        &mut self,
        key: impl Into<String>,
        value: Option<V>,
    ) -> &mut Self {
        if let Some(value) = value {
            let value = value.as_ref();
            if !is_blank(value) {
                self.pairs.push((key.into(), value.to_owned()));
            }
        }
        self
    }

    /// Appends a pair whose value must not be blank.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] naming `key` if `value` is empty or
    /// whitespace.
    pub fn add_required(&mut self, key: impl Into<String>, value: &str) -> Result<&mut Self> {
        let key = key.into();
        if is_blank(value) {
            return Err(Error::missing(key));
        }
        self.pairs.push((key, value.to_owned()));
        Ok(self)
    }

    /// Appends every pair of `other`, keeping its order.
    pub fn add_all(&mut self, other: Self) -> &mut Self {
        self.pairs.extend(other.pairs);
        self
    }

    /// Appends the fields of `value`.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::InvalidParameter`] from the mapping.
    pub fn add_from<T: ToParams + ?Sized>(&mut self, value: &T) -> Result<&mut Self> {
        value.write_params(self)?;
        Ok(self)
    }

    /// Returns the pairs in insertion order.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Returns the first value stored for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if no pairs were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Serializes the set into an `application/x-www-form-urlencoded` body,
    /// consuming it.
    #[must_use]
    pub fn into_body(self) -> FormBody {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.pairs)
            .finish();
        FormBody(encoded.into_bytes())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A serialized request body.
///
/// The same buffer is handed to the signer and then sent on the wire.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct FormBody(Vec<u8>);

impl FormBody {
    /// Returns the body bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the body length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for an empty body.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the owned bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

// Bodies carry PANs and CSCs.
impl std::fmt::Debug for FormBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormBody")
            .field("len", &self.0.len())
            .finish_non_exhaustive()
    }
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_string(params: Params) -> String {
        String::from_utf8(params.into_body().into_bytes()).unwrap()
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let mut params = Params::new();
        params.add("b", "2").add("a", "1").add("c", "3");
        assert_eq!(body_string(params), "b=2&a=1&c=3");
    }

    #[test]
    fn test_order_changes_body() {
        let mut first = Params::new();
        first.add("amount", "100").add("currency", "DKK");
        let mut second = Params::new();
        second.add("currency", "DKK").add("amount", "100");
        assert_ne!(first.into_body(), second.into_body());
    }

    #[test]
    fn test_keys_and_values_are_percent_encoded() {
        let mut params = Params::new();
        params
            .add("card[pan]", "4111111111111111")
            .add("text_on_statement", "a b&c=d");
        assert_eq!(
            body_string(params),
            "card%5Bpan%5D=4111111111111111&text_on_statement=a+b%26c%3Dd"
        );
    }

    #[test]
    fn test_add_if_present_skips_blank() {
        let mut params = Params::new();
        params
            .add_if_present("a", Some("x"))
            .add_if_present("b", Some(""))
            .add_if_present("c", Some("   "))
            .add_if_present("d", None::<&str>)
            .add_if_present("e", Some(String::from("y")));
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("a"), Some("x"));
        assert_eq!(params.get("e"), Some("y"));
        assert!(params.get("b").is_none());
    }

    #[test]
    fn test_add_required_rejects_blank() {
        let mut params = Params::new();
        let err = params.add_required("amount", " ").unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { ref key, .. } if key == "amount"));
        assert!(params.is_empty());
        params.add_required("amount", "100").unwrap();
        assert_eq!(params.get("amount"), Some("100"));
    }

    #[test]
    fn test_add_all_keeps_caller_order() {
        let mut params = Params::new();
        params.add("amount", "100");
        params.add_all([("ip", "1.1.1.1"), ("reference", "r1")].into_iter().collect());
        let keys: Vec<&str> = params.pairs().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["amount", "ip", "reference"]);
    }

    #[test]
    fn test_duplicates_are_not_merged() {
        let mut params = Params::new();
        params.add("k", "1").add("k", "2");
        assert_eq!(body_string(params), "k=1&k=2");
    }

    #[test]
    fn test_empty_params_give_empty_body() {
        assert!(Params::new().into_body().is_empty());
    }

    #[test]
    fn test_form_body_debug_hides_content() {
        let mut params = Params::new();
        params.add("card[pan]", "4111111111111111");
        let debug = format!("{:?}", params.into_body());
        assert!(!debug.contains("4111"));
    }
}
