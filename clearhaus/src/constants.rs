//! Endpoints, resource paths, header names and defaults.

use std::time::Duration;

/// Production gateway endpoint.
pub const GATEWAY_URL: &str = "https://gateway.clearhaus.com";

/// Test gateway endpoint.
pub const GATEWAY_TEST_URL: &str = "https://gateway.test.clearhaus.com";

/// Production MPI (3-D Secure) endpoint.
pub const MPI_URL: &str = "https://mpi.3dsecure.io";

/// Test MPI endpoint. Directory server test environments are often down,
/// so this is rarely useful end-to-end.
pub const MPI_TEST_URL: &str = "https://mpi.test.3dsecure.io";

/// Default per-call timeout for gateway requests.
pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(30);

/// Default per-call timeout for MPI requests.
pub const DEFAULT_MPI_TIMEOUT: Duration = Duration::from_secs(40);

/// HTTP header that carries the request signature.
pub const SIGNATURE_HEADER: &str = "Signature";

/// Signature scheme label placed between signing key and signature.
pub const SIGNATURE_SCHEME: &str = "RS256-hex";

/// Content type of every POST body.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Gateway resource paths. `{0}` is a positional path segment.
pub mod paths {
    /// API root, used to validate the API key.
    pub const ROOT: &str = "";
    /// Account information.
    pub const ACCOUNT: &str = "account/";
    /// Authorization collection.
    pub const AUTHORIZATIONS: &str = "authorizations/";
    /// Voids of authorization `{0}`.
    pub const VOIDS: &str = "authorizations/{0}/voids";
    /// Captures of authorization `{0}`.
    pub const CAPTURES: &str = "authorizations/{0}/captures";
    /// Refunds of authorization `{0}`.
    pub const REFUNDS: &str = "authorizations/{0}/refunds";
    /// Card tokenization.
    pub const CARDS: &str = "cards/";
    /// Credits to tokenized card `{0}`.
    pub const CREDITS: &str = "cards/{0}/credits";
    /// MPI enrollment check.
    pub const ENROLLED: &str = "/enrolled";
    /// MPI `PARes` verification.
    pub const CHECK: &str = "/check";
}
