//! Client for the Clearhaus payment gateway and the 3-D Secure MPI.
//!
//! Domain operations are turned into form-encoded REST calls, optionally
//! signed with the merchant's RSA key, and responses are decoded into the
//! typed results of [`clearhaus_proto`].
//!
//! # Modules
//!
//! - [`params`]: Ordered form parameters and the body they serialize to
//! - [`payment`]: Cards, wallets and authorization/credit requests
//! - [`signing`]: `RS256-hex` request signatures
//! - [`dispatch`]: HTTP dispatch and error classification
//! - [`gateway`]: The [`Account`] facade
//! - [`mpi`]: The [`Mpi`] facade for 3-D Secure
//! - [`config`]: TOML configuration with environment expansion
//! - [`blocking`]: Blocking wrappers (feature: `blocking`)
//!
//! # Success and errors
//!
//! A call returns `Err` only for transport, protocol, configuration and
//! parameter problems. A gateway refusal is a decoded result whose
//! [`Transaction::is_success`] is `false`.
//!
//! # Feature Flags
//!
//! - `blocking`: Blocking wrappers driving the async facades (default)
//! - `telemetry`: `tracing` spans and events around every request (default)

pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod mpi;
pub mod params;
pub mod payment;
pub mod signing;

#[cfg(feature = "blocking")]
pub mod blocking;

pub use clearhaus_proto as proto;
pub use clearhaus_proto::{
    AccountInfo, Authorization, Capture, CheckResponse, Credit, EnrollmentStatus, Refund, Status,
    TokenizedCard, Transaction, Void,
};
pub use config::{ClientConfig, GatewayConfig, MpiConfig, SigningConfig};
pub use constants::{GATEWAY_TEST_URL, GATEWAY_URL, MPI_TEST_URL, MPI_URL};
pub use error::{Error, Result};
pub use gateway::Account;
pub use mpi::{EnrollCheck, Mpi};
pub use params::{FormBody, Params, ToParams};
pub use payment::{
    ApplePayInfo, AuthorizationOptions, AuthorizationRequest, Card, CreditRequest,
    MobilePayOnlineInfo, PaymentMethod,
};
pub use signing::RequestSigner;
