//! Wire format types for the Clearhaus gateway and 3-D Secure MPI APIs.
//!
//! This crate defines the JSON response shapes returned by the gateway
//! (`gateway.clearhaus.com`) and by the MPI service (`mpi.3dsecure.io`).
//! It depends only on `serde` and `serde_json` and carries no transport
//! logic; the `clearhaus` crate builds requests and decodes into these types.
//!
//! # Modules
//!
//! - [`status`]: The business status sub-object shared by all transactions
//! - [`transaction`]: Authorization, capture, refund, void and credit results
//! - [`account`]: Account information and tokenized cards
//! - [`mpi`]: 3-D Secure enrollment and `PARes` check responses
//!
//! # Success
//!
//! A transaction succeeded if and only if its `status.code` is
//! [`SUCCESS_CODE`]. The HTTP status of the response says nothing about the
//! business outcome; see [`Transaction::is_success`].

pub mod account;
pub mod mpi;
pub mod status;
pub mod transaction;

mod de;

pub use account::{AccountInfo, Acquirer, TokenizedCard};
pub use mpi::{CheckResponse, EnrollmentStatus, MpiError};
pub use status::{SUCCESS_CODE, Status};
pub use transaction::{Authorization, Capture, Credit, CscStatus, Refund, Transaction, Void};
