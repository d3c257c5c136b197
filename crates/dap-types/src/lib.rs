//! Foundation types for the data-availability proxy.
//!
//! Every other proxy crate depends on `dap-types`.
//!
//! # Key Types
//!
//! - [`BlobKey`]: 32-byte content-addressed key (Keccak-256 of the blob)
//! - [`Mode`]: commitment encoding dialect negotiated with the client
//! - [`Commitment`]: a decoded commitment (mode, version and key)
//! - [`CommitmentMeta`]: per-request labels used for metrics and logging
//! - [`BackendType`]: tag identifying a storage backend implementation

pub mod backend;
pub mod commitment;
pub mod error;
pub mod key;

pub use backend::BackendType;
pub use commitment::{Commitment, CommitmentMeta, Mode};
pub use error::TypeError;
pub use key::{BlobKey, KEY_LENGTH};
