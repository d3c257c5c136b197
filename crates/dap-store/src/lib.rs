//! Storage backends and routing for the data-availability proxy.
//!
//! # Backends
//!
//! All backends implement the [`Store`] trait:
//!
//! - [`ObjectStoreBackend`] -- content-addressed object store (S3-compatible,
//!   local filesystem, or memory) keyed by `keccak256(value)`
//! - [`AvailabilityStore`] -- availability network client; reads are checked
//!   against the merkle inclusion proof in the blob's certificate
//!
//! The [`Router`] picks the backend a commitment mode requires, verifies
//! every read, and mirrors writes to a backup store when configured.
//!
//! # Design Rules
//!
//! 1. Bytes from a backend are untrusted until `verify` accepts them.
//! 2. Writing identical bytes twice is a no-op, never a conflict.
//! 3. Every backend call honors the request's [`RequestContext`].
//! 4. Backup writes are best-effort; no backend call is retried.

pub mod availability;
pub mod context;
pub mod disperser;
pub mod error;
pub mod object;
pub mod router;
pub mod stats;
pub mod traits;

pub use availability::{AvailabilityConfig, AvailabilityKind, AvailabilityStore};
pub use context::RequestContext;
pub use disperser::{
    BlobCertificate, DisperserClient, InMemoryDisperser, DEFAULT_BATCH_CAPACITY,
};
pub use error::{StoreError, StoreResult};
pub use object::{CredentialType, ObjectStoreBackend, ObjectStoreConfig, ObjectStoreKind};
pub use router::Router;
pub use stats::{Stats, StatsCounter};
pub use traits::Store;
