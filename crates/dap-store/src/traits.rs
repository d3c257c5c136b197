use async_trait::async_trait;
use bytes::Bytes;
use dap_types::{BackendType, BlobKey};

use crate::context::RequestContext;
use crate::error::StoreResult;
use crate::stats::Stats;

/// Capability interface shared by every storage backend.
///
/// All implementations must satisfy these invariants:
/// - Writing identical bytes under the same key is a no-op, never a conflict.
/// - `get` maps only a genuine "absent" signal to [`StoreError::NotFound`];
///   every other failure is a backend error.
/// - I/O honors the supplied [`RequestContext`].
/// - Bytes returned by `get` are untrusted until `verify` accepts them.
///
/// [`StoreError::NotFound`]: crate::StoreError::NotFound
#[async_trait]
pub trait Store: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, ctx: &RequestContext, key: &BlobKey) -> StoreResult<Bytes>;

    /// Store `value` under `key`.
    async fn put(&self, ctx: &RequestContext, key: &BlobKey, value: Bytes) -> StoreResult<()>;

    /// Check that `value` is the content `key` commits to.
    fn verify(&self, key: &BlobKey, value: &[u8]) -> StoreResult<()>;

    /// Snapshot of this backend's counters.
    fn stats(&self) -> Stats;

    fn backend_type(&self) -> BackendType;
}
