use std::sync::Arc;

use bytes::Bytes;

use dap_crypto::blob_key;
use dap_types::{BlobKey, Mode};

use crate::context::RequestContext;
use crate::error::{StoreError, StoreResult};
use crate::stats::Stats;
use crate::traits::Store;

/// Routes reads and writes to the backend each commitment mode requires.
///
/// - `OptimismGeneric` blobs live in the object store.
/// - `Simple` and `OptimismAltDA` blobs live on the availability network.
///   With backup enabled they are also mirrored to the object store, which
///   then serves as a fallback on availability read misses.
///
/// Every read is verified by the backend that served it before it is
/// returned.
pub struct Router {
    availability: Option<Arc<dyn Store>>,
    object: Option<Arc<dyn Store>>,
    backup: bool,
}

impl Router {
    pub fn new(
        availability: Option<Arc<dyn Store>>,
        object: Option<Arc<dyn Store>>,
        backup: bool,
    ) -> Self {
        if backup && object.is_none() {
            tracing::warn!("backup requested without an object store; writes will not be mirrored");
        }
        Self {
            availability,
            object,
            backup,
        }
    }

    pub fn availability_store(&self) -> Option<&Arc<dyn Store>> {
        self.availability.as_ref()
    }

    pub fn object_store(&self) -> Option<&Arc<dyn Store>> {
        self.object.as_ref()
    }

    pub fn availability_stats(&self) -> Option<Stats> {
        self.availability.as_ref().map(|s| s.stats())
    }

    pub fn object_stats(&self) -> Option<Stats> {
        self.object.as_ref().map(|s| s.stats())
    }

    fn primary(&self, mode: Mode) -> StoreResult<&Arc<dyn Store>> {
        let store = if mode.is_network_addressed() {
            self.availability.as_ref()
        } else {
            self.object.as_ref()
        };
        store.ok_or(StoreError::NoBackend(mode))
    }

    /// The mirror for writes in `mode`, if one is active.
    fn secondary(&self, mode: Mode) -> Option<&Arc<dyn Store>> {
        if self.backup && mode.is_network_addressed() {
            self.object.as_ref()
        } else {
            None
        }
    }

    /// Read the blob for `key` in `mode`.
    pub async fn get(&self, ctx: &RequestContext, key: &BlobKey, mode: Mode) -> StoreResult<Bytes> {
        let primary = self.primary(mode)?;
        match (read_verified(primary.as_ref(), ctx, key).await, self.secondary(mode)) {
            (Err(StoreError::NotFound(_)), Some(fallback)) => {
                tracing::info!(key = %key.short_hex(), %mode, "primary miss, reading from fallback");
                read_verified(fallback.as_ref(), ctx, key).await
            }
            (result, _) => result,
        }
    }

    /// Write `value` in `mode` and return its canonical key.
    ///
    /// Without a supplied key the key is the Keccak-256 hash of `value`. A
    /// supplied key must equal that hash; it is rejected before any backend
    /// is touched otherwise. Backup writes are best-effort: a failure is logged and the put still
    /// succeeds.
    pub async fn put(
        &self,
        ctx: &RequestContext,
        mode: Mode,
        key: Option<BlobKey>,
        value: Bytes,
    ) -> StoreResult<BlobKey> {
        let primary = self.primary(mode)?;
        let computed = blob_key(&value);
        let key = match key {
            Some(supplied) if supplied != computed => {
                return Err(StoreError::KeyMismatch { supplied, computed });
            }
            _ => computed,
        };

        primary.put(ctx, &key, value.clone()).await?;
        tracing::debug!(key = %key.short_hex(), %mode, backend = %primary.backend_type(), "blob written");

        if let Some(secondary) = self.secondary(mode) {
            if let Err(err) = secondary.put(ctx, &key, value).await {
                tracing::warn!(
                    key = %key.short_hex(),
                    backend = %secondary.backend_type(),
                    error = %err,
                    "backup write failed"
                );
            }
        }

        Ok(key)
    }
}

async fn read_verified(store: &dyn Store, ctx: &RequestContext, key: &BlobKey) -> StoreResult<Bytes> {
    let data = store.get(ctx, key).await?;
    if let Err(err) = store.verify(key, &data) {
        tracing::error!(
            key = %key,
            backend = %store.backend_type(),
            error = %err,
            "read failed verification"
        );
        return Err(err);
    }
    Ok(data)
}
