use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use dap_crypto::keccak256;
use dap_types::{BackendType, BlobKey};

use crate::context::RequestContext;
use crate::disperser::{BlobCertificate, DisperserClient, InMemoryDisperser};
use crate::error::{StoreError, StoreResult};
use crate::stats::{Stats, StatsCounter};
use crate::traits::Store;

/// Which availability network client to run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityKind {
    /// Process-local network.
    #[default]
    Memory,
}

/// Configuration of the availability-network backend.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailabilityConfig {
    pub kind: AvailabilityKind,
    /// Count reads and writes.
    pub profiling: bool,
}

/// Store backed by the availability network.
///
/// Certificates returned by the network are kept per key. Reads are only
/// trusted once `verify` has checked the content hash and recomputed the
/// certificate's merkle root from its inclusion proof.
pub struct AvailabilityStore {
    client: Arc<dyn DisperserClient>,
    certificates: RwLock<HashMap<BlobKey, BlobCertificate>>,
    stats: StatsCounter,
}

impl AvailabilityStore {
    pub fn new(client: Arc<dyn DisperserClient>, profiling: bool) -> Self {
        Self {
            client,
            certificates: RwLock::new(HashMap::new()),
            stats: StatsCounter::new(profiling),
        }
    }

    /// Build the backend described by `cfg`.
    pub fn from_config(cfg: &AvailabilityConfig) -> Self {
        let client: Arc<dyn DisperserClient> = match cfg.kind {
            AvailabilityKind::Memory => Arc::new(InMemoryDisperser::new()),
        };
        tracing::info!(kind = ?cfg.kind, "availability backend ready");
        Self::new(client, cfg.profiling)
    }

    /// The certificate recorded for `key`, if the blob was dispersed here.
    pub fn certificate(&self, key: &BlobKey) -> Option<BlobCertificate> {
        self.certificates
            .read()
            .ok()
            .and_then(|certs| certs.get(key).cloned())
    }

    fn integrity(key: &BlobKey, reason: impl Into<String>) -> StoreError {
        StoreError::Integrity {
            key: *key,
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Store for AvailabilityStore {
    async fn get(&self, ctx: &RequestContext, key: &BlobKey) -> StoreResult<Bytes> {
        let cert = self.certificate(key).ok_or(StoreError::NotFound(*key))?;
        let data = ctx
            .run(self.client.retrieve(&cert))
            .await?
            .ok_or(StoreError::NotFound(*key))?;
        self.stats.record_read();
        Ok(data)
    }

    async fn put(&self, ctx: &RequestContext, key: &BlobKey, value: Bytes) -> StoreResult<()> {
        if let Some(cert) = self.certificate(key) {
            if cert.proof.verify(keccak256(&value), &cert.batch_root).is_ok() {
                tracing::debug!(key = %key.short_hex(), "blob already dispersed");
                return Ok(());
            }
            tracing::warn!(
                key = %key.short_hex(),
                "recorded certificate does not cover this value, dispersing again"
            );
        }

        let cert = ctx.run(self.client.disperse(value)).await?;
        tracing::debug!(key = %key.short_hex(), index = cert.blob_index(), "certificate recorded");
        self.certificates
            .write()
            .map_err(|_| {
                StoreError::backend(BackendType::AvailabilityNetwork, "certificate lock poisoned")
            })?
            .insert(*key, cert);
        self.stats.record_entry();
        Ok(())
    }

    fn verify(&self, key: &BlobKey, value: &[u8]) -> StoreResult<()> {
        let leaf = keccak256(value);
        if &leaf != key.as_bytes() {
            return Err(Self::integrity(key, "key does not match value"));
        }

        let cert = self
            .certificate(key)
            .ok_or_else(|| Self::integrity(key, "no certificate recorded"))?;
        cert.proof
            .verify(leaf, &cert.batch_root)
            .map_err(|e| Self::integrity(key, e.to_string()))
    }

    fn stats(&self) -> Stats {
        self.stats.snapshot()
    }

    fn backend_type(&self) -> BackendType {
        BackendType::AvailabilityNetwork
    }
}
