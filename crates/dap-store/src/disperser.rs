use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use dap_crypto::{keccak256, Hash, InclusionProof, MerkleTree};
use dap_types::{BackendType, BlobKey};

use crate::error::{StoreError, StoreResult};

/// Receipt the availability network issues for a dispersed blob.
///
/// `proof` places `keccak256(blob)` at `proof.index` of batch `batch_id`,
/// whose merkle root is `batch_root`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobCertificate {
    pub batch_id: u64,
    pub batch_root: Hash,
    pub proof: InclusionProof,
}

impl BlobCertificate {
    /// Position of the blob inside its batch.
    pub fn blob_index(&self) -> u64 {
        self.proof.index
    }
}

/// Client for the availability network.
#[async_trait]
pub trait DisperserClient: Send + Sync {
    /// Submit a blob and wait for its certificate.
    async fn disperse(&self, blob: Bytes) -> StoreResult<BlobCertificate>;

    /// Fetch the blob a certificate refers to. `Ok(None)` if the network no
    /// longer has it.
    async fn retrieve(&self, cert: &BlobCertificate) -> StoreResult<Option<Bytes>>;
}

/// Blobs per batch before the in-memory network seals it.
pub const DEFAULT_BATCH_CAPACITY: usize = 256;

/// Process-local availability network.
///
/// Blobs are appended to the open batch, and every dispersal re-commits that
/// batch to a fresh merkle root, so each certificate proves inclusion in the
/// batch as it stood at dispersal time. A full batch is sealed and a new one
/// opened, which bounds the tree rebuilt per dispersal by the batch capacity.
pub struct InMemoryDisperser {
    capacity: usize,
    log: RwLock<Vec<Batch>>,
}

#[derive(Default)]
struct Batch {
    blobs: Vec<Bytes>,
    leaves: Vec<Hash>,
}

impl Default for InMemoryDisperser {
    fn default() -> Self {
        Self::with_batch_capacity(DEFAULT_BATCH_CAPACITY)
    }
}

impl InMemoryDisperser {
    pub fn new() -> Self {
        Self::default()
    }

    /// A network that seals a batch every `capacity` blobs (at least one).
    pub fn with_batch_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            log: RwLock::new(Vec::new()),
        }
    }

    /// Number of blobs dispersed so far.
    pub fn len(&self) -> usize {
        self.log
            .read()
            .map(|batches| batches.iter().map(|b| b.blobs.len()).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of batches opened so far.
    pub fn batch_count(&self) -> usize {
        self.log.read().map(|batches| batches.len()).unwrap_or(0)
    }

    /// Replace the bytes served for the `index`-th dispersed blob without
    /// touching its leaf.
    #[cfg(test)]
    pub(crate) fn corrupt(&self, index: usize, bytes: Bytes) {
        let mut log = self.log.write().expect("lock poisoned");
        log[index / self.capacity].blobs[index % self.capacity] = bytes;
    }
}

fn network_error(message: &str) -> StoreError {
    StoreError::backend(BackendType::AvailabilityNetwork, message)
}

#[async_trait]
impl DisperserClient for InMemoryDisperser {
    async fn disperse(&self, blob: Bytes) -> StoreResult<BlobCertificate> {
        let mut log = self.log.write().map_err(|_| network_error("blob log lock poisoned"))?;
        if log.last().map_or(true, |batch| batch.leaves.len() >= self.capacity) {
            log.push(Batch::default());
        }
        let batch_id = log.len() - 1;
        let batch = &mut log[batch_id];
        batch.leaves.push(keccak256(&blob));
        batch.blobs.push(blob);

        let index = batch.leaves.len() - 1;
        let tree = MerkleTree::from_leaves(batch.leaves.clone())
            .ok_or_else(|| network_error("empty batch"))?;
        let proof = tree
            .proof(index)
            .ok_or_else(|| network_error("leaf missing from batch"))?;

        tracing::debug!(
            batch_id,
            index,
            root = %BlobKey::from_hash(tree.root()).short_hex(),
            "blob dispersed"
        );
        Ok(BlobCertificate {
            batch_id: batch_id as u64,
            batch_root: tree.root(),
            proof,
        })
    }

    async fn retrieve(&self, cert: &BlobCertificate) -> StoreResult<Option<Bytes>> {
        let log = self.log.read().map_err(|_| network_error("blob log lock poisoned"))?;
        let batch = usize::try_from(cert.batch_id).ok().and_then(|id| log.get(id));
        let index = usize::try_from(cert.blob_index()).ok();
        Ok(batch
            .zip(index)
            .and_then(|(batch, i)| batch.blobs.get(i))
            .cloned())
    }
}
