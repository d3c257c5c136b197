use serde::{Deserialize, Serialize};

use crate::hasher::{keccak256_concat, Hash, HASH_LENGTH};

/// Errors from inclusion proof processing.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProofError {
    #[error("proof length should be a multiple of 32 bytes or 256 bits, got {0} bytes")]
    MalformedProof(usize),

    #[error("computed root {computed} does not match expected root {expected}")]
    RootMismatch { expected: String, computed: String },
}

/// Recompute the merkle root for `leaf` at position `index` from a flat proof.
///
/// `proof` is the concatenation of 32-byte sibling hashes ordered from the
/// leaf level upwards. At every level an even `index` places the running hash
/// on the left, an odd one places it on the right; the index is then halved.
///
/// An `Ok` result only means the proof was well-formed. The returned hash
/// must still be compared against an independently known root, which is what
/// [`verify_inclusion`] does.
pub fn compute_root(proof: &[u8], leaf: Hash, mut index: u64) -> Result<Hash, ProofError> {
    if proof.len() % HASH_LENGTH != 0 {
        return Err(ProofError::MalformedProof(proof.len()));
    }

    let mut computed = leaf;
    for sibling in proof.chunks_exact(HASH_LENGTH) {
        computed = if index % 2 == 0 {
            keccak256_concat(&computed, sibling)
        } else {
            keccak256_concat(sibling, &computed)
        };
        index /= 2;
    }

    Ok(computed)
}

/// Recompute the root and require it to equal `expected_root`.
pub fn verify_inclusion(
    proof: &[u8],
    leaf: Hash,
    index: u64,
    expected_root: &Hash,
) -> Result<(), ProofError> {
    let computed = compute_root(proof, leaf, index)?;
    if &computed != expected_root {
        return Err(ProofError::RootMismatch {
            expected: hex::encode(expected_root),
            computed: hex::encode(computed),
        });
    }
    Ok(())
}

/// Position and sibling path of a leaf inside a merkle tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionProof {
    /// Leaf position in the tree.
    pub index: u64,
    /// Concatenated 32-byte sibling hashes, leaf level first.
    pub siblings: Vec<u8>,
}

impl InclusionProof {
    /// Recompute the root this proof commits `leaf` to.
    pub fn compute_root(&self, leaf: Hash) -> Result<Hash, ProofError> {
        compute_root(&self.siblings, leaf, self.index)
    }

    /// Verify that `leaf` is included under `root`.
    pub fn verify(&self, leaf: Hash, root: &Hash) -> Result<(), ProofError> {
        verify_inclusion(&self.siblings, leaf, self.index, root)
    }

    /// Number of levels between the leaf and the root.
    pub fn depth(&self) -> usize {
        self.siblings.len() / HASH_LENGTH
    }
}

/// Binary keccak merkle tree producing proofs for [`compute_root`].
///
/// An odd node at any level is paired with itself.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    /// Level 0 = leaves, last level = root.
    levels: Vec<Vec<Hash>>,
}

impl MerkleTree {
    /// Build a tree from leaf hashes. Returns `None` for an empty leaf set.
    pub fn from_leaves(leaves: Vec<Hash>) -> Option<Self> {
        if leaves.is_empty() {
            return None;
        }

        let mut levels = vec![leaves];
        while let Some(current) = levels.last().filter(|level| level.len() > 1) {
            let next: Vec<Hash> = current
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => keccak256_concat(left, right),
                    [single] => keccak256_concat(single, single),
                    _ => unreachable!("chunks(2) yields one or two elements"),
                })
                .collect();
            levels.push(next);
        }

        Some(Self { levels })
    }

    /// The root hash of the tree.
    pub fn root(&self) -> Hash {
        self.levels[self.levels.len() - 1][0]
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Generate an inclusion proof for the leaf at `index`.
    pub fn proof(&self, index: usize) -> Option<InclusionProof> {
        if index >= self.leaf_count() {
            return None;
        }

        let mut siblings = Vec::with_capacity((self.levels.len() - 1) * HASH_LENGTH);
        let mut idx = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling_idx = idx ^ 1;
            let sibling = level.get(sibling_idx).unwrap_or(&level[idx]);
            siblings.extend_from_slice(sibling);
            idx /= 2;
        }

        Some(InclusionProof {
            index: index as u64,
            siblings,
        })
    }
}
