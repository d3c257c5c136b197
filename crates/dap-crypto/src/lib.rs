//! Cryptographic primitives for the data-availability proxy.
//!
//! Provides Keccak-256 content hashing and binary merkle inclusion proofs.
//! Proofs are flat byte strings of 32-byte sibling hashes ordered from leaf
//! to root; sibling order at each level follows the parity of the leaf index.
//!
//! All hashing goes through `tiny-keccak`; there is no custom cryptography.

pub mod hasher;
pub mod merkle;

pub use hasher::{blob_key, keccak256, keccak256_concat, Hash, HASH_LENGTH};
pub use merkle::{compute_root, verify_inclusion, InclusionProof, MerkleTree, ProofError};
