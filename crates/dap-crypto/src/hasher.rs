use dap_types::BlobKey;
use tiny_keccak::{Hasher, Keccak};

/// Width of a Keccak-256 digest.
pub const HASH_LENGTH: usize = 32;

/// A raw 256-bit digest.
pub type Hash = [u8; HASH_LENGTH];

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut out = [0u8; HASH_LENGTH];
    hasher.finalize(&mut out);
    out
}

/// Keccak-256 of `left ‖ right` without allocating the concatenation.
pub fn keccak256_concat(left: &[u8], right: &[u8]) -> Hash {
    let mut hasher = Keccak::v256();
    hasher.update(left);
    hasher.update(right);
    let mut out = [0u8; HASH_LENGTH];
    hasher.finalize(&mut out);
    out
}

/// Content-addressed key for a blob.
pub fn blob_key(value: &[u8]) -> BlobKey {
    BlobKey::from_hash(keccak256(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_matches_known_digest() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(keccak256(b"hello world"), keccak256(b"hello world"));
        assert_ne!(keccak256(b"hello"), keccak256(b"world"));
    }

    #[test]
    fn concat_matches_single_buffer() {
        let joined = [b"left".as_slice(), b"right".as_slice()].concat();
        assert_eq!(keccak256_concat(b"left", b"right"), keccak256(&joined));
    }

    #[test]
    fn blob_key_wraps_digest() {
        assert_eq!(blob_key(b"abc").as_bytes(), &keccak256(b"abc"));
    }
}
