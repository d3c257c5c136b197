use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Width of every content-addressed key in bytes.
pub const KEY_LENGTH: usize = 32;

/// Content-addressed identifier for a stored blob.
///
/// A `BlobKey` is the Keccak-256 hash of the blob's bytes. Identical content
/// always produces the same key, so writing the same blob twice is a no-op.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlobKey([u8; KEY_LENGTH]);

impl BlobKey {
    /// Create a key from a pre-computed hash.
    pub const fn from_hash(hash: [u8; KEY_LENGTH]) -> Self {
        Self(hash)
    }

    /// Create a key from a byte slice, which must be exactly 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypeError> {
        let arr: [u8; KEY_LENGTH] = bytes.try_into().map_err(|_| TypeError::InvalidLength {
            expected: KEY_LENGTH,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.0
    }

    /// Hex-encoded string representation (no `0x` prefix).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Debug for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobKey({})", self.short_hex())
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl AsRef<[u8]> for BlobKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; KEY_LENGTH]> for BlobKey {
    fn from(bytes: [u8; KEY_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl From<BlobKey> for [u8; KEY_LENGTH] {
    fn from(key: BlobKey) -> Self {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn from_slice_rejects_wrong_length() {
        let err = BlobKey::from_slice(&[1u8; 31]).unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 32,
                actual: 31
            }
        );
        assert!(BlobKey::from_slice(&[1u8; 33]).is_err());
    }

    #[test]
    fn hex_accepts_optional_prefix() {
        let key = BlobKey::from_hash([0xab; 32]);
        assert_eq!(BlobKey::from_hex(&key.to_hex()).unwrap(), key);
        assert_eq!(BlobKey::from_hex(&format!("0x{}", key.to_hex())).unwrap(), key);
    }

    #[test]
    fn invalid_hex_is_reported() {
        assert!(matches!(
            BlobKey::from_hex("zz"),
            Err(TypeError::InvalidHex(_))
        ));
    }

    #[test]
    fn display_is_prefixed_hex() {
        let key = BlobKey::from_hash([0x01; 32]);
        let shown = key.to_string();
        assert!(shown.starts_with("0x"));
        assert_eq!(shown.len(), 66);
    }

    #[test]
    fn short_hex_is_8_chars() {
        assert_eq!(BlobKey::from_hash([7; 32]).short_hex().len(), 8);
    }

    #[test]
    fn serde_roundtrip() {
        let key = BlobKey::from_hash([9; 32]);
        let json = serde_json::to_string(&key).unwrap();
        let parsed: BlobKey = serde_json::from_str(&json).unwrap();
        assert_eq!(key, parsed);
    }

    proptest! {
        #[test]
        fn hex_parse_inverts_to_hex(bytes in proptest::array::uniform32(any::<u8>())) {
            let key = BlobKey::from_hash(bytes);
            prop_assert_eq!(BlobKey::from_hex(&key.to_hex()).unwrap(), key);
        }
    }
}
