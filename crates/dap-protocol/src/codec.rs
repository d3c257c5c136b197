use dap_types::{BlobKey, Commitment, Mode, KEY_LENGTH};

use crate::error::{CodecError, CodecResult};

/// Commitment type byte of an OP keccak-256 commitment.
pub const KECCAK256_COMMITMENT_TYPE: u8 = 0x00;
/// Commitment type byte of an OP generic (alt-DA) commitment.
pub const GENERIC_COMMITMENT_TYPE: u8 = 0x01;
/// DA layer byte identifying this availability network inside a generic
/// commitment.
pub const DA_LAYER_BYTE: u8 = 0x00;
/// No commitment in any mode is shorter than this.
pub const MIN_COMMITMENT_LENGTH: usize = 3;

/// Codec for commitment wire formats.
///
/// Layouts:
/// - `OptimismGeneric`: `[0x00][key]`
/// - `OptimismAltDA`: `[0x01][da_layer][version][key]`
/// - `Simple`: `[version][key]`
pub struct CommitmentCodec;

impl CommitmentCodec {
    /// Decode a hex wire string (optional `0x` prefix) to the key it carries.
    pub fn decode(wire: &str, mode: Mode) -> CodecResult<BlobKey> {
        Self::decode_commitment(wire, mode).map(|c| c.key)
    }

    /// Decode a hex wire string into a full [`Commitment`].
    pub fn decode_commitment(wire: &str, mode: Mode) -> CodecResult<Commitment> {
        let bytes = decode_hex(wire)?;
        Self::decode_bytes(&bytes, mode)
    }

    /// Decode raw commitment bytes.
    pub fn decode_bytes(bytes: &[u8], mode: Mode) -> CodecResult<Commitment> {
        if bytes.len() < MIN_COMMITMENT_LENGTH {
            return Err(CodecError::TooShort(bytes.len()));
        }

        let (version, key) = match mode {
            Mode::OptimismGeneric => {
                expect_prefix(mode, bytes[0], KECCAK256_COMMITMENT_TYPE)?;
                (0, &bytes[1..])
            }
            Mode::OptimismAltDA => {
                expect_prefix(mode, bytes[0], GENERIC_COMMITMENT_TYPE)?;
                if bytes[1] != DA_LAYER_BYTE {
                    return Err(CodecError::UnknownDaLayer(bytes[1]));
                }
                (bytes[2], &bytes[3..])
            }
            Mode::Simple => (bytes[0], &bytes[1..]),
        };

        if key.len() != KEY_LENGTH {
            return Err(CodecError::InvalidKeyLength {
                expected: KEY_LENGTH,
                actual: key.len(),
            });
        }
        Ok(Commitment::new(mode, version, BlobKey::from_slice(key)?))
    }

    /// Encode `key` for `mode` at version 0.
    pub fn encode(key: &BlobKey, mode: Mode) -> CodecResult<Vec<u8>> {
        Self::encode_versioned(key, mode, 0)
    }

    /// Encode `key` for `mode` with an explicit certificate version.
    ///
    /// Keccak commitments carry no version byte, so only version 0 is
    /// representable for `OptimismGeneric`.
    pub fn encode_versioned(key: &BlobKey, mode: Mode, version: u8) -> CodecResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(MIN_COMMITMENT_LENGTH + KEY_LENGTH);
        match mode {
            Mode::OptimismGeneric => {
                if version != 0 {
                    return Err(CodecError::UnsupportedVersion { mode, version });
                }
                buf.push(KECCAK256_COMMITMENT_TYPE);
            }
            Mode::OptimismAltDA => {
                buf.extend_from_slice(&[GENERIC_COMMITMENT_TYPE, DA_LAYER_BYTE, version]);
            }
            Mode::Simple => buf.push(version),
        }
        buf.extend_from_slice(key.as_bytes());
        Ok(buf)
    }

    /// Encode `key` as a `0x`-prefixed hex wire string.
    pub fn encode_string(key: &BlobKey, mode: Mode) -> CodecResult<String> {
        Self::encode(key, mode).map(|bytes| format!("0x{}", hex::encode(bytes)))
    }
}

/// Decode a hex string with an optional `0x` prefix.
pub(crate) fn decode_hex(wire: &str) -> CodecResult<Vec<u8>> {
    let digits = wire.strip_prefix("0x").unwrap_or(wire);
    hex::decode(digits).map_err(|e| CodecError::InvalidHex(e.to_string()))
}

fn expect_prefix(mode: Mode, actual: u8, expected: u8) -> CodecResult<()> {
    if actual != expected {
        return Err(CodecError::PrefixMismatch {
            mode,
            prefix: actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn key() -> BlobKey {
        BlobKey::from_hash([0x42; 32])
    }

    #[test]
    fn keccak_layout() {
        let bytes = CommitmentCodec::encode(&key(), Mode::OptimismGeneric).unwrap();
        assert_eq!(bytes.len(), 33);
        assert_eq!(bytes[0], KECCAK256_COMMITMENT_TYPE);
        assert_eq!(&bytes[1..], key().as_bytes());
    }

    #[test]
    fn generic_layout() {
        let bytes = CommitmentCodec::encode_versioned(&key(), Mode::OptimismAltDA, 2).unwrap();
        assert_eq!(&bytes[..3], &[GENERIC_COMMITMENT_TYPE, DA_LAYER_BYTE, 2]);
        assert_eq!(&bytes[3..], key().as_bytes());
    }

    #[test]
    fn simple_layout() {
        let bytes = CommitmentCodec::encode_versioned(&key(), Mode::Simple, 1).unwrap();
        assert_eq!(bytes[0], 1);
        assert_eq!(bytes.len(), 33);
    }

    #[test]
    fn keccak_rejects_nonzero_version() {
        let err = CommitmentCodec::encode_versioned(&key(), Mode::OptimismGeneric, 1).unwrap_err();
        assert!(err.is_encoding_failure());
    }

    #[test]
    fn string_roundtrip_all_modes() {
        for mode in Mode::ALL {
            let wire = CommitmentCodec::encode_string(&key(), mode).unwrap();
            assert!(wire.starts_with("0x"));
            assert_eq!(CommitmentCodec::decode(&wire, mode).unwrap(), key());
            // the prefix is optional
            assert_eq!(CommitmentCodec::decode(&wire[2..], mode).unwrap(), key());
        }
    }

    #[test]
    fn decode_reports_version() {
        let bytes = CommitmentCodec::encode_versioned(&key(), Mode::OptimismAltDA, 5).unwrap();
        let c = CommitmentCodec::decode_bytes(&bytes, Mode::OptimismAltDA).unwrap();
        assert_eq!(c.version, 5);
        assert_eq!(c.mode, Mode::OptimismAltDA);
    }

    #[test]
    fn too_short_is_malformed() {
        assert_eq!(
            CommitmentCodec::decode("0x0001", Mode::Simple),
            Err(CodecError::TooShort(2))
        );
    }

    #[test]
    fn bad_hex_is_malformed() {
        assert!(matches!(
            CommitmentCodec::decode("0xnothex", Mode::Simple),
            Err(CodecError::InvalidHex(_))
        ));
    }

    #[test]
    fn wrong_prefix_for_mode_is_malformed() {
        let generic = CommitmentCodec::encode_string(&key(), Mode::OptimismAltDA).unwrap();
        assert!(matches!(
            CommitmentCodec::decode(&generic, Mode::OptimismGeneric),
            Err(CodecError::PrefixMismatch { prefix: 0x01, .. })
        ));
    }

    #[test]
    fn unknown_da_layer_is_malformed() {
        let mut bytes = CommitmentCodec::encode(&key(), Mode::OptimismAltDA).unwrap();
        bytes[1] = 0x7f;
        assert_eq!(
            CommitmentCodec::decode_bytes(&bytes, Mode::OptimismAltDA),
            Err(CodecError::UnknownDaLayer(0x7f))
        );
    }

    #[test]
    fn truncated_key_is_malformed() {
        let bytes = CommitmentCodec::encode(&key(), Mode::Simple).unwrap();
        assert_eq!(
            CommitmentCodec::decode_bytes(&bytes[..20], Mode::Simple),
            Err(CodecError::InvalidKeyLength {
                expected: 32,
                actual: 19
            })
        );
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(
            bytes in proptest::array::uniform32(any::<u8>()),
            mode_idx in 0usize..3,
        ) {
            let mode = Mode::ALL[mode_idx];
            let k = BlobKey::from_hash(bytes);
            let wire = CommitmentCodec::encode_string(&k, mode).unwrap();
            prop_assert_eq!(CommitmentCodec::decode(&wire, mode).unwrap(), k);
        }

        #[test]
        fn arbitrary_input_never_panics(s in "\\PC*", mode_idx in 0usize..3) {
            let _ = CommitmentCodec::decode(&s, Mode::ALL[mode_idx]);
        }
    }
}
