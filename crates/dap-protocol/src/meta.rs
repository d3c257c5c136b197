//! Commitment mode and version resolution for inbound requests.
//!
//! A request names its dialect either explicitly through the
//! `commitment_mode` query parameter or implicitly through the type byte of
//! the commitment in its path. The explicit selector always wins.

use dap_types::{CommitmentMeta, Mode};

use crate::codec::{
    decode_hex, GENERIC_COMMITMENT_TYPE, KECCAK256_COMMITMENT_TYPE, MIN_COMMITMENT_LENGTH,
};
use crate::error::{CodecError, CodecResult};

/// Query parameter carrying an explicit commitment mode.
pub const COMMITMENT_MODE_KEY: &str = "commitment_mode";
/// Query parameter carrying a domain filter. Accepted and ignored.
pub const DOMAIN_FILTER_KEY: &str = "domain";
/// Final path segment of a bare `/put/` request.
pub const PUT_SENTINEL: &str = "put";

/// The commitment carried by a final path segment, if any.
///
/// Empty segments and the literal `put` mean "no commitment supplied".
pub fn commitment_segment(segment: Option<&str>) -> Option<&str> {
    segment.filter(|s| !s.is_empty() && *s != PUT_SENTINEL)
}

/// Resolve the commitment mode of a request.
///
/// `query_mode` is the raw `commitment_mode` value; an empty value counts as
/// absent. Without an explicit mode, the first byte of the path commitment
/// selects one of the two OP dialects; a request without a commitment
/// defaults to `OptimismAltDA`.
pub fn read_commitment_mode(segment: Option<&str>, query_mode: Option<&str>) -> CodecResult<Mode> {
    if let Some(name) = query_mode.filter(|m| !m.is_empty()) {
        return name.parse::<Mode>().map_err(CodecError::from);
    }

    let Some(commit) = commitment_segment(segment) else {
        return Ok(Mode::OptimismAltDA);
    };

    let bytes = decode_hex(commit)?;
    if bytes.len() < MIN_COMMITMENT_LENGTH {
        return Err(CodecError::TooShort(bytes.len()));
    }

    match bytes[0] {
        GENERIC_COMMITMENT_TYPE => Ok(Mode::OptimismAltDA),
        KECCAK256_COMMITMENT_TYPE => Ok(Mode::OptimismGeneric),
        other => Err(CodecError::UnknownPrefix(other)),
    }
}

/// Read the certificate version byte of the path commitment.
///
/// OP dialects carry it at byte index 2, `Simple` at byte index 0.
pub fn read_commitment_version(segment: Option<&str>, mode: Mode) -> CodecResult<u8> {
    let bytes = match commitment_segment(segment) {
        Some(commit) => decode_hex(commit)?,
        None => Vec::new(),
    };
    if bytes.len() < MIN_COMMITMENT_LENGTH {
        return Err(CodecError::TooShort(bytes.len()));
    }

    if mode.is_optimism() {
        Ok(bytes[2])
    } else {
        Ok(bytes[0])
    }
}

/// Resolve both mode and version of a request.
///
/// A mode failure is fatal. A version failure is not: the meta falls back to
/// version 0 and the error is returned alongside it for the caller to log.
pub fn read_commitment_meta(
    segment: Option<&str>,
    query_mode: Option<&str>,
) -> CodecResult<(CommitmentMeta, Option<CodecError>)> {
    let mode = read_commitment_mode(segment, query_mode)?;
    match read_commitment_version(segment, mode) {
        Ok(version) => Ok((CommitmentMeta::new(mode, version), None)),
        Err(err) => {
            tracing::debug!(%mode, error = %err, "defaulting commitment version to 0");
            Ok((CommitmentMeta::new(mode, 0), Some(err)))
        }
    }
}
