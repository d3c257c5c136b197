//! Commitment wire protocol for the data-availability proxy.
//!
//! Clients speak one of three commitment dialects ([`dap_types::Mode`]).
//! [`CommitmentCodec`] converts between wire commitments and the 32-byte keys
//! the stores use, and the [`meta`] module classifies inbound requests.

pub mod codec;
pub mod error;
pub mod meta;

pub use codec::{
    CommitmentCodec, DA_LAYER_BYTE, GENERIC_COMMITMENT_TYPE, KECCAK256_COMMITMENT_TYPE,
    MIN_COMMITMENT_LENGTH,
};
pub use error::{CodecError, CodecResult};
pub use meta::{
    commitment_segment, read_commitment_meta, read_commitment_mode, read_commitment_version,
    COMMITMENT_MODE_KEY, DOMAIN_FILTER_KEY, PUT_SENTINEL,
};
