use thiserror::Error;

use dap_types::{Mode, TypeError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid hex commitment: {0}")]
    InvalidHex(String),

    #[error("commitment is too short: {0} bytes (min 3)")]
    TooShort(usize),

    #[error("unknown commit byte prefix: {0:#04x}")]
    UnknownPrefix(u8),

    #[error("commitment prefix {prefix:#04x} does not match mode {mode}")]
    PrefixMismatch { mode: Mode, prefix: u8 },

    #[error("unknown da layer byte: {0:#04x}")]
    UnknownDaLayer(u8),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("mode {mode} cannot carry version {version}")]
    UnsupportedVersion { mode: Mode, version: u8 },

    #[error("invalid commitment mode: {0}")]
    InvalidMode(String),
}

impl CodecError {
    /// Returns `true` for errors raised while producing a commitment rather
    /// than parsing one.
    pub fn is_encoding_failure(&self) -> bool {
        matches!(self, Self::UnsupportedVersion { .. })
    }
}

impl From<TypeError> for CodecError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidHex(msg) => Self::InvalidHex(msg),
            TypeError::InvalidLength { expected, actual } => {
                Self::InvalidKeyLength { expected, actual }
            }
            TypeError::UnknownMode(name) => Self::InvalidMode(name),
        }
    }
}

pub type CodecResult<T> = Result<T, CodecError>;
