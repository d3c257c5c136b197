use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::key::BlobKey;

/// Encoding dialect used to interpret a commitment.
///
/// The wire names are what clients pass in the `commitment_mode` query
/// parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// `[version][key]`, no OP framing.
    #[serde(rename = "simple")]
    Simple,
    /// OP keccak-256 commitment: `[0x00][key]`.
    #[serde(rename = "optimism_keccak256")]
    OptimismGeneric,
    /// OP generic alt-DA commitment: `[0x01][da_layer][version][key]`.
    #[serde(rename = "optimism_generic")]
    OptimismAltDA,
}

impl Mode {
    /// Every supported mode.
    pub const ALL: [Mode; 3] = [Mode::Simple, Mode::OptimismGeneric, Mode::OptimismAltDA];

    /// The wire name of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::OptimismGeneric => "optimism_keccak256",
            Self::OptimismAltDA => "optimism_generic",
        }
    }

    /// Returns `true` for the two OP-derived dialects.
    pub fn is_optimism(&self) -> bool {
        matches!(self, Self::OptimismGeneric | Self::OptimismAltDA)
    }

    /// Returns `true` if blobs in this mode live on the availability network.
    ///
    /// `OptimismGeneric` commitments are plain keccak hashes served from the
    /// object store; the other modes address the availability network.
    pub fn is_network_addressed(&self) -> bool {
        !matches!(self, Self::OptimismGeneric)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| TypeError::UnknownMode(s.to_string()))
    }
}

/// A decoded commitment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commitment {
    pub mode: Mode,
    pub version: u8,
    pub key: BlobKey,
}

impl Commitment {
    pub fn new(mode: Mode, version: u8, key: BlobKey) -> Self {
        Self { mode, version, key }
    }
}

/// Labels carried alongside a request for metrics and logging.
///
/// Not part of the stored value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentMeta {
    pub mode: Mode,
    pub cert_version: String,
}

impl CommitmentMeta {
    pub fn new(mode: Mode, version: u8) -> Self {
        Self {
            mode,
            cert_version: version.to_string(),
        }
    }
}

impl Default for CommitmentMeta {
    fn default() -> Self {
        Self::new(Mode::OptimismAltDA, 0)
    }
}
