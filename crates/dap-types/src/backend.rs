use std::fmt;

use serde::{Deserialize, Serialize};

/// Tag identifying a storage backend implementation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendType {
    /// Decentralized blob availability network.
    AvailabilityNetwork,
    /// Conventional object store (S3-compatible, local disk, memory).
    ObjectStore,
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AvailabilityNetwork => write!(f, "availability_network"),
            Self::ObjectStore => write!(f, "object_store"),
        }
    }
}
