use dap_types::{BackendType, BlobKey, Mode};

/// Errors from store and router operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The key is absent from the serving backend.
    #[error("value not found for key {0}")]
    NotFound(BlobKey),

    /// Returned bytes do not match the key or the claimed merkle root.
    #[error("integrity check failed for {key}: {reason}")]
    Integrity { key: BlobKey, reason: String },

    /// Network or storage-layer failure inside a backend.
    #[error("{backend} backend error: {message}")]
    Backend {
        backend: BackendType,
        message: String,
    },

    /// A caller-supplied key is not the Keccak-256 hash of the value.
    #[error("supplied key {supplied} does not match value hash {computed}")]
    KeyMismatch { supplied: BlobKey, computed: BlobKey },

    /// No backend is configured for the role a mode requires.
    #[error("no storage backend configured for commitment mode {0}")]
    NoBackend(Mode),

    /// The request was cancelled before the backend call finished.
    #[error("request cancelled")]
    Cancelled,

    /// The request deadline passed before the backend call finished.
    #[error("request deadline exceeded")]
    DeadlineExceeded,

    /// The backend could not be constructed from its configuration.
    #[error("invalid store configuration: {0}")]
    Config(String),
}

impl StoreError {
    pub(crate) fn backend(backend: BackendType, message: impl ToString) -> Self {
        Self::Backend {
            backend,
            message: message.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::Integrity { .. })
    }

    pub fn is_key_mismatch(&self) -> bool {
        matches!(self, Self::KeyMismatch { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
