use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use dap_protocol::CodecError;
use dap_store::StoreError;
use dap_types::CommitmentMeta;

/// Body of a 400 caused by an unresolvable commitment mode.
pub const INVALID_COMMITMENT_MODE: &str = "invalid commitment mode";
/// Body of a 400 caused by a malformed commitment.
pub const INVALID_COMMITMENT: &str = "invalid commitment";

/// Status used when the client went away before the response was ready.
const CLIENT_CLOSED_REQUEST: u16 = 499;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// An error response for one request.
///
/// The message is what the client sees. Detail stays in the server log.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub meta: Option<CommitmentMeta>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            meta: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn with_meta(mut self, meta: &CommitmentMeta) -> Self {
        self.meta = Some(meta.clone());
        self
    }

    /// Map a failed router call to a client-facing status.
    pub fn from_store(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(key) => {
                tracing::info!(key = %key, "not found");
                Self::new(StatusCode::NOT_FOUND, "not found")
            }
            StoreError::KeyMismatch { supplied, computed } => {
                tracing::info!(%supplied, %computed, "supplied key does not match value");
                Self::bad_request(INVALID_COMMITMENT)
            }
            StoreError::Cancelled => {
                tracing::info!("request cancelled by client");
                Self::new(
                    StatusCode::from_u16(CLIENT_CLOSED_REQUEST)
                        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                    "request cancelled",
                )
            }
            StoreError::DeadlineExceeded => {
                tracing::error!("request deadline exceeded");
                Self::new(StatusCode::GATEWAY_TIMEOUT, "deadline exceeded")
            }
            other => {
                tracing::error!(error = %other, "internal server error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        }
    }

    /// A commitment could not be produced after the backend call succeeded.
    pub fn encoding(err: CodecError) -> Self {
        tracing::error!(error = %err, "failed to encode commitment");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.message).into_response();
        if let Some(meta) = self.meta {
            response.extensions_mut().insert(meta);
        }
        response
    }
}
