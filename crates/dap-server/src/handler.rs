use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use dap_protocol::{
    commitment_segment, read_commitment_meta, CommitmentCodec, COMMITMENT_MODE_KEY,
};
use dap_store::Stats;
use dap_types::CommitmentMeta;

use crate::error::{ApiError, INVALID_COMMITMENT, INVALID_COMMITMENT_MODE};
use crate::metrics::BlobSize;
use crate::state::AppState;

type Params = Query<HashMap<String, String>>;

/// Health check handler.
pub async fn health_handler() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub availability: Option<Stats>,
    pub object: Option<Stats>,
}

/// Per-backend usage counters.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        availability: state.storage().availability_stats(),
        object: state.storage().object_stats(),
    })
}

fn resolve_meta(segment: Option<&str>, params: &HashMap<String, String>) -> Result<CommitmentMeta, ApiError> {
    let query_mode = params.get(COMMITMENT_MODE_KEY).map(String::as_str);
    let (meta, version_err) = read_commitment_meta(segment, query_mode).map_err(|err| {
        tracing::info!(error = %err, "bad request");
        ApiError::bad_request(INVALID_COMMITMENT_MODE)
    })?;
    if let Some(err) = version_err {
        tracing::debug!(error = %err, mode = %meta.mode, "commitment version unavailable");
    }
    Ok(meta)
}

fn blob_response(meta: CommitmentMeta, size: usize, body: impl Into<Bytes>) -> Response {
    let mut response = (StatusCode::OK, body.into()).into_response();
    response.extensions_mut().insert(meta);
    response.extensions_mut().insert(BlobSize(size));
    response
}

/// `GET /get/{commitment}`: read a blob.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(commitment): Path<String>,
    Query(params): Params,
) -> Result<Response, ApiError> {
    let meta = resolve_meta(Some(&commitment), &params)?;
    let key = CommitmentCodec::decode(&commitment, meta.mode).map_err(|err| {
        tracing::info!(error = %err, commitment = %commitment, "failed to decode commitment");
        ApiError::bad_request(INVALID_COMMITMENT).with_meta(&meta)
    })?;

    let ctx = state.request_context();
    let _cancel_on_drop = ctx.cancellation_token().clone().drop_guard();
    let data = state
        .storage()
        .get(&ctx, &key, meta.mode)
        .await
        .map_err(|err| ApiError::from_store(err).with_meta(&meta))?;

    let size = data.len();
    Ok(blob_response(meta, size, data))
}

/// `GET /get/` with no commitment.
pub async fn missing_commitment_handler() -> ApiError {
    tracing::info!("get request without a commitment");
    ApiError::bad_request(INVALID_COMMITMENT)
}

/// `PUT /put/[{commitment}]`: write a blob and return its commitment.
///
/// A commitment in the path is used as the key; otherwise the key is derived
/// from the body.
pub async fn put_handler(
    State(state): State<AppState>,
    path: Option<Path<String>>,
    Query(params): Params,
    body: Bytes,
) -> Result<Response, ApiError> {
    let raw_segment = path.map(|Path(segment)| segment);
    let segment = commitment_segment(raw_segment.as_deref());
    let meta = resolve_meta(segment, &params)?;

    let supplied = segment
        .map(|commitment| CommitmentCodec::decode(commitment, meta.mode))
        .transpose()
        .map_err(|err| {
            tracing::info!(error = %err, "failed to decode commitment");
            ApiError::bad_request(INVALID_COMMITMENT).with_meta(&meta)
        })?;

    let ctx = state.request_context();
    let _cancel_on_drop = ctx.cancellation_token().clone().drop_guard();
    let size = body.len();
    let key = state
        .storage()
        .put(&ctx, meta.mode, supplied, body)
        .await
        .map_err(|err| ApiError::from_store(err).with_meta(&meta))?;

    let encoded = CommitmentCodec::encode(&key, meta.mode)
        .map_err(|err| ApiError::encoding(err).with_meta(&meta))?;
    tracing::info!(key = %key, mode = %meta.mode, size, "wrote commitment");
    Ok(blob_response(meta, size, encoded))
}
