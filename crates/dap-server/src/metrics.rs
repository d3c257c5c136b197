//! Request metrics, labeled by commitment mode and certificate version.

use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use metrics::{counter, histogram};

use dap_types::CommitmentMeta;

const UNKNOWN: &str = "unknown";

/// Size of the blob a request transferred, attached to the response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlobSize(pub usize);

pub fn record_request(method: &str, status: u16, meta: Option<&CommitmentMeta>, duration: Duration) {
    let (mode, version) = labels(meta);
    counter!(
        "dap_http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "mode" => mode.clone(),
        "cert_version" => version.clone()
    )
    .increment(1);
    histogram!(
        "dap_http_request_duration_seconds",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "mode" => mode,
        "cert_version" => version
    )
    .record(duration.as_secs_f64());
}

pub fn record_blob_size(method: &str, meta: Option<&CommitmentMeta>, size: usize) {
    let (mode, version) = labels(meta);
    histogram!(
        "dap_blob_size_bytes",
        "method" => method.to_string(),
        "mode" => mode,
        "cert_version" => version
    )
    .record(size as f64);
}

fn labels(meta: Option<&CommitmentMeta>) -> (String, String) {
    match meta {
        Some(meta) => (meta.mode.to_string(), meta.cert_version.clone()),
        None => (UNKNOWN.to_string(), UNKNOWN.to_string()),
    }
}

/// Middleware recording latency and blob size for blob routes.
///
/// Handlers attach [`CommitmentMeta`] and [`BlobSize`] to their responses.
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let start = Instant::now();
    let response = next.run(req).await;

    let meta = response.extensions().get::<CommitmentMeta>();
    record_request(&method, response.status().as_u16(), meta, start.elapsed());
    let size = response.extensions().get::<BlobSize>().map_or(0, |s| s.0);
    record_blob_size(&method, meta, size);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use dap_types::Mode;

    #[test]
    fn labels_fall_back_to_unknown() {
        assert_eq!(labels(None), ("unknown".into(), "unknown".into()));
        let meta = CommitmentMeta::new(Mode::OptimismGeneric, 0);
        assert_eq!(labels(Some(&meta)), ("optimism_keccak256".into(), "0".into()));
    }

    #[test]
    fn recording_without_recorder_is_harmless() {
        record_request("GET", 200, None, Duration::from_millis(3));
        record_blob_size("PUT", None, 1024);
    }
}
