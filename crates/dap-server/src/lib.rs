//! HTTP server for the data-availability proxy.
//!
//! Exposes a commitment-addressed blob interface over the storage router:
//!
//! - `GET /get/{commitment}` returns the blob a commitment names
//! - `PUT /put/[{commitment}]` stores a blob and returns its commitment
//! - `GET /health` and `GET /stats` for operators

pub mod config;
pub mod error;
pub mod handler;
pub mod metrics;
pub mod router;
pub mod server;
pub mod state;

pub use config::{MetricsConfig, ProxyConfig, ServerConfig};
pub use error::{ApiError, ServerError, ServerResult};
pub use server::ProxyServer;
pub use state::AppState;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use bytes::Bytes;
    use tower::util::ServiceExt;

    use dap_crypto::blob_key;
    use dap_protocol::CommitmentCodec;
    use dap_store::{
        AvailabilityStore, InMemoryDisperser, ObjectStoreBackend, RequestContext, Router, Store,
    };
    use dap_types::Mode;

    fn storage(object: Arc<dyn Store>) -> Arc<Router> {
        let availability: Arc<dyn Store> =
            Arc::new(AvailabilityStore::new(Arc::new(InMemoryDisperser::new()), true));
        Arc::new(Router::new(Some(availability), Some(object), false))
    }

    fn app() -> axum::Router {
        let object: Arc<dyn Store> = Arc::new(ObjectStoreBackend::in_memory(true));
        ProxyServer::new(ServerConfig::default(), storage(object)).router()
    }

    async fn send(app: &axum::Router, method: &str, uri: &str, body: impl Into<Body>) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(body.into())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_bytes(response: Response) -> Bytes {
        to_bytes(response.into_body(), usize::MAX).await.unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let response = send(&app(), "GET", "/health", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn put_then_get_every_mode() {
        let app = app();
        for mode in Mode::ALL {
            let value = format!("blob in {mode}");
            let uri = format!("/put/?commitment_mode={mode}");
            let response = send(&app, "PUT", &uri, value.clone()).await;
            assert_eq!(response.status(), StatusCode::OK);
            let commitment = body_bytes(response).await;
            let expected = CommitmentCodec::encode(&blob_key(value.as_bytes()), mode).unwrap();
            assert_eq!(commitment.to_vec(), expected);

            let uri = format!("/get/0x{}?commitment_mode={mode}", hex::encode(&commitment));
            let response = send(&app, "GET", &uri, Body::empty()).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_bytes(response).await, value.as_bytes());
        }
    }

    #[tokio::test]
    async fn put_without_mode_defaults_to_generic_commitment() {
        let app = app();
        let response = send(&app, "POST", "/put", "op data").await;
        assert_eq!(response.status(), StatusCode::OK);
        let commitment = body_bytes(response).await;
        assert_eq!(commitment[0], 0x01);

        // mode inferred from the commitment's type byte
        let uri = format!("/get/0x{}", hex::encode(&commitment));
        let response = send(&app, "GET", &uri, Body::empty()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, "op data".as_bytes());
    }

    #[tokio::test]
    async fn put_with_keccak_commitment_in_path() {
        let app = app();
        let value = b"batcher frame".to_vec();
        let wire = CommitmentCodec::encode_string(&blob_key(&value), Mode::OptimismGeneric).unwrap();

        let response = send(&app, "PUT", &format!("/put/{wire}"), value.clone()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await[0], 0x00);

        let response = send(&app, "GET", &format!("/get/{wire}"), Body::empty()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, value);
    }

    #[tokio::test]
    async fn put_with_mismatched_key_is_rejected() {
        let app = app();
        let value = b"real blob".to_vec();
        let wire = CommitmentCodec::encode_string(&blob_key(&value), Mode::OptimismAltDA).unwrap();

        let response = send(&app, "PUT", &format!("/put/{wire}"), "garbage").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_bytes(response).await, "invalid commitment".as_bytes());

        let response = send(&app, "PUT", "/put/", value.clone()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = send(&app, "GET", &format!("/get/{wire}"), Body::empty()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, value);
    }

    #[tokio::test]
    async fn unknown_mode_is_bad_request() {
        let app = app();
        let response = send(&app, "GET", "/get/0x0100aa?commitment_mode=bogus", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_bytes(response).await, "invalid commitment mode".as_bytes());

        let response = send(&app, "PUT", "/put/?commitment_mode=bogus", "x").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_prefix_is_bad_request() {
        let response = send(&app(), "GET", "/get/0x05000000", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_commitment_is_bad_request() {
        let app = app();
        // right prefix, key too short
        let response = send(&app, "GET", "/get/0x0100000102", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(&app, "PUT", "/put/0x00abcd", "x").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_commitment_is_bad_request() {
        let response = send(&app(), "GET", "/get/", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_bytes(response).await, "invalid commitment".as_bytes());
    }

    #[tokio::test]
    async fn missing_blob_is_not_found() {
        let wire = CommitmentCodec::encode_string(&blob_key(b"never stored"), Mode::OptimismAltDA)
            .unwrap();
        let response = send(&app(), "GET", &format!("/get/{wire}"), Body::empty()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn tampered_object_is_internal_error() {
        let object = Arc::new(ObjectStoreBackend::in_memory(false));
        let key = blob_key(b"expected");
        object
            .put(&RequestContext::background(), &key, Bytes::from_static(b"tampered"))
            .await
            .unwrap();
        let app = ProxyServer::new(ServerConfig::default(), storage(object)).router();

        let wire = CommitmentCodec::encode_string(&key, Mode::OptimismGeneric).unwrap();
        let response = send(&app, "GET", &format!("/get/{wire}"), Body::empty()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_ne!(body_bytes(response).await, "tampered".as_bytes());
    }

    #[tokio::test]
    async fn stats_report_profiled_backends() {
        let app = app();
        send(&app, "PUT", "/put/?commitment_mode=simple", "counted").await;
        let response = send(&app, "GET", "/stats", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(json["availability"]["entries"], 1);
        assert_eq!(json["object"]["entries"], 0);
    }

    #[tokio::test]
    async fn domain_filter_is_accepted() {
        let app = app();
        let response = send(&app, "PUT", "/put/?commitment_mode=simple", "filtered").await;
        let commitment = body_bytes(response).await;
        let uri = format!(
            "/get/0x{}?domain=optimism&commitment_mode=simple",
            hex::encode(&commitment)
        );
        let response = send(&app, "GET", &uri, Body::empty()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
