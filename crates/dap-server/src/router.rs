use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::Request;
use axum::routing::{get, put};
use axum::{middleware, Router};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::handler;
use crate::metrics::track_metrics;
use crate::state::AppState;

/// Build the axum router with all proxy endpoints.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let blobs = Router::new()
        .route("/get/", get(handler::missing_commitment_handler))
        .route("/get/:commitment", get(handler::get_handler))
        .route(
            "/put",
            put(handler::put_handler).post(handler::put_handler),
        )
        .route(
            "/put/",
            put(handler::put_handler).post(handler::put_handler),
        )
        .route(
            "/put/:commitment",
            put(handler::put_handler).post(handler::put_handler),
        )
        .route_layer(middleware::from_fn(track_metrics))
        .layer(DefaultBodyLimit::max(config.max_blob_size));

    Router::new()
        .route("/health", get(handler::health_handler))
        .route("/stats", get(handler::stats_handler))
        .merge(blobs)
        .layer(TimeoutLayer::new(config.write_timeout()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        id = %uuid::Uuid::now_v7(),
                        method = %req.method(),
                        uri = %req.uri(),
                    )
                })
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
