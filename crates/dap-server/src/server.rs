use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use hyper::body::Incoming;
use hyper::Request;
use hyper_util::rt::{TokioExecutor, TokioIo, TokioTimer};
use hyper_util::server::conn::auto::Builder;
use hyper_util::server::graceful::GracefulShutdown;
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use dap_store::Router;

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::router::build_router;
use crate::state::AppState;

/// Data-availability proxy server.
pub struct ProxyServer {
    config: ServerConfig,
    state: AppState,
}

impl ProxyServer {
    pub fn new(config: ServerConfig, storage: Arc<Router>) -> Self {
        let state = AppState::new(storage, config.write_timeout());
        Self { config, state }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone(), &self.config)
    }

    /// Bind the configured address and serve until `shutdown` fires.
    pub async fn serve(self, shutdown: CancellationToken) -> ServerResult<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve_on(listener, shutdown).await
    }

    /// Serve connections from an already bound listener.
    ///
    /// Each connection must deliver its request headers within the header
    /// read timeout; the much longer write timeout bounds the whole request.
    /// Once `shutdown` fires no new connections are accepted and open ones
    /// are drained for at most the shutdown timeout.
    pub async fn serve_on(self, listener: TcpListener, shutdown: CancellationToken) -> ServerResult<()> {
        let endpoint: SocketAddr = listener.local_addr()?;
        tracing::info!(%endpoint, "starting DA proxy server");

        let app = self.router();
        let mut builder = Builder::new(TokioExecutor::new());
        builder
            .http1()
            .timer(TokioTimer::new())
            .header_read_timeout(self.config.read_header_timeout());
        let graceful = GracefulShutdown::new();

        loop {
            let (stream, peer) = tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = listener.accept() => match accepted {
                    Ok(conn) => conn,
                    Err(err) => {
                        tracing::warn!(error = %err, "failed to accept connection");
                        continue;
                    }
                },
            };

            let service = TowerToHyperService::new(
                app.clone()
                    .map_request(|req: Request<Incoming>| req.map(Body::new)),
            );
            let conn = builder.serve_connection(TokioIo::new(stream), service);
            let conn = graceful.watch(conn.into_owned());
            tokio::spawn(async move {
                if let Err(err) = conn.await {
                    tracing::debug!(%peer, error = %err, "connection closed with error");
                }
            });
        }

        drop(listener);
        tracing::info!(%endpoint, "draining open connections");
        tokio::select! {
            _ = graceful.shutdown() => {
                tracing::info!(%endpoint, "DA proxy server stopped");
            }
            _ = tokio::time::sleep(self.config.shutdown_timeout()) => {
                tracing::warn!(%endpoint, "shutdown timed out with requests still in flight");
            }
        }
        Ok(())
    }
}
