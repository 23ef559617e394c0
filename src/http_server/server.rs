//! # HTTP Server
//!
//! Binds the benchmark routes and the health check into one Axum server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::bench_routes::bench_routes;
use super::config::HttpServerConfig;
use super::observability_routes::health_routes;
use crate::ops::BenchOperations;

/// HTTP server for the benchmark endpoints
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, ops: BenchOperations) -> Self {
        let router = Self::build_router(ops);
        Self { config, router }
    }

    /// Build the combined router
    pub fn build_router(ops: BenchOperations) -> Router {
        // Request spans stay at DEBUG so the default filter adds no per-request cost
        let trace = TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
            .on_response(DefaultOnResponse::new().level(Level::DEBUG));

        Router::new()
            .merge(health_routes())
            .merge(bench_routes(Arc::new(ops)))
            .layer(trace)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until Ctrl-C
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid socket address {}: {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, "benchmark server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("benchmark server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
