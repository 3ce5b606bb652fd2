//! HTTP API Server
//!
//! Serves the archive search, item and feed routes until a shutdown signal
//! arrives on the broadcast channel.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::http::Method;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::HttpConfig;

use super::handlers::AppState;
use super::routes::create_router;

/// HTTP API server
pub struct HttpServer {
    config: HttpConfig,
    state: AppState,
}

impl HttpServer {
    pub fn new(config: HttpConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Parsed `http.listen_addr`
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.config
            .listen_addr
            .parse()
            .with_context(|| format!("Invalid HTTP listen address '{}'", self.config.listen_addr))
    }

    /// Run the HTTP server until `shutdown` fires
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        let addr = self.listen_addr()?;

        let mut app = create_router(self.state.clone());
        if self.config.cors_enabled {
            app = app.layer(feed_cors());
        }
        app = app.layer(TraceLayer::new_for_http());

        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind HTTP server to {}", addr))?;

        info!(
            "Serving the archive feed on http://{} (cors: {})",
            addr, self.config.cors_enabled
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                info!("HTTP server shutting down");
            })
            .await
            .context("HTTP server error")?;

        Ok(())
    }
}

/// Browser clients read the feed from any origin; preflight is handled by the layer
fn feed_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{ArchiveClient, PaginationDriver};
    use crate::config::{ArchiveConfig, FeedConfig};
    use crate::service::ArchiveService;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    fn server(listen_addr: &str) -> HttpServer {
        let archive = ArchiveConfig::default();
        let source = Arc::new(ArchiveClient::new(archive.clone()).unwrap());
        let driver = PaginationDriver::new(source.clone(), archive.clone(), &FeedConfig::default())
            .unwrap();
        let state = AppState {
            service: Arc::new(ArchiveService::new(source, archive.clone())),
            feed: Arc::new(Mutex::new(driver)),
            default_query: archive.default_query,
        };
        HttpServer::new(
            HttpConfig {
                listen_addr: listen_addr.to_string(),
                ..HttpConfig::default()
            },
            state,
        )
    }

    #[tokio::test]
    async fn test_listen_addr_parses() {
        let addr = server("127.0.0.1:8080").listen_addr().unwrap();
        assert_eq!(addr.port(), 8080);
    }

    #[tokio::test]
    async fn test_invalid_listen_addr_names_the_value() {
        let err = server("localhost").listen_addr().unwrap_err();
        assert!(err.to_string().contains("'localhost'"));
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let server = server("127.0.0.1:0");
        let (tx, rx) = broadcast::channel(1);
        tx.send(()).unwrap();
        server.run(rx).await.unwrap();
    }
}
