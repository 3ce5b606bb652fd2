use anyhow::{Context, Result};
use retrofeed::{
    archive::PaginationDriver,
    config::Config,
    server::{AppState, HttpServer},
    service::ArchiveService,
};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

/// Run the HTTP API until Ctrl-C
pub async fn serve(mut config: Config, listen: Option<String>) -> Result<()> {
    if let Some(addr) = listen {
        config.http.listen_addr = addr;
    }

    let service = ArchiveService::from_config(config.archive.clone())
        .context("Failed to set up archive client")?;
    let driver = PaginationDriver::new(service.source(), config.archive.clone(), &config.feed)?;

    let state = AppState {
        service: Arc::new(service),
        feed: Arc::new(Mutex::new(driver)),
        default_query: config.archive.default_query.clone(),
    };

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl-C"),
            Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
        }
        let _ = shutdown_tx.send(());
    });

    HttpServer::new(config.http, state).run(shutdown_rx).await
}
