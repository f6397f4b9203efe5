pub mod api;
pub mod cli;
pub mod core;
pub mod providers;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::core::MarketService;
use crate::core::config::AppConfig;

pub enum AppCommand {
    /// Run the HTTP API. `port` overrides the configured listen port.
    Serve { port: Option<u16> },
    Catalog,
    Snapshot { json: bool },
    History {
        symbols: Vec<String>,
        range: String,
        interval: String,
        json: bool,
    },
}

/// Loads the config and wires the registry and provider into a service.
pub fn build_service(config: &AppConfig) -> Result<MarketService> {
    let registry = Arc::new(config.registry()?);
    let yahoo = &config.providers.yahoo;
    let provider = providers::YahooFinanceProvider::with_timeout(
        &yahoo.base_url,
        Duration::from_secs(yahoo.timeout_secs),
    )
    .context("Failed to create Yahoo Finance provider")?;
    Ok(MarketService::new(registry, Arc::new(provider)))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let service = build_service(&config)?;

    match command {
        AppCommand::Serve { port } => serve(&config, service, port).await,
        AppCommand::Catalog => {
            println!("{}", cli::market::catalog_table(service.registry()));
            Ok(())
        }
        AppCommand::Snapshot { json } => cli::market::show_snapshot(&service, json).await,
        AppCommand::History {
            symbols,
            range,
            interval,
            json,
        } => cli::market::show_history(&service, &symbols, &range, &interval, json).await,
    }
}

async fn serve(config: &AppConfig, service: MarketService, port: Option<u16>) -> Result<()> {
    let mut listen_addr: SocketAddr = config.server.listen_addr;
    if let Some(port) = port {
        listen_addr.set_port(port);
    }

    let state = Arc::new(api::AppState { market: service });
    let mut router = api::app_router(state);
    if let Some(static_dir) = &config.server.static_dir {
        info!("Serving static files from {}", static_dir.display());
        router = api::with_static_dir(router, static_dir);
    }

    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("Failed to bind {listen_addr}"))?;
    info!("Market board listening on http://{}", listen_addr);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
