//! Locus - HTTP server entry point

use std::net::SocketAddr;

use anyhow::Context;
use tokio::{net::TcpListener, signal};

use locus_rust::{Config, create_app, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        // Only warn if it's not a "file not found" error
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    let config = Config::load()
        .context("Failed to load configuration. Check config/*.toml and LOCUS__* env vars")?;

    init_tracing(&config.logging).map_err(|e| anyhow::anyhow!("Failed to init tracing: {e}"))?;

    tracing::info!("Starting Locus server...");
    tracing::info!(
        "Configuration loaded: server={}:{}",
        config.server.host,
        config.server.port
    );

    let addr = SocketAddr::new(
        config
            .server
            .host
            .parse()
            .context("server.host is not an IP address")?,
        config.server.port,
    );
    let enable_docs = config.server.enable_docs;

    let app_handle = create_app(config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create application: {e}"))?;

    tracing::info!("Server listening on {}", addr);
    if enable_docs {
        tracing::info!("API documentation available at http://{}/docs", addr);
    }

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app_handle.router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // In-flight requests have finished; nothing should be left behind
    if let Err(e) = app_handle.workspaces.purge_stale() {
        tracing::warn!(error = %e, "Failed to sweep workspace root on shutdown");
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}
