use std::sync::Arc;

use audio_mcp::{api, backend::InMemoryDeviceBackend, mcp::McpServer, Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!("Starting audio-mcp");

    let cfg = Config::load_from_env()?;
    info!(devices = cfg.devices.len(), "Configuration loaded");

    let backend = Arc::new(InMemoryDeviceBackend::new(&cfg.devices));
    let server = Arc::new(McpServer::new(cfg.mcp.clone(), backend));
    let router = api::create_router(server);
    let addr = cfg.bind_address();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", addr, e))?;

    info!("MCP server listening on {}", addr);

    let serve = axum::serve(listener, router);
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    };

    if let Err(e) = serve.with_graceful_shutdown(shutdown).await {
        tracing::error!(error = %e, "MCP server error");
    }

    info!("Application shutdown complete");
    Ok(())
}
