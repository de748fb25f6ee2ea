//! Skiff MCP Server entry point.
//!
//! Attaches the configured sessions, then serves the file tools over
//! stdio (the default), HTTP, or both.

use rmcp::transport::stdio;
use rmcp::ServiceExt;
use skiff_core::SandboxRegistry;
use skiff_mcp::{attach_sessions, http, SkiffConfig, SkiffServer, TransportMode, TOOL_NAMES};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr (stdout is MCP transport)
    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive("skiff_mcp=info".parse()?)
                .add_directive("skiff_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Skiff MCP Server");

    let config = SkiffConfig::from_env();
    tracing::info!(?config, "Configuration loaded");

    // Warn-only so the server can start before any sandbox exists
    config.validate_warn();

    let registry = Arc::new(SandboxRegistry::new());
    attach_sessions(&config, &registry).await;

    let server = SkiffServer::new(registry.clone());
    tracing::info!(
        backend = config.backend.as_str(),
        tools = ?TOOL_NAMES,
        "Available tools"
    );

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let mut handles = Vec::new();

    if config.transport_mode.http_enabled() {
        let http_server = server.clone();
        let http_addr = config.http_addr;
        let mut shutdown_rx = shutdown_tx.subscribe();

        let http_handle = tokio::spawn(async move {
            let shutdown = async move {
                let _ = shutdown_rx.recv().await;
            };

            if let Err(e) = http::serve(http_server, http_addr, shutdown).await {
                tracing::error!(error = %e, "HTTP server error");
            }
        });

        handles.push(http_handle);
        tracing::info!(addr = %config.http_addr, "HTTP transport enabled");
    }

    if config.transport_mode.stdio_enabled() {
        let stdio_server = server.clone();
        let mut shutdown_rx = shutdown_tx.subscribe();

        let stdio_handle = tokio::spawn(async move {
            match stdio_server.serve(stdio()).await {
                Ok(service) => {
                    tokio::select! {
                        result = service.waiting() => {
                            if let Err(e) = result {
                                tracing::error!(error = %e, "Stdio service error");
                            }
                        }
                        _ = async { shutdown_rx.recv().await } => {
                            tracing::info!("Stdio transport shutting down");
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to start stdio transport");
                }
            }
        });

        handles.push(stdio_handle);
        tracing::info!("Stdio transport enabled");
    }

    match config.transport_mode {
        TransportMode::Both => {
            tracing::info!(http_addr = %config.http_addr, "Server ready (stdio + HTTP)");
        }
        TransportMode::Http => {
            tracing::info!(http_addr = %config.http_addr, "Server ready (HTTP only)");
        }
        TransportMode::Stdio => {
            tracing::info!("Server ready (stdio only)");
        }
    }

    signal::ctrl_c().await?;
    tracing::info!("Received shutdown signal");

    let _ = shutdown_tx.send(());

    // Sandboxes belong to their owners; only our handles are released.
    for session_id in registry.list().await {
        registry.remove(&session_id).await;
    }

    for handle in handles {
        let _ = handle.await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}
