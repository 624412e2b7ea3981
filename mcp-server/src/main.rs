//! VITA health MCP server.

use clap::Parser;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use vita_mcp::{client::WorkerClient, config::Config, create_app_with_sessions, mcp::McpSessionManager};

/// VITA - health data tools for AI assistants over MCP
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Base URL of the VITA worker API
    #[arg(long)]
    worker_url: Option<String>,

    /// Path of the MCP endpoint
    #[arg(long)]
    path: Option<String>,

    /// Idle seconds before a session is closed (0 disables)
    #[arg(long)]
    session_timeout: Option<u64>,

    /// Log level used when RUST_LOG is not set
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::from_figment(
        args.port,
        args.worker_url,
        args.path,
        args.session_timeout,
        args.log_level,
    )?;

    // Initialize logging - RUST_LOG, then the configured level, then info
    let default_level = config.log_level.as_deref().unwrap_or("info");
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .compact()
        .init();

    info!("Starting VITA MCP server...");
    info!("Worker API: {}", config.worker_url);

    let backend = WorkerClient::new(&config.worker_url)?;
    let sessions = McpSessionManager::new(std::sync::Arc::new(backend));
    if let Some(timeout) = config.session_timeout {
        sessions.spawn_idle_reaper(timeout);
        info!("Idle sessions close after {}s", timeout.as_secs());
    }

    let app = create_app_with_sessions(&config, sessions.clone());

    // Bind to 0.0.0.0 to be accessible from all interfaces (Docker, network, etc.)
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);
    info!("MCP endpoint: http://{}{}", addr, config.mcp_path);

    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down gracefully...");
        sessions.close_all();
        info!("Server shutting down");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    Ok(())
}
