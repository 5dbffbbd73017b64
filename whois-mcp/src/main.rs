//! MCP server for WHOIS lookups over stdio.
//!
//! stdout carries the protocol, so all logging goes to stderr without colors.

mod server;

use rmcp::{transport::stdio, ServiceExt};
use server::WhoisServer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use whois_lib::{load_env_config, resolve_dialer, ConfigManager, WhoisClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_config = load_env_config();
    let filter = env_config
        .log
        .clone()
        .map(EnvFilter::new)
        .unwrap_or_else(|| EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let explicit = env_config.config.as_deref().map(std::path::Path::new);
    let file_config = ConfigManager::new().load(explicit)?;
    let dialer = resolve_dialer(file_config.proxy.as_ref())?;

    info!("Starting whois-mcp v{}", whois_lib::VERSION);

    let service = WhoisServer::new(WhoisClient::new().with_dialer(dialer))
        .serve(stdio())
        .await
        .inspect_err(|e| error!("Failed to start MCP server: {}", e))?;

    service.waiting().await?;
    Ok(())
}
