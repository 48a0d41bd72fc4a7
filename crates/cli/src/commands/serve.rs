//! `tradvisor serve`: Start the HTTP/SSE gateway.

use std::path::Path;
use tracing::info;

pub async fn run(
    config_path: Option<&Path>,
    host_override: Option<String>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(config_path)?;

    if let Some(host) = host_override {
        config.gateway.host = host;
    }
    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    // Fail with setup help before binding anything.
    super::build_agent(&config)?;

    println!("  Tradvisor Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Stream:    POST /v1/research/stream");
    println!("   Model:     {}", config.model);

    info!(host = %config.gateway.host, port = config.gateway.port, "Starting gateway");
    tradvisor_gateway::start(config).await?;

    Ok(())
}
