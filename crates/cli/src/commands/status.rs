//! `tradvisor status`: Show the effective configuration.

use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let path = super::config_path(config_path);
    let config = super::load_config(config_path)?;

    println!("  Tradvisor Status");
    println!("  ================");
    println!("  Config file:     {}", path.display());
    println!("  Endpoint:        {}", config.base_url);
    println!("  Model:           {}", config.model);
    println!("  Max iterations:  {}", config.max_iterations);
    println!("  Request timeout: {}s", config.request_timeout_secs);
    println!("  Event buffer:    {}", config.event_buffer);
    println!(
        "  Context reset:   {}",
        if config.reset_context_on_media_error { "on media errors" } else { "disabled" }
    );
    println!("  Gateway:         {}:{}", config.gateway.host, config.gateway.port);
    println!(
        "  API key:         {}",
        if config.has_api_key() { "configured" } else { "missing" }
    );

    if path.exists() {
        println!("\n  [ok] Config file found");
    } else {
        println!("\n  [!] No config file, using defaults. Run `tradvisor onboard` to create one");
    }

    Ok(())
}
