pub mod ask;
pub mod chat;
pub mod doctor;
pub mod onboard;
pub mod serve;
pub mod status;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tradvisor_agent::AgentLoop;
use tradvisor_config::AppConfig;
use tradvisor_providers::ResponsesApiProvider;

/// The config file in effect: `--config` if given, else the default path.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::config_path)
}

/// Load, apply env overrides, and validate.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let path = config_path(explicit);
    AppConfig::load_with_env(&path).map_err(|e| format!("Failed to load config: {e}").into())
}

/// Build the agent loop, refusing to start without a credential.
pub fn build_agent(config: &AppConfig) -> Result<AgentLoop, Box<dyn std::error::Error>> {
    if !config.has_api_key() {
        print_missing_key_help();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let provider = ResponsesApiProvider::from_config(config)?;
    Ok(AgentLoop::new(Arc::new(provider), config))
}

fn print_missing_key_help() {
    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    export XAI_API_KEY='xai-...'          (recommended)");
    eprintln!("    export TRADVISOR_API_KEY='...'        (generic)");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_path().display());
    eprintln!();
    eprintln!("  Get an xAI key at: https://console.x.ai");
    eprintln!();
}
