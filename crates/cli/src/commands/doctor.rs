//! `tradvisor doctor`: Diagnose configuration problems.

use std::path::Path;
use tradvisor_config::AppConfig;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("  Tradvisor Doctor: Diagnostics");
    println!("  =============================\n");

    let mut issues = 0;
    let path = super::config_path(config_path);

    if path.exists() {
        println!("  [ok] Config file found: {}", path.display());
    } else {
        println!("  [!]  No config file, defaults in use. Run `tradvisor onboard`");
    }

    let config = match AppConfig::load_with_env(&path) {
        Ok(config) => {
            println!("  [ok] Configuration valid");
            Some(config)
        }
        Err(e) => {
            println!("  [x]  Configuration invalid: {e}");
            issues += 1;
            None
        }
    };

    if let Some(config) = config {
        if config.has_api_key() {
            println!("  [ok] API key configured");
        } else {
            println!("  [x]  No API key. Export XAI_API_KEY or add api_key to the config file");
            issues += 1;
        }

        if config.base_url.starts_with("https://") {
            println!("  [ok] Endpoint uses TLS: {}", config.base_url);
        } else {
            println!("  [!]  Endpoint is not HTTPS: {}", config.base_url);
        }

        if config.max_iterations < 3 {
            println!(
                "  [!]  max_iterations = {} leaves little room for planning",
                config.max_iterations
            );
        }
    }

    println!();
    if issues == 0 {
        println!("  All checks passed!");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
