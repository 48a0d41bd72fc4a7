//! `tradvisor onboard`: First-time setup.

use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = super::config_path(config_path);

    println!("  Tradvisor: First-Time Setup");
    println!("  ===========================\n");

    if let Some(dir) = config_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
            println!("  [ok] Created config directory: {}", dir.display());
        } else {
            println!("  Config directory exists: {}", dir.display());
        }
    }

    if config_path.exists() {
        println!("\n  [!] Config already exists at: {}", config_path.display());
        println!("      Edit it manually or delete and re-run onboard.\n");
        return Ok(());
    }

    let default_toml = tradvisor_config::AppConfig::default_toml();
    std::fs::write(&config_path, &default_toml)?;
    println!("  [ok] Created config.toml at: {}", config_path.display());
    println!("\n  Next steps:");
    println!("   1. Export XAI_API_KEY or add api_key to {}", config_path.display());
    println!("   2. Run: tradvisor doctor");
    println!("   3. Run: tradvisor ask \"Analyze NVDA\"\n");

    Ok(())
}
