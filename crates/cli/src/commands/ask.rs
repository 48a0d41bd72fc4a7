//! `tradvisor ask`: Run one research task.

use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::render::TaskRenderer;

pub async fn run(
    config_path: Option<&Path>,
    task: &str,
    json: bool,
    max_iterations: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let task = task.trim();
    if task.is_empty() {
        return Err("Task must not be empty".into());
    }

    let config = super::load_config(config_path)?;
    let mut agent = super::build_agent(&config)?;
    if let Some(max) = max_iterations {
        agent = agent.with_max_iterations(max);
    }

    info!(max_iterations = agent.max_iterations(), json, "Running research task");
    let mut rx = agent.run_stream(task);
    let mut stdout = std::io::stdout();

    if json {
        while let Some(event) = rx.recv().await {
            writeln!(stdout, "{}", serde_json::to_string(&event)?)?;
        }
        return Ok(());
    }

    eprintln!("  Agent working...");
    let mut renderer = TaskRenderer::new();
    while let Some(event) = rx.recv().await {
        if let Some(out) = renderer.render(&event) {
            write!(stdout, "{out}")?;
            stdout.flush()?;
        }
    }

    Ok(())
}
