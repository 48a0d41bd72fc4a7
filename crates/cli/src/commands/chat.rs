//! `tradvisor chat`: Interactive research session.
//!
//! Each line starts a new task. Earlier questions and answers are replayed
//! as history so follow-ups ("and MSFT?") keep their context.

use std::io::Write;
use std::path::Path;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tradvisor_core::message::HistoryMessage;

use crate::render::TaskRenderer;

const EXIT_COMMANDS: [&str; 4] = ["exit", "quit", "q", "/quit"];

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let agent = super::build_agent(&config)?;

    println!();
    println!("  ==============================================");
    println!("       Tradvisor - AI stock research agent");
    println!("  ==============================================");
    println!();
    println!("  Model:      {}", config.model);
    println!("  Endpoint:   {}", config.base_url);
    println!("  Max steps:  {}", agent.max_iterations());
    println!();
    println!("  Examples:   \"Analyze NVDA\", \"Compare AAPL vs MSFT\"");
    println!("  Type 'exit' or Ctrl+D to quit, '/reset' to clear history.");
    println!();

    let mut history: Vec<HistoryMessage> = Vec::new();
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = std::io::stdout();

    loop {
        print!("  You > ");
        stdout.flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if EXIT_COMMANDS.contains(&query.to_lowercase().as_str()) {
            println!("  Goodbye!");
            break;
        }
        if query == "/reset" {
            history.clear();
            println!("  History cleared.");
            continue;
        }

        info!(history = history.len(), "Starting chat turn");
        let mut rx = agent.run_stream_with_history(query, &history);
        let mut renderer = TaskRenderer::new();
        while let Some(event) = rx.recv().await {
            if let Some(out) = renderer.render(&event) {
                write!(stdout, "{out}")?;
                stdout.flush()?;
            }
        }
        println!();

        record_turn(&mut history, query, &renderer);
    }

    Ok(())
}

/// Remember a finished turn. The answer of a turn that ended on a failed
/// invocation is not replayed.
fn record_turn(history: &mut Vec<HistoryMessage>, query: &str, renderer: &TaskRenderer) {
    history.push(HistoryMessage::user(query));
    let answer = renderer.text().trim();
    if renderer.failed() {
        debug!("Turn failed, answer not kept in history");
    } else if !answer.is_empty() {
        history.push(HistoryMessage::assistant(answer));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradvisor_agent::{API_ERROR_PREFIX, AgentEvent};
    use tradvisor_core::message::Role;

    fn done() -> AgentEvent {
        AgentEvent::Done {
            iterations: 1,
            plan: None,
        }
    }

    #[test]
    fn answered_turn_is_recorded() {
        let mut renderer = TaskRenderer::new();
        renderer.render(&AgentEvent::text("AAPL trades at 28x."));
        renderer.render(&done());

        let mut history = vec![];
        record_turn(&mut history, "Analyze AAPL", &renderer);

        let roles: Vec<Role> = history.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
        assert_eq!(history[1].content, "AAPL trades at 28x.");
    }

    #[test]
    fn failed_turn_keeps_only_the_question() {
        let mut renderer = TaskRenderer::new();
        renderer.render(&AgentEvent::text("Partial thoughts"));
        renderer.render(&AgentEvent::text(format!("{API_ERROR_PREFIX}Network error: reset")));
        renderer.render(&done());

        let mut history = vec![];
        record_turn(&mut history, "Analyze AAPL", &renderer);

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, Role::User);
        assert!(history.iter().all(|m| !m.content.contains("API Error")));
    }
}
