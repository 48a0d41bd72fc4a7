//! Plain-text rendering of agent events for the terminal.
//!
//! The first plan is drawn in full, later updates as a one-line progress
//! summary, and a completed plan in full again. Assistant text is buffered
//! and printed once the task is done; a failed invocation is printed
//! apart from it.

use tradvisor_agent::interpreter::{CODE_EXECUTION, WEB_SEARCH};
use tradvisor_agent::{API_ERROR_PREFIX, AgentEvent, UPDATE_PLAN};
use tradvisor_core::plan::{Step, StepStatus};

const TASK_PREVIEW_CHARS: usize = 50;
const EXPLANATION_PREVIEW_CHARS: usize = 40;
const RESULT_PREVIEW_CHARS: usize = 60;

fn status_icon(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Pending => "[ ]",
        StepStatus::InProgress => "[>]",
        StepStatus::Completed => "[x]",
        StepStatus::Skipped => "[-]",
    }
}

fn preview(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let head: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{head}...")
}

/// Full plan table.
pub fn render_plan(task_summary: &str, steps: &[Step], explanation: &str) -> String {
    let mut out = String::new();
    let explanation = explanation.trim();
    if !explanation.is_empty() {
        out.push_str(&format!("  -> {explanation}\n"));
    }

    let title = if task_summary.is_empty() {
        "Execution Plan"
    } else {
        task_summary
    };
    out.push_str(&format!("\n  {title}\n"));
    out.push_str(&format!("  {}\n", "-".repeat(title.chars().count().max(14))));

    let width = steps
        .iter()
        .map(|s| s.description.chars().count())
        .max()
        .unwrap_or(0);

    for step in steps {
        let result = step.result.as_deref().unwrap_or_default();
        if result.is_empty() {
            out.push_str(&format!("  {} {}\n", status_icon(step.status), step.description));
        } else {
            out.push_str(&format!(
                "  {} {:<width$}  {}\n",
                status_icon(step.status),
                step.description,
                preview(result, RESULT_PREVIEW_CHARS),
            ));
        }
    }
    out
}

/// One-line progress: task, completed/total, and a short explanation.
/// Skipped steps do not count as completed.
pub fn render_progress(task_summary: &str, steps: &[Step], explanation: &str) -> String {
    let completed = steps
        .iter()
        .filter(|s| s.status == StepStatus::Completed)
        .count();
    let mut line = format!(
        "  ~ {} ({completed}/{})",
        preview(task_summary, TASK_PREVIEW_CHARS),
        steps.len()
    );
    let explanation = explanation.trim();
    if !explanation.is_empty() {
        line.push_str(&format!("  - {}", preview(explanation, EXPLANATION_PREVIEW_CHARS)));
    }
    line.push('\n');
    line
}

/// Tool indicator line. Plan updates are drawn by the plan renderer.
pub fn render_tool_call(name: &str, description: &str) -> Option<String> {
    match name {
        UPDATE_PLAN => None,
        WEB_SEARCH => Some(format!("  >> Web Search (server-side) {description}\n")),
        CODE_EXECUTION => Some(format!("  >> Code Execution (server-side) {description}\n")),
        other if description.is_empty() => Some(format!("  >> {other}\n")),
        other => Some(format!("  >> {other}: {description}\n")),
    }
}

/// Turns the event stream of one task into terminal text.
#[derive(Default)]
pub struct TaskRenderer {
    plans_seen: usize,
    text: String,
    error: Option<String>,
}

impl TaskRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text to print for `event`, if any.
    pub fn render(&mut self, event: &AgentEvent) -> Option<String> {
        match event {
            AgentEvent::PlanUpdate {
                task_summary,
                steps,
                is_complete,
                explanation,
            } => {
                self.plans_seen += 1;
                let compact = self.plans_seen > 1 && !is_complete && !steps.is_empty();
                Some(if compact {
                    render_progress(task_summary, steps, explanation)
                } else {
                    render_plan(task_summary, steps, explanation)
                })
            }
            AgentEvent::ToolCall { name, description } => render_tool_call(name, description),
            AgentEvent::TextDelta { content } => {
                match content.strip_prefix(API_ERROR_PREFIX) {
                    Some(error) => self.error = Some(error.trim().to_string()),
                    None => self.text.push_str(content),
                }
                None
            }
            AgentEvent::Done { iterations, .. } => {
                let mut out = String::new();
                let text = self.text.trim();
                if !text.is_empty() {
                    out.push_str("\n  === Analysis ===\n\n");
                    for line in text.lines() {
                        out.push_str(&format!("  {line}\n"));
                    }
                }
                match &self.error {
                    Some(error) => out.push_str(&format!(
                        "\n  [x] API Error: {error}\n  Stopped after {iterations} iteration(s)\n"
                    )),
                    None => {
                        out.push_str(&format!("\n  Completed in {iterations} iteration(s)\n"))
                    }
                }
                Some(out)
            }
        }
    }

    /// All assistant text seen so far, without any invocation error.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the task ended on a failed model invocation.
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}
