//! Agent-level streaming events.
//!
//! `AgentEvent` is the only thing a consumer sees of a research task. The
//! gateway forwards these over SSE and the CLI renders them.

use serde::{Deserialize, Serialize};
use tradvisor_core::plan::{Plan, Step};

/// Events emitted by the agent loop, in order:
/// - `plan_update`: the model replaced the plan
/// - `tool_call`: a server-side tool ran or a custom function was called
/// - `text_delta`: one assistant text block
/// - `done`: always last, exactly once per task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// The plan after a successful `update_plan` call.
    PlanUpdate {
        task_summary: String,
        steps: Vec<Step>,
        is_complete: bool,
        explanation: String,
    },

    /// A tool invocation notice. `description` may be empty.
    ToolCall { name: String, description: String },

    /// Assistant text. Concatenating every delta of a task gives the full
    /// natural-language output.
    TextDelta { content: String },

    /// The task is over, however it ended.
    Done {
        iterations: u32,
        plan: Option<Plan>,
    },
}

impl AgentEvent {
    /// SSE event name for this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::PlanUpdate { .. } => "plan_update",
            Self::ToolCall { .. } => "tool_call",
            Self::TextDelta { .. } => "text_delta",
            Self::Done { .. } => "done",
        }
    }

    pub fn plan_update(plan: &Plan) -> Self {
        Self::PlanUpdate {
            task_summary: plan.task_summary.clone(),
            steps: plan.steps.clone(),
            is_complete: plan.is_complete,
            explanation: plan.explanation.clone(),
        }
    }

    pub fn tool_call(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::ToolCall {
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::TextDelta {
            content: content.into(),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done { .. })
    }
}
