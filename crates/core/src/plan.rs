//! Plan state: the structured progress record of a research task.
//!
//! A plan is created by the model through the `update_plan` function and is
//! replaced wholesale on every update. Fields the model omits fall back to
//! their empty defaults, never to the previous plan's values.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Status of a single plan step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    InProgress,
    Completed,
    Skipped,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Skipped => "skipped",
        }
    }

    /// Whether the step no longer needs work.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Completed | Self::Skipped)
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of [`Plan::steps`].
///
/// `id` is opaque caller data; it is neither checked for uniqueness nor used
/// for ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: i64,
    pub description: String,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl Step {
    pub fn new(id: i64, description: impl Into<String>, status: StepStatus) -> Self {
        Self {
            id,
            description: description.into(),
            status,
            result: None,
        }
    }

    pub fn with_result(mut self, result: impl Into<String>) -> Self {
        self.result = Some(result.into());
        self
    }

    /// Read one step as the model wrote it, at `index` in the list.
    ///
    /// `description` and a known `status` are required. The id accepts
    /// integers, whole-number floats and numeric strings; a missing or
    /// unreadable id becomes the step's 1-based position.
    pub fn from_value(index: usize, value: &Value) -> Option<Self> {
        let Some(fields) = value.as_object() else {
            warn!(index, "Dropping plan step that is not an object");
            return None;
        };

        let Some(description) = fields.get("description").and_then(Value::as_str) else {
            warn!(index, "Dropping plan step without a description");
            return None;
        };

        let status = fields
            .get("status")
            .cloned()
            .and_then(|s| serde_json::from_value::<StepStatus>(s).ok());
        let Some(status) = status else {
            warn!(index, status = ?fields.get("status"), "Dropping plan step with unknown status");
            return None;
        };

        let id = fields.get("id").and_then(lenient_id).unwrap_or_else(|| {
            debug!(index, id = ?fields.get("id"), "Plan step id unreadable, using its position");
            index as i64 + 1
        });

        Some(Self {
            id,
            description: description.to_string(),
            status,
            result: fields
                .get("result")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

fn lenient_id(value: &Value) -> Option<i64> {
    let whole = |f: f64| (f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64);
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole))
        }
        _ => None,
    }
}

/// The plan for one task. Steps keep the order the model gave them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub task_summary: String,
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Informational only. The agent loop never terminates on this flag.
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default)]
    pub explanation: String,
}

impl Plan {
    /// Build a plan from raw `update_plan` arguments.
    ///
    /// Every field is read independently: a missing or mistyped field takes
    /// its default. See [`Step::from_value`] for how steps are read; steps
    /// that cannot be read are dropped with a warning while the remaining
    /// steps keep their order.
    pub fn from_arguments(args: &Value) -> Self {
        let task_summary = args
            .get("task_summary")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let steps = args
            .get("steps")
            .and_then(Value::as_array)
            .map(|raw| {
                raw.iter()
                    .enumerate()
                    .filter_map(|(index, value)| Step::from_value(index, value))
                    .collect()
            })
            .unwrap_or_default();

        let is_complete = args
            .get("is_complete")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let explanation = args
            .get("explanation")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Self {
            task_summary,
            steps,
            is_complete,
            explanation,
        }
    }

    /// Number of steps currently marked in progress. The model is asked to
    /// keep this at most one, but nothing enforces it.
    pub fn in_progress_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::InProgress)
            .count()
    }

    /// Number of completed or skipped steps.
    pub fn settled_count(&self) -> usize {
        self.steps.iter().filter(|s| s.status.is_settled()).count()
    }

    /// The first step marked in progress, if any.
    pub fn current_step(&self) -> Option<&Step> {
        self.steps
            .iter()
            .find(|s| s.status == StepStatus::InProgress)
    }
}
