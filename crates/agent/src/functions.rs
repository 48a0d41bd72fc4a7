//! Locally executed custom functions.
//!
//! Only `update_plan` exists. The plan itself is replaced by the
//! interpreter; the handler just acknowledges so the model moves on.

use serde_json::{Value, json};
use tradvisor_core::error::FunctionError;
use tradvisor_core::function::{FunctionHandler, FunctionRegistry};

pub const UPDATE_PLAN: &str = "update_plan";

/// Acknowledges a plan update.
pub struct UpdatePlanHandler;

impl FunctionHandler for UpdatePlanHandler {
    fn name(&self) -> &str {
        UPDATE_PLAN
    }

    fn description(&self) -> &str {
        "Create or update the execution plan for the current task. \
         MUST be called at the START of every task to create a plan. \
         Call again after each major step to update progress. \
         The user sees this plan in real-time, so make steps clear and concise."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "task_summary": {
                    "type": "string",
                    "description": "One-line summary of the overall task"
                },
                "steps": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "description": { "type": "string" },
                            "status": {
                                "type": "string",
                                "enum": ["pending", "in_progress", "completed", "skipped"]
                            },
                            "result": {
                                "type": "string",
                                "description": "Brief result summary (when completed)"
                            }
                        },
                        "required": ["id", "description", "status"]
                    }
                },
                "is_complete": {
                    "type": "boolean",
                    "description": "Set true when ALL steps are done and final analysis is ready"
                },
                "explanation": {
                    "type": "string",
                    "description": concat!(
                        "Optional one sentence on why this step matters. ",
                        "Shown to the user as thinking out loud."
                    )
                }
            },
            "required": ["steps", "is_complete"]
        })
    }

    fn call(&self, _arguments: &Value) -> Result<Value, FunctionError> {
        Ok(json!({
            "status": "ok",
            "message": "Plan updated. Continue with next step."
        }))
    }
}

/// The registry every agent loop starts with.
pub fn default_registry() -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();
    registry.register(Box::new(UpdatePlanHandler));
    registry
}
