//! Classification of response items into events and function outputs.
//!
//! Items are handled strictly in the order the model produced them. Server
//! tool notices only signal progress. Function calls are executed locally
//! and their payloads collected for the next request. Message text becomes
//! `TextDelta`s. Anything else is skipped.

use serde_json::{Map, Value};
use tracing::{debug, trace, warn};
use tradvisor_core::function::FunctionRegistry;
use tradvisor_core::plan::Plan;
use tradvisor_core::provider::{ContentPart, FunctionCallOutput, ResponseItem, WebSearchAction};

use crate::functions::UPDATE_PLAN;
use crate::stream_event::AgentEvent;

pub const WEB_SEARCH: &str = "web_search";
pub const CODE_EXECUTION: &str = "code_execution";

const WEB_SEARCH_FALLBACK: &str = "Searching the web...";
const CODE_EXECUTION_FALLBACK: &str = "Executing Python code...";
const MAX_DESCRIPTION_CHARS: usize = 70;

/// What one response produced.
#[derive(Debug, Default)]
pub struct Interpretation {
    /// Events in item order.
    pub events: Vec<AgentEvent>,
    /// Payloads to send back, one per function call, in item order.
    pub outputs: Vec<FunctionCallOutput>,
}

impl Interpretation {
    /// No function calls means the model considers the task settled.
    pub fn is_settled(&self) -> bool {
        self.outputs.is_empty()
    }
}

pub struct ResponseInterpreter<'a> {
    functions: &'a FunctionRegistry,
}

impl<'a> ResponseInterpreter<'a> {
    pub fn new(functions: &'a FunctionRegistry) -> Self {
        Self { functions }
    }

    /// Interpret one response's items. `plan` is replaced on every
    /// `update_plan` call.
    pub fn interpret(&self, items: &[ResponseItem], plan: &mut Option<Plan>) -> Interpretation {
        let mut out = Interpretation::default();

        for item in items {
            match item {
                ResponseItem::WebSearchCall { action } => {
                    debug!("Server ran web search");
                    let description = web_search_description(action.as_ref());
                    out.events.push(AgentEvent::tool_call(WEB_SEARCH, description));
                }
                ResponseItem::CodeInterpreterCall { code } => {
                    debug!("Server ran code");
                    out.events.push(AgentEvent::tool_call(
                        CODE_EXECUTION,
                        code_description(code.as_deref()),
                    ));
                }
                ResponseItem::FunctionCall {
                    name,
                    arguments,
                    call_id,
                } => {
                    let args = parse_arguments(name, arguments);
                    let summary = args
                        .get("task_summary")
                        .and_then(Value::as_str)
                        .unwrap_or_default();
                    debug!(function = %name, call_id = %call_id, "Model called custom function");
                    out.events.push(AgentEvent::tool_call(name.as_str(), summary));

                    if name == UPDATE_PLAN {
                        let updated = Plan::from_arguments(&args);
                        out.events.push(AgentEvent::plan_update(&updated));
                        *plan = Some(updated);
                    }

                    let output = self.functions.execute(name, &args);
                    out.outputs.push(FunctionCallOutput {
                        call_id: call_id.clone(),
                        output,
                    });
                }
                ResponseItem::Message { content } => {
                    for part in content {
                        match part {
                            ContentPart::OutputText { text } => {
                                out.events.push(AgentEvent::text(text.as_str()));
                            }
                            ContentPart::Other => trace!("Skipping non-text content part"),
                        }
                    }
                }
                ResponseItem::Unknown => trace!("Skipping unrecognized response item"),
            }
        }

        out
    }
}

/// Normalize function arguments to a JSON object. Anything that is not an
/// object, or a string encoding one, becomes `{}`.
pub fn parse_arguments(function: &str, raw: &Value) -> Value {
    let parsed = match raw {
        Value::Object(_) => Some(raw.clone()),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(v) if v.is_object() => Some(v),
            Ok(_) => None,
            Err(e) => {
                warn!(function, error = %e, "Malformed function arguments, using {{}}");
                None
            }
        },
        _ => None,
    };
    parsed.unwrap_or_else(|| Value::Object(Map::new()))
}

fn web_search_description(action: Option<&WebSearchAction>) -> String {
    action
        .and_then(|a| a.query.as_deref())
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(truncate)
        .unwrap_or_else(|| WEB_SEARCH_FALLBACK.to_string())
}

fn code_description(code: Option<&str>) -> String {
    code.and_then(|c| c.lines().map(str::trim).find(|l| !l.is_empty()))
        .map(truncate)
        .unwrap_or_else(|| CODE_EXECUTION_FALLBACK.to_string())
}

fn truncate(s: &str) -> String {
    if s.chars().count() <= MAX_DESCRIPTION_CHARS {
        return s.to_string();
    }
    let head: String = s.chars().take(MAX_DESCRIPTION_CHARS - 3).collect();
    format!("{head}...")
}
