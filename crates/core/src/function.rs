//! Custom functions: the capabilities executed locally rather than on the
//! model's servers.
//!
//! The registry always produces a serialized payload to send back to the
//! model. Unknown names and handler failures become `{"error": ...}`
//! payloads so the remote conversation can continue.

use serde_json::{Value, json};
use std::collections::HashMap;
use tracing::warn;

use crate::error::FunctionError;
use crate::provider::ToolSpec;

/// A locally executed function the model can call.
pub trait FunctionHandler: Send + Sync {
    /// The function name advertised to the model (e.g., "update_plan").
    fn name(&self) -> &str;

    /// A description of what this function does (sent to the model).
    fn description(&self) -> &str;

    /// JSON Schema describing this function's parameters.
    fn parameters_schema(&self) -> Value;

    /// Run the function. `arguments` is always a JSON object.
    fn call(&self, arguments: &Value) -> Result<Value, FunctionError>;

    /// Convert this handler into a tool descriptor for the model.
    fn to_spec(&self) -> ToolSpec {
        ToolSpec::function(self.name(), self.description(), self.parameters_schema())
    }
}

/// Name-to-handler lookup for custom functions.
pub struct FunctionRegistry {
    handlers: HashMap<String, Box<dyn FunctionHandler>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler. Replaces any existing handler with the same name.
    pub fn register(&mut self, handler: Box<dyn FunctionHandler>) {
        let name = handler.name().to_string();
        self.handlers.insert(name, handler);
    }

    pub fn get(&self, name: &str) -> Option<&dyn FunctionHandler> {
        self.handlers.get(name).map(|h| h.as_ref())
    }

    /// Tool descriptors for every registered function, sorted by name so
    /// requests are stable across runs.
    pub fn specs(&self) -> Vec<ToolSpec> {
        let mut names: Vec<&String> = self.handlers.keys().collect();
        names.sort();
        names
            .into_iter()
            .filter_map(|n| self.handlers.get(n))
            .map(|h| h.to_spec())
            .collect()
    }

    /// Execute a function call and serialize its payload. Never fails.
    pub fn execute(&self, name: &str, arguments: &Value) -> String {
        let result = match self.get(name) {
            Some(handler) => handler.call(arguments),
            None => Err(FunctionError::NotFound(name.to_string())),
        };

        let payload = match result {
            Ok(value) => value,
            Err(e) => {
                warn!(function = name, error = %e, "Custom function returned an error payload");
                json!({ "error": e.to_string() })
            }
        };
        payload.to_string()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
