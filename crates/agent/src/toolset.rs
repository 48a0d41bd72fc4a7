//! The tool set advertised on every request.

use tradvisor_core::function::FunctionRegistry;
use tradvisor_core::provider::ToolSpec;

/// Server-side web search and code execution, followed by every local
/// function in `functions`.
pub fn tool_set(functions: &FunctionRegistry) -> Vec<ToolSpec> {
    let mut tools = vec![ToolSpec::WebSearch, ToolSpec::CodeInterpreter];
    tools.extend(functions.specs());
    tools
}
