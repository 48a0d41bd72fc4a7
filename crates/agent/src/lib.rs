//! The research agent loop, the heart of Tradvisor.
//!
//! Each task follows an **Invoke → Interpret → Continue** cycle:
//!
//! 1. **Send** the system preamble and the user's task to the model
//! 2. **Interpret** the response: server tool notices, custom function
//!    calls, assistant text
//! 3. **Execute** custom functions locally (`update_plan`) and queue their
//!    outputs
//! 4. **If outputs were queued**: send only those back, linked to the
//!    previous response, and loop to step 2
//! 5. **Otherwise**: the task is done
//!
//! Progress reaches the consumer as a stream of [`AgentEvent`]s ending in
//! exactly one `Done`.

pub mod functions;
pub mod interpreter;
pub mod loop_runner;
pub mod prompts;
pub mod stream_event;
pub mod toolset;

#[cfg(test)]
mod test_helpers;

pub use functions::{UPDATE_PLAN, UpdatePlanHandler, default_registry};
pub use interpreter::{Interpretation, ResponseInterpreter};
pub use loop_runner::{API_ERROR_PREFIX, AgentLoop};
pub use stream_event::AgentEvent;
