//! # Tradvisor Core
//!
//! Domain types, traits, and error definitions for the Tradvisor research agent.
//! This crate has **no HTTP or runtime dependencies**. The provider, agent loop,
//! and presentation crates implement against the model defined here.
//!
//! ## Layout
//!
//! - [`plan`]: the plan state threaded through a research task
//! - [`provider`]: the Responses-style remote invocation contract
//! - [`function`]: locally executed custom functions and their registry
//! - [`message`]: prior conversation turns used to seed a task

pub mod error;
pub mod function;
pub mod message;
pub mod plan;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{FunctionError, ProviderError};
pub use function::{FunctionHandler, FunctionRegistry};
pub use message::{HistoryMessage, Role};
pub use plan::{Plan, Step, StepStatus};
pub use provider::{
    ContentPart, FunctionCallOutput, InputItem, ModelResponse, ResponseItem, ResponseRequest,
    ResponsesProvider, ToolSpec, Usage,
};
