//! Error types for the Tradvisor domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each boundary has its own error type: the remote model and the local
//! custom functions.

use thiserror::Error;

/// Failures of the remote invocation. All of them are fatal for the
/// current task; the agent loop reports them and stops.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Failures inside a custom function handler. These never reach the
/// agent loop as errors: the registry folds them into a JSON payload.
#[derive(Debug, Clone, Error)]
pub enum FunctionError {
    #[error("Unknown function: {0}")]
    NotFound(String),

    #[error("Function {name} failed: {reason}")]
    ExecutionFailed { name: String, reason: String },
}
