//! Model endpoint clients for Tradvisor.
//!
//! All providers implement the `tradvisor_core::ResponsesProvider` trait.

pub mod responses_api;

pub use responses_api::ResponsesApiProvider;
