//! Shared test helpers for agent loop tests.

use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tradvisor_core::error::ProviderError;
use tradvisor_core::provider::{
    ContentPart, ModelResponse, ResponseItem, ResponseRequest, ResponsesProvider, Usage,
    WebSearchAction,
};

use crate::functions::UPDATE_PLAN;
use crate::stream_event::AgentEvent;

/// A mock provider that plays back scripted results and records every
/// request it receives.
///
/// Once the script runs out it repeats `fallback` if one was given and
/// otherwise fails the call.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<ModelResponse, ProviderError>>>,
    fallback: Option<ModelResponse>,
    requests: Mutex<Vec<ResponseRequest>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<ModelResponse, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn responses(responses: Vec<ModelResponse>) -> Self {
        Self::new(responses.into_iter().map(Ok).collect())
    }

    /// Return `response` on every call.
    pub fn repeating(response: ModelResponse) -> Self {
        Self {
            fallback: Some(response),
            ..Self::new(vec![])
        }
    }

    pub fn requests(&self) -> Vec<ResponseRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl ResponsesProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn create_response(
        &self,
        request: ResponseRequest,
    ) -> Result<ModelResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let next = self.script.lock().unwrap().pop_front();
        match (next, &self.fallback) {
            (Some(result), _) => result,
            (None, Some(fallback)) => Ok(fallback.clone()),
            (None, None) => Err(ProviderError::InvalidResponse("script exhausted".into())),
        }
    }
}

pub fn response(id: &str, output: Vec<ResponseItem>) -> ModelResponse {
    ModelResponse {
        id: id.into(),
        output,
        usage: Some(Usage {
            input_tokens: 10,
            output_tokens: 5,
            total_tokens: 15,
        }),
    }
}

/// A function call whose arguments arrive JSON-encoded, as on the wire.
pub fn function_call(name: &str, call_id: &str, args: Value) -> ResponseItem {
    ResponseItem::FunctionCall {
        name: name.into(),
        arguments: Value::String(args.to_string()),
        call_id: call_id.into(),
    }
}

pub fn plan_call(call_id: &str, args: Value) -> ResponseItem {
    function_call(UPDATE_PLAN, call_id, args)
}

pub fn text(text: &str) -> ResponseItem {
    ResponseItem::Message {
        content: vec![ContentPart::OutputText { text: text.into() }],
    }
}

pub fn web_search(query: &str) -> ResponseItem {
    ResponseItem::WebSearchCall {
        action: Some(WebSearchAction {
            query: Some(query.into()),
        }),
    }
}

/// Drain a run to its end.
pub async fn collect(mut rx: mpsc::Receiver<AgentEvent>) -> Vec<AgentEvent> {
    let mut events = vec![];
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}
