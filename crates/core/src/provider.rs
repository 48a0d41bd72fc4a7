//! Provider trait: the abstraction over a Responses-style model endpoint.
//!
//! One call sends the model identifier, the tool set, and an input payload,
//! and returns a response id plus an ordered list of heterogeneous output
//! items. From the second call of a task on, the previous response id is
//! sent instead of the full history so the service rebuilds context itself.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::ProviderError;
use crate::message::Role;

/// One request to the remote model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRequest {
    /// The model to use (e.g., "grok-3-mini")
    pub model: String,

    /// The full tool set advertised on every call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSpec>,

    /// Input items for this turn
    pub input: Vec<InputItem>,

    /// Conversation linkage token from the previous response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
}

/// A tool descriptor. Web search and code execution run on the server;
/// functions run locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolSpec {
    WebSearch,
    CodeInterpreter,
    Function {
        name: String,
        description: String,
        parameters: Value,
    },
}

impl ToolSpec {
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self::Function {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// One element of a request's `input`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputItem {
    Message { role: Role, content: String },
    FunctionCallOutput { call_id: String, output: String },
}

impl InputItem {
    pub fn system(content: impl Into<String>) -> Self {
        Self::Message {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::Message {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Message {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The result of a locally executed function, correlated to its call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCallOutput {
    pub call_id: String,
    pub output: String,
}

impl From<FunctionCallOutput> for InputItem {
    fn from(out: FunctionCallOutput) -> Self {
        Self::FunctionCallOutput {
            call_id: out.call_id,
            output: out.output,
        }
    }
}

/// A complete response from the remote model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    /// Becomes the next call's `previous_response_id`
    pub id: String,

    /// Output items, in the order the model produced them. An item that
    /// fails to decode becomes [`ResponseItem::Unknown`] instead of failing
    /// the whole response.
    #[serde(default, deserialize_with = "lenient_items")]
    pub output: Vec<ResponseItem>,

    /// Token usage statistics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Token usage information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// The action attached to a web search notice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebSearchAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

/// One output item. Unrecognized `type` tags deserialize to `Unknown`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseItem {
    /// The server ran a web search.
    WebSearchCall {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        action: Option<WebSearchAction>,
    },

    /// The server ran code in its sandbox.
    CodeInterpreterCall {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<String>,
    },

    /// The model wants a local function executed. `arguments` is usually a
    /// JSON-encoded string but may arrive already structured.
    FunctionCall {
        #[serde(default)]
        name: String,
        #[serde(default)]
        arguments: Value,
        #[serde(default)]
        call_id: String,
    },

    /// Assistant output.
    Message {
        #[serde(default, deserialize_with = "lenient_parts")]
        content: Vec<ContentPart>,
    },

    #[serde(other)]
    Unknown,
}

/// A content block inside an assistant message. Blocks that are not
/// well-formed `output_text` decode as `Other`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    OutputText { text: String },
    #[serde(other)]
    Other,
}

fn lenient_items<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<ResponseItem>, D::Error> {
    lenient_list(d, || ResponseItem::Unknown)
}

fn lenient_parts<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<ContentPart>, D::Error> {
    lenient_list(d, || ContentPart::Other)
}

/// Decode a JSON array element by element, substituting `fallback` for
/// elements that do not match `T`. A `null` list is empty.
fn lenient_list<'de, D, T>(d: D, fallback: fn() -> T) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Vec<Value>>::deserialize(d)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .map(|value| {
            serde_json::from_value(value).unwrap_or_else(|e| {
                debug!(error = %e, "Skipping malformed output element");
                fallback()
            })
        })
        .collect())
}

/// The core provider trait.
///
/// The agent loop calls `create_response()` once per iteration without
/// knowing which backend answers it.
#[async_trait]
pub trait ResponsesProvider: Send + Sync {
    /// A human-readable name for this provider (e.g., "xai").
    fn name(&self) -> &str;

    /// Send one request and wait for the complete response.
    async fn create_response(
        &self,
        request: ResponseRequest,
    ) -> Result<ModelResponse, ProviderError>;
}
