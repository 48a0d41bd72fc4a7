//! v1 research API.
//!
//! - `POST /v1/research/stream` runs a task and streams every
//!   [`AgentEvent`] as an SSE frame named after its type, ending with `done`.
//! - `POST /v1/research` runs a task to completion and returns the
//!   aggregated text, tool calls, and final plan.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{
        Json,
        sse::{Event as SseEvent, KeepAlive, Sse},
    },
    routing::post,
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;

use tradvisor_agent::AgentEvent;
use tradvisor_core::message::HistoryMessage;
use tradvisor_core::plan::Plan;

use crate::SharedState;

/// Build the v1 router.
pub fn v1_router(state: SharedState) -> Router {
    Router::new()
        .route("/research", post(research_handler))
        .route("/research/stream", post(research_stream_handler))
        .with_state(state)
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Deserialize)]
struct ResearchRequest {
    /// The user's task.
    message: String,
    /// Earlier turns of the conversation, oldest first.
    #[serde(default)]
    history: Vec<HistoryMessage>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ToolCallSummary {
    name: String,
    description: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ResearchResponse {
    text: String,
    tool_calls: Vec<ToolCallSummary>,
    plan: Option<Plan>,
    iterations: u32,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Validate the request and keep the most recent `limit` history turns.
fn prepare(
    payload: ResearchRequest,
    limit: usize,
) -> Result<(String, Vec<HistoryMessage>), ApiError> {
    let message = payload.message.trim().to_string();
    if message.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "message must not be empty".into(),
            }),
        ));
    }

    let mut history = payload.history;
    if history.len() > limit {
        history.drain(..history.len() - limit);
    }
    Ok((message, history))
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn research_stream_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ResearchRequest>,
) -> Result<Sse<impl futures::Stream<Item = Result<SseEvent, Infallible>>>, ApiError> {
    let (message, history) = prepare(payload, state.history_limit)?;
    info!(history = history.len(), "v1/research/stream SSE request");

    let rx = state.agent.run_stream_with_history(&message, &history);

    let stream = ReceiverStream::new(rx).map(|event| {
        let data = serde_json::to_string(&event).unwrap_or_default();
        Ok(SseEvent::default().event(event.event_type()).data(data))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

async fn research_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ResearchRequest>,
) -> Result<Json<ResearchResponse>, ApiError> {
    let (message, history) = prepare(payload, state.history_limit)?;
    info!(history = history.len(), "v1/research request");

    let mut rx = state.agent.run_stream_with_history(&message, &history);
    let mut result = ResearchResponse {
        text: String::new(),
        tool_calls: Vec::new(),
        plan: None,
        iterations: 0,
    };

    while let Some(event) = rx.recv().await {
        match event {
            AgentEvent::TextDelta { content } => result.text.push_str(&content),
            AgentEvent::ToolCall { name, description } => {
                result.tool_calls.push(ToolCallSummary { name, description })
            }
            AgentEvent::PlanUpdate { .. } => {}
            AgentEvent::Done { iterations, plan } => {
                result.iterations = iterations;
                result.plan = plan;
            }
        }
    }

    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GatewayState, build_router};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;
    use tradvisor_agent::AgentLoop;
    use tradvisor_config::AppConfig;
    use tradvisor_core::error::ProviderError;
    use tradvisor_core::provider::{
        ContentPart, InputItem, ModelResponse, ResponseItem, ResponseRequest, ResponsesProvider,
    };

    /// Plans on the first call, answers on the second, records requests.
    #[derive(Default)]
    struct PlanThenAnswer {
        requests: Mutex<Vec<ResponseRequest>>,
    }

    #[async_trait::async_trait]
    impl ResponsesProvider for PlanThenAnswer {
        fn name(&self) -> &str {
            "plan_then_answer"
        }

        async fn create_response(
            &self,
            request: ResponseRequest,
        ) -> Result<ModelResponse, ProviderError> {
            let first = request.previous_response_id.is_none();
            self.requests.lock().unwrap().push(request);
            let output = if first {
                vec![
                    ResponseItem::WebSearchCall { action: None },
                    ResponseItem::FunctionCall {
                        name: "update_plan".into(),
                        arguments: Value::String(
                            json!({
                                "task_summary": "Value AAPL",
                                "steps": [{
                                    "id": 1,
                                    "description": "Pull filings",
                                    "status": "in_progress"
                                }],
                                "is_complete": false
                            })
                            .to_string(),
                        ),
                        call_id: "call_1".into(),
                    },
                ]
            } else {
                vec![ResponseItem::Message {
                    content: vec![ContentPart::OutputText {
                        text: "Fair value is $190.".into(),
                    }],
                }]
            };
            Ok(ModelResponse {
                id: if first { "resp_1".into() } else { "resp_2".into() },
                output,
                usage: None,
            })
        }
    }

    fn app_with(provider: Arc<PlanThenAnswer>, history_limit: usize) -> Router {
        let mut config = AppConfig::default();
        config.gateway.history_limit = history_limit;
        let agent = AgentLoop::new(provider, &config);
        build_router(Arc::new(GatewayState::new(agent, &config)), &["*".to_string()])
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn research_stream_returns_sse() {
        let app = app_with(Arc::new(PlanThenAnswer::default()), 20);

        let response = app
            .oneshot(post_json("/v1/research/stream", json!({"message": "Value AAPL"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("text/event-stream"));

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8_lossy(&body);

        let order: Vec<&str> = text
            .lines()
            .filter_map(|l| l.strip_prefix("event: "))
            .collect();
        assert_eq!(
            order,
            vec!["tool_call", "tool_call", "plan_update", "text_delta", "done"]
        );
        assert!(text.contains(r#""name":"web_search""#));
        assert!(text.contains("Fair value is $190."));
        assert!(text.contains(r#""iterations":2"#));
    }

    #[tokio::test]
    async fn research_returns_aggregated_result() {
        let app = app_with(Arc::new(PlanThenAnswer::default()), 20);

        let response = app
            .oneshot(post_json("/v1/research", json!({"message": "Value AAPL"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let result: ResearchResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(result.text, "Fair value is $190.");
        assert_eq!(result.iterations, 2);
        assert_eq!(result.tool_calls.len(), 2);
        assert_eq!(result.tool_calls[0].name, "web_search");
        assert_eq!(result.tool_calls[1].name, "update_plan");
        assert_eq!(result.plan.map(|p| p.task_summary), Some("Value AAPL".to_string()));
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let provider = Arc::new(PlanThenAnswer::default());
        let app = app_with(provider.clone(), 20);

        let response = app
            .oneshot(post_json("/v1/research/stream", json!({"message": "   "})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(provider.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn history_is_capped_to_most_recent_turns() {
        let provider = Arc::new(PlanThenAnswer::default());
        let app = app_with(provider.clone(), 2);

        let response = app
            .oneshot(post_json(
                "/v1/research",
                json!({
                    "message": "And MSFT?",
                    "history": [
                        {"role": "user", "content": "old question"},
                        {"role": "assistant", "content": "old answer"},
                        {"role": "user", "content": "Value AAPL"},
                        {"role": "assistant", "content": "Fair value is $190."}
                    ]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let requests = provider.requests.lock().unwrap();
        let first = &requests[0].input;
        assert_eq!(first.len(), 4);
        assert_eq!(first[1], InputItem::user("Value AAPL"));
        assert_eq!(first[2], InputItem::assistant("Fair value is $190."));
        assert_eq!(first[3], InputItem::user("And MSFT?"));
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let app = app_with(Arc::new(PlanThenAnswer::default()), 20);

        let response = app
            .oneshot(post_json("/v1/research", json!({"prompt": "missing message"})))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }
}
