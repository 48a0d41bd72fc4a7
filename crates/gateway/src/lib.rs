//! HTTP API gateway for Tradvisor.
//!
//! Exposes a health check and the v1 research API, which runs one agent
//! task per request and either streams its events over SSE or returns the
//! aggregated result. Conversation history is supplied by the client; the
//! gateway keeps no sessions.
//!
//! Built on Axum.

pub mod api_v1;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::{Router, response::Json, routing::get};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use tradvisor_agent::AgentLoop;
use tradvisor_config::AppConfig;
use tradvisor_providers::ResponsesApiProvider;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub agent: AgentLoop,
    /// Most recent history messages forwarded to the agent
    pub history_limit: usize,
}

pub type SharedState = Arc<GatewayState>;

impl GatewayState {
    pub fn new(agent: AgentLoop, config: &AppConfig) -> Self {
        Self {
            agent,
            history_limit: config.gateway.history_limit,
        }
    }
}

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", api_v1::v1_router(state))
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors_layer(allowed_origins))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// CORS from configured origins. `"*"` allows any origin; entries that are
/// not valid header values are skipped.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origin = if allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let provider = ResponsesApiProvider::from_config(&config)?;
    let agent = AgentLoop::new(Arc::new(provider), &config);
    let state = Arc::new(GatewayState::new(agent, &config));
    let app = build_router(state, &config.gateway.allowed_origins);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, model = %config.model, "Gateway listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use tradvisor_core::error::ProviderError;
    use tradvisor_core::provider::{ModelResponse, ResponseRequest, ResponsesProvider};

    struct IdleProvider;

    #[async_trait::async_trait]
    impl ResponsesProvider for IdleProvider {
        fn name(&self) -> &str {
            "idle"
        }
        async fn create_response(
            &self,
            _r: ResponseRequest,
        ) -> Result<ModelResponse, ProviderError> {
            Ok(ModelResponse {
                id: "r".into(),
                output: vec![],
                usage: None,
            })
        }
    }

    fn test_state() -> SharedState {
        let config = AppConfig::default();
        let agent = AgentLoop::new(Arc::new(IdleProvider), &config);
        Arc::new(GatewayState::new(agent, &config))
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(test_state(), &["*".to_string()]);

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn cors_allows_configured_origin() {
        let app = build_router(test_state(), &["http://localhost:3000".to_string()]);

        let req = Request::builder()
            .uri("/health")
            .header("origin", "http://localhost:3000")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("http://localhost:3000")
        );
    }

    #[tokio::test]
    async fn cors_rejects_unlisted_origin() {
        let app = build_router(test_state(), &["http://localhost:3000".to_string()]);

        let req = Request::builder()
            .uri("/health")
            .header("origin", "http://evil.example")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert!(response.headers().get("access-control-allow-origin").is_none());
    }
}
