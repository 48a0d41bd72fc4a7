//! Responses-API provider implementation.
//!
//! Works with xAI (the default) and any endpoint exposing an
//! OpenAI-compatible `POST /responses` with `previous_response_id` linkage
//! and server-side `web_search` / `code_interpreter` tools.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};
use tradvisor_config::AppConfig;
use tradvisor_core::error::ProviderError;
use tradvisor_core::provider::{ModelResponse, ResponseRequest, ResponsesProvider};

/// Marker in an error body telling us the stored conversation can no longer
/// be replayed by the endpoint.
const MEDIA_TYPE_MARKER: &str = "media_type";

/// Fallback when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// A Responses-API model provider.
pub struct ResponsesApiProvider {
    name: String,
    base_url: String,
    api_key: String,
    reset_context_on_media_error: bool,
    client: reqwest::Client,
}

impl ResponsesApiProvider {
    /// Create a new provider.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ProviderError::NotConfigured(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            reset_context_on_media_error: true,
            client,
        })
    }

    /// Create a provider from application configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .require_api_key()
            .map_err(|e| ProviderError::NotConfigured(e.to_string()))?;

        let provider = Self::new(
            provider_name(&config.base_url),
            config.base_url.as_str(),
            api_key,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        Ok(provider.with_context_reset(config.reset_context_on_media_error))
    }

    /// Enable or disable the single resend without linkage on media errors.
    pub fn with_context_reset(mut self, enabled: bool) -> Self {
        self.reset_context_on_media_error = enabled;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: &ResponseRequest) -> Result<ModelResponse, ProviderError> {
        let url = format!("{}/responses", self.base_url);

        debug!(
            provider = %self.name,
            model = %request.model,
            input_items = request.input.len(),
            linked = request.previous_response_id.is_some(),
            "Sending response request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(e.to_string())
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(ProviderError::RateLimited { retry_after_secs });
        }

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if !(200..300).contains(&status) {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        serde_json::from_str::<ModelResponse>(&body)
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {e}")))
    }
}

/// Derive a short provider name from the endpoint host.
fn provider_name(base_url: &str) -> String {
    let host = base_url
        .split("://")
        .nth(1)
        .unwrap_or(base_url)
        .split(['/', ':'])
        .next()
        .unwrap_or_default();

    match host {
        h if h.ends_with("x.ai") => "xai".into(),
        h if h.ends_with("openai.com") => "openai".into(),
        "" => "responses".into(),
        h => h.to_string(),
    }
}

fn is_media_type_error(err: &ProviderError) -> bool {
    matches!(err, ProviderError::ApiError { message, .. } if message.contains(MEDIA_TYPE_MARKER))
}

#[async_trait]
impl ResponsesProvider for ResponsesApiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create_response(
        &self,
        request: ResponseRequest,
    ) -> std::result::Result<ModelResponse, ProviderError> {
        match self.send(&request).await {
            Err(err)
                if self.reset_context_on_media_error
                    && request.previous_response_id.is_some()
                    && is_media_type_error(&err) =>
            {
                warn!(
                    provider = %self.name,
                    "Stored context rejected with a media type error, resending without linkage"
                );
                let fresh = ResponseRequest {
                    previous_response_id: None,
                    ..request
                };
                self.send(&fresh).await
            }
            other => other,
        }
    }
}
