//! AI21-style completion provider.
//!
//! Speaks the Studio `POST {base_url}/{model}/complete` protocol: the prompt
//! and camelCase sampling options go in a flat JSON body, and the reply's
//! `completions[0].data.text` is the generated continuation.
//!
//! No retry, backoff or custom timeout is applied; every failure goes
//! straight back to the caller.

use async_trait::async_trait;
use parley_core::completion::{
    CompletionProvider, CompletionRequest, CompletionResponse, SamplingConfig,
};
use parley_core::error::CompletionError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.ai21.com/studio/v1";

/// Completion provider for the AI21 Studio API and compatible endpoints.
pub struct Ai21Provider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl Ai21Provider {
    /// Create a provider against the public AI21 endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Create a provider against a custom endpoint (proxies, test stubs).
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            name: "ai21".into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    fn complete_url(&self, model: &str) -> String {
        format!("{}/{}/complete", self.base_url, model.trim_matches('/'))
    }

    /// Pull the first candidate out of a raw response body.
    fn parse_body(body: &str) -> Result<(String, Option<String>), CompletionError> {
        let api_response: ApiResponse = serde_json::from_str(body).map_err(|e| {
            CompletionError::MalformedResponse(format!("Failed to parse response: {e}"))
        })?;

        let first = api_response
            .completions
            .into_iter()
            .next()
            .ok_or_else(|| {
                CompletionError::MalformedResponse("No completions in response".into())
            })?;

        let text = first.data.text.trim().to_string();
        if text.is_empty() {
            return Err(CompletionError::EmptyCompletion);
        }

        Ok((text, first.finish_reason.and_then(|f| f.reason)))
    }
}

#[async_trait]
impl CompletionProvider for Ai21Provider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, CompletionError> {
        let url = self.complete_url(&request.model);
        let body = ApiRequest {
            prompt: &request.prompt,
            config: &request.config,
        };

        debug!(
            provider = %self.name,
            model = %request.model,
            max_tokens = request.config.max_tokens,
            "Sending completion request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(CompletionError::RateLimited);
        }

        if status == 401 || status == 403 {
            return Err(CompletionError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        let text = response
            .text()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        if !(200..300).contains(&status) {
            warn!(status, body = %text, "Completion service returned error");
            return Err(CompletionError::ApiError {
                status_code: status,
                message: text,
            });
        }

        let (text, finish_reason) = Self::parse_body(&text)?;
        debug!(provider = %self.name, chars = text.len(), ?finish_reason, "Completion received");

        Ok(CompletionResponse {
            text,
            model: request.model,
            finish_reason,
        })
    }
}

// --- AI21 API types (internal) ---

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    prompt: &'a str,
    #[serde(flatten)]
    config: &'a SamplingConfig,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    completions: Vec<ApiCompletion>,
}

#[derive(Debug, Deserialize)]
struct ApiCompletion {
    data: ApiCompletionData,
    #[serde(rename = "finishReason", default)]
    finish_reason: Option<ApiFinishReason>,
}

#[derive(Debug, Deserialize)]
struct ApiCompletionData {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiFinishReason {
    #[serde(default)]
    reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use parley_core::persona::Persona;
    use std::sync::{Arc, Mutex};

    /// Path, Authorization header and JSON body of each request the stub saw.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<(String, Option<String>, serde_json::Value)>>>);

    async fn spawn_stub(status: u16, reply: serde_json::Value) -> (String, Captured) {
        let captured = Captured::default();
        let app = Router::new()
            .route(
                "/{*path}",
                post(
                    move |State(seen): State<Captured>,
                          Path(path): Path<String>,
                          headers: HeaderMap,
                          Json(body): Json<serde_json::Value>| {
                        let reply = reply.clone();
                        async move {
                            let auth = headers
                                .get("authorization")
                                .and_then(|v| v.to_str().ok())
                                .map(String::from);
                            seen.0.lock().unwrap().push((path, auth, body));
                            (StatusCode::from_u16(status).unwrap(), Json(reply))
                        }
                    },
                ),
            )
            .with_state(captured.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), captured)
    }

    fn request(model: &str) -> CompletionRequest {
        CompletionRequest {
            model: model.into(),
            prompt: "Bot: Hi, I'm Bot\nUser: hello\nBot:".into(),
            config: SamplingConfig::for_persona(&Persona::generic()),
        }
    }

    fn completion_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "abc",
            "prompt": {"text": "..."},
            "completions": [
                {"data": {"text": text, "tokens": []}, "finishReason": {"reason": "endoftext"}}
            ]
        })
    }

    #[test]
    fn default_constructor_targets_ai21() {
        let provider = Ai21Provider::new("key");
        assert_eq!(provider.name(), "ai21");
        assert_eq!(
            provider.complete_url("j1-jumbo"),
            "https://api.ai21.com/studio/v1/j1-jumbo/complete"
        );
    }

    #[test]
    fn nested_model_ids_keep_their_path() {
        let provider = Ai21Provider::with_base_url("http://localhost:9/v1/", "key");
        assert_eq!(
            provider.complete_url("experimental/j1-grande-instruct"),
            "http://localhost:9/v1/experimental/j1-grande-instruct/complete"
        );
    }

    #[test]
    fn request_body_is_flat_camel_case() {
        let req = request("j1-large");
        let body = serde_json::to_value(ApiRequest {
            prompt: &req.prompt,
            config: &req.config,
        })
        .unwrap();
        assert_eq!(body["prompt"], req.prompt);
        assert_eq!(body["numResults"], 1);
        assert_eq!(body["maxTokens"], 50);
        assert_eq!(body["topKReturn"], 0);
        assert_eq!(body["stopSequences"], serde_json::json!(["Bot:", "User:", "##"]));
        assert!(body.get("config").is_none());
    }

    #[test]
    fn parse_body_trims_first_candidate() {
        let body = completion_body(" We have sneakers and boots. ").to_string();
        let (text, reason) = Ai21Provider::parse_body(&body).unwrap();
        assert_eq!(text, "We have sneakers and boots.");
        assert_eq!(reason.as_deref(), Some("endoftext"));
    }

    #[test]
    fn parse_body_rejects_missing_candidates() {
        assert!(matches!(
            Ai21Provider::parse_body(r#"{"completions": []}"#),
            Err(CompletionError::MalformedResponse(_))
        ));
        assert!(matches!(
            Ai21Provider::parse_body(r#"{"completions": [{"data": {}}]}"#),
            Err(CompletionError::MalformedResponse(_))
        ));
        assert!(matches!(
            Ai21Provider::parse_body("not json"),
            Err(CompletionError::MalformedResponse(_))
        ));
    }

    #[test]
    fn parse_body_rejects_blank_text() {
        let body = completion_body("   \n").to_string();
        assert!(matches!(
            Ai21Provider::parse_body(&body),
            Err(CompletionError::EmptyCompletion)
        ));
    }

    #[tokio::test]
    async fn complete_posts_prompt_and_config() {
        let (base_url, captured) = spawn_stub(200, completion_body(" Hello! ")).await;
        let provider = Ai21Provider::with_base_url(base_url, "test-key");

        let response = provider.complete(request("j1-large")).await.unwrap();
        assert_eq!(response.text, "Hello!");
        assert_eq!(response.model, "j1-large");

        let seen = captured.0.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (path, auth, body) = &seen[0];
        assert_eq!(path, "j1-large/complete");
        assert_eq!(auth.as_deref(), Some("Bearer test-key"));
        assert_eq!(body["temperature"].as_f64().map(|t| (t * 10.0).round()), Some(8.0));
        assert!(body["prompt"].as_str().unwrap().ends_with("\nBot:"));
    }

    #[tokio::test]
    async fn unauthorized_maps_to_authentication_failure() {
        let (base_url, _) = spawn_stub(401, serde_json::json!({"detail": "Forbidden"})).await;
        let provider = Ai21Provider::with_base_url(base_url, "bad-key");
        let err = provider.complete(request("j1-large")).await.unwrap_err();
        assert!(matches!(err, CompletionError::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn server_error_is_surfaced_with_status() {
        let (base_url, _) = spawn_stub(500, serde_json::json!({"detail": "boom"})).await;
        let provider = Ai21Provider::with_base_url(base_url, "key");
        match provider.complete(request("j1-large")).await {
            Err(CompletionError::ApiError { status_code, message }) => {
                assert_eq!(status_code, 500);
                assert!(message.contains("boom"));
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rate_limit_is_not_retried() {
        let (base_url, captured) = spawn_stub(429, serde_json::json!({})).await;
        let provider = Ai21Provider::with_base_url(base_url, "key");
        let err = provider.complete(request("j1-large")).await.unwrap_err();
        assert!(matches!(err, CompletionError::RateLimited));
        assert_eq!(captured.0.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_network_error() {
        let provider = Ai21Provider::with_base_url("http://127.0.0.1:1", "key");
        let err = provider.complete(request("j1-large")).await.unwrap_err();
        assert!(matches!(err, CompletionError::Network(_)));
    }
}
