//! Gemini Provider - Implementation of AIProvider for Google's Generative
//! Language API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GeminiConfig::new(api_key)
//!     .with_model("gemini-1.5-flash")
//!     .with_base_url("https://generativelanguage.googleapis.com/v1");
//!
//! let provider = GeminiProvider::new(config)?;
//! ```
//!
//! Each call is a single attempt. Retrying with different parameters is the
//! caller's job, so transport failures, error statuses and bodies without
//! text all surface as `AIError`s.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use super::gemini_response::{block_reason, extract_text};
use crate::ports::{AIError, AIProvider, CompletionRequest, CompletionResponse, ProviderInfo};

/// Retry hint used when a 429 carries no `Retry-After` header.
const DEFAULT_RETRY_AFTER_SECS: u32 = 30;

/// Configuration for the Gemini provider.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use (e.g., "gemini-1.5-flash").
    pub model: String,
    /// Base URL for the API, including the version segment.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Gemini API provider implementation.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    /// Creates a new Gemini provider with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Builds the generateContent endpoint URL.
    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn to_gemini_request(request: &CompletionRequest) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        }
    }

    /// Sends a request.
    async fn send_request(&self, request: &CompletionRequest) -> Result<Response, AIError> {
        self.client
            .post(self.generate_url())
            .header("x-goog-api-key", self.config.api_key())
            .header("Content-Type", "application/json")
            .json(&Self::to_gemini_request(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AIError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    AIError::network(format!("Connection failed: {}", e))
                } else {
                    AIError::network(e.to_string())
                }
            })
    }

    /// Maps error statuses to `AIError`s.
    async fn handle_response_status(response: Response) -> Result<Response, AIError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u32>().ok());

        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 | 403 => Err(AIError::AuthenticationFailed),
            429 => Err(AIError::rate_limited(
                retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
            )),
            400 | 404 => Err(AIError::InvalidRequest(error_body)),
            500..=599 => Err(AIError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(AIError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    /// Parses a response body into a completion.
    async fn parse_response(&self, response: Response) -> Result<CompletionResponse, AIError> {
        let response = Self::handle_response_status(response).await?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

        match extract_text(&body) {
            Some(extracted) => {
                tracing::debug!(
                    shape = ?extracted.shape,
                    finish_reason = ?extracted.finish_reason,
                    total_tokens = extracted.usage.total_tokens,
                    "Extracted Gemini response text"
                );
                Ok(CompletionResponse {
                    content: extracted.text,
                    usage: extracted.usage,
                    model: self.config.model.clone(),
                    finish_reason: extracted.finish_reason,
                })
            }
            None => match block_reason(&body) {
                Some(reason) => Err(AIError::content_filtered(reason)),
                None => Err(AIError::EmptyResponse),
            },
        }
    }
}

#[async_trait]
impl AIProvider for GeminiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let response = self.send_request(&request).await?;
        self.parse_response(response).await
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("gemini", &self.config.model)
    }
}

// ----- Gemini API Types -----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{TopicId, UserId};
    use crate::ports::{FinishReason, RequestMetadata};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str = "/models/gemini-1.5-flash:generateContent";

    fn request() -> CompletionRequest {
        CompletionRequest::new(
            "USER: halo",
            RequestMetadata::new(UserId::new("admin").unwrap(), TopicId::new(), 1),
        )
        .with_max_tokens(1024)
        .with_temperature(0.7)
    }

    fn provider(server: &MockServer) -> GeminiProvider {
        GeminiProvider::new(
            GeminiConfig::new("test-key")
                .with_base_url(server.uri())
                .with_timeout(Duration::from_secs(2)),
        )
        .unwrap()
    }

    mod config {
        use super::*;

        #[test]
        fn config_builder_works() {
            let config = GeminiConfig::new("test-key")
                .with_model("gemini-1.5-pro")
                .with_base_url("https://custom.api.com/v1beta")
                .with_timeout(Duration::from_secs(10));

            assert_eq!(config.model, "gemini-1.5-pro");
            assert_eq!(config.base_url, "https://custom.api.com/v1beta");
            assert_eq!(config.timeout, Duration::from_secs(10));
            assert_eq!(config.api_key(), "test-key");
        }

        #[test]
        fn url_tolerates_trailing_slash() {
            let provider =
                GeminiProvider::new(GeminiConfig::new("k").with_base_url("http://x/v1/")).unwrap();
            assert_eq!(
                provider.generate_url(),
                "http://x/v1/models/gemini-1.5-flash:generateContent"
            );
        }

        #[test]
        fn request_body_uses_generation_config() {
            let body = serde_json::to_value(GeminiProvider::to_gemini_request(&request())).unwrap();

            assert_eq!(body["contents"][0]["parts"][0]["text"], "USER: halo");
            assert_eq!(body["generationConfig"]["maxOutputTokens"], 1024);
        }

        #[test]
        fn provider_info_names_model() {
            let provider = GeminiProvider::new(GeminiConfig::new("k")).unwrap();
            let info = provider.provider_info();
            assert_eq!(info.name, "gemini");
            assert_eq!(info.model, "gemini-1.5-flash");
        }
    }

    mod http {
        use super::*;

        #[tokio::test]
        async fn successful_response_returns_text() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path(GENERATE_PATH))
                .and(header("x-goog-api-key", "test-key"))
                .and(body_partial_json(json!({
                    "contents": [{"parts": [{"text": "USER: halo"}]}],
                    "generationConfig": {"maxOutputTokens": 1024}
                })))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "candidates": [{"content": {"parts": [{"text": "Halo juga!"}]}, "finishReason": "STOP"}]
                })))
                .expect(1)
                .mount(&server)
                .await;

            let response = provider(&server).complete(request()).await.unwrap();

            assert_eq!(response.content, "Halo juga!");
            assert_eq!(response.finish_reason, FinishReason::Stop);
            assert_eq!(response.model, "gemini-1.5-flash");
        }

        #[tokio::test]
        async fn unexpected_shape_falls_back_to_scan() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path(GENERATE_PATH))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!({"data": {"answer": {"text": "scanned"}}})),
                )
                .mount(&server)
                .await;

            let response = provider(&server).complete(request()).await.unwrap();
            assert_eq!(response.content, "scanned");
        }

        #[tokio::test]
        async fn body_without_text_is_empty_response() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
                .mount(&server)
                .await;

            let err = provider(&server).complete(request()).await.unwrap_err();
            assert!(matches!(err, AIError::EmptyResponse));
        }

        #[tokio::test]
        async fn blocked_prompt_is_content_filtered() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!({"promptFeedback": {"blockReason": "SAFETY"}})),
                )
                .mount(&server)
                .await;

            let err = provider(&server).complete(request()).await.unwrap_err();
            assert!(matches!(err, AIError::ContentFiltered { .. }));
        }

        #[tokio::test]
        async fn non_json_body_is_parse_error() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
                .mount(&server)
                .await;

            let err = provider(&server).complete(request()).await.unwrap_err();
            assert!(matches!(err, AIError::Parse(_)));
        }

        #[tokio::test]
        async fn status_codes_map_to_errors() {
            for status in [401u16, 403, 400, 503, 418] {
                let server = MockServer::start().await;
                Mock::given(method("POST"))
                    .respond_with(ResponseTemplate::new(status).set_body_string("error"))
                    .mount(&server)
                    .await;

                let err = provider(&server).complete(request()).await.unwrap_err();
                let matched = match status {
                    401 | 403 => matches!(err, AIError::AuthenticationFailed),
                    400 => matches!(err, AIError::InvalidRequest(_)),
                    503 => matches!(err, AIError::Unavailable { .. }),
                    _ => matches!(err, AIError::Network(_)),
                };
                assert!(matched, "status {} gave {:?}", status, err);
            }
        }

        #[tokio::test]
        async fn rate_limit_reads_retry_after() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "12"))
                .mount(&server)
                .await;

            let err = provider(&server).complete(request()).await.unwrap_err();
            assert!(matches!(err, AIError::RateLimited { retry_after_secs: 12 }));
        }

        #[tokio::test]
        async fn slow_response_times_out() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!({"text": "late"}))
                        .set_delay(Duration::from_secs(5)),
                )
                .mount(&server)
                .await;

            let err = provider(&server).complete(request()).await.unwrap_err();
            assert!(matches!(err, AIError::Timeout { .. }));
        }
    }
}
