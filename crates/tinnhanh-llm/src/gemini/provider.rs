//! Gemini client implementing [`TextGenerator`].
//!
//! One `generateContent` call per completion: no streaming, no internal
//! retries, no caching. The credential is checked before any network
//! activity, and the key travels in the `x-goog-api-key` header.
//!
//! # Temperature Enforcement
//!
//! Gemini 3 models require `temperature=1.0`. Any other configured value is
//! overridden with a warning.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use tracing::{debug, error, instrument, warn};

use tinnhanh_core::errors::ClientError;
use tinnhanh_core::provider::{CompletionOptions, TextGenerator};
use tinnhanh_core::security::CredentialProvider;

use super::types::{
    default_safety_settings, GeminiContent, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, SafetySetting, SystemInstruction, SystemPart, API_KEY_HEADER,
    DEFAULT_API_KEY_BASE_URL,
};
use crate::models::{is_gemini_3_model, max_output_for};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Client configuration.
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    /// Default model; [`CompletionOptions::model`] overrides it per call.
    pub model: String,
    /// REST base URL, without trailing slash.
    pub base_url: String,
    /// Whole-request timeout.
    pub timeout: Duration,
    pub temperature: Option<f64>,
    /// Output cap. Falls back to the model registry.
    pub max_tokens: Option<u32>,
    pub safety_settings: Vec<SafetySetting>,
}

impl GeminiConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: DEFAULT_API_KEY_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            temperature: None,
            max_tokens: None,
            safety_settings: default_safety_settings(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Gemini `generateContent` client.
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
    credentials: Arc<dyn CredentialProvider>,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig, credentials: Arc<dyn CredentialProvider>) -> Self {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to build tuned HTTP client, using defaults");
                Client::new()
            });
        Self::with_client(config, client, credentials)
    }

    /// Use a caller-supplied HTTP client (its timeouts apply).
    pub fn with_client(
        config: GeminiConfig,
        client: Client,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        debug!(model = %config.model, base_url = %config.base_url, "Gemini client initialized");
        Self {
            config,
            client,
            credentials,
        }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn api_url(&self, model: &str) -> String {
        format!("{}/models/{model}:generateContent", self.config.base_url)
    }

    fn build_generation_config(&self, model: &str, options: &CompletionOptions) -> GenerationConfig {
        let temperature = if is_gemini_3_model(model) {
            if let Some(t) = self.config.temperature {
                if (t - 1.0).abs() > f64::EPSILON {
                    warn!(requested = t, "Gemini 3 requires temperature=1.0, overriding");
                }
            }
            Some(1.0)
        } else {
            self.config.temperature
        };

        let (response_mime_type, response_schema) = match &options.schema {
            Some(schema) => (
                Some("application/json".to_string()),
                Some(schema.to_gemini_schema()),
            ),
            None => (None, None),
        };

        GenerationConfig {
            max_output_tokens: Some(
                self.config
                    .max_tokens
                    .unwrap_or_else(|| max_output_for(model)),
            ),
            temperature,
            response_mime_type,
            response_schema,
        }
    }

    fn build_request(
        &self,
        model: &str,
        prompt: &str,
        options: &CompletionOptions,
    ) -> GenerateContentRequest {
        let system_instruction = options
            .system_instruction
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|text| SystemInstruction {
                parts: vec![SystemPart {
                    text: text.to_string(),
                }],
            });

        GenerateContentRequest {
            contents: vec![GeminiContent::user_text(prompt)],
            system_instruction,
            generation_config: self.build_generation_config(model, options),
            safety_settings: self.config.safety_settings.clone(),
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    #[instrument(skip_all, fields(provider = "gemini", model = tracing::field::Empty))]
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, ClientError> {
        let Some(key) = self.credentials.get() else {
            warn!("no Gemini API key configured");
            return Err(ClientError::CredentialMissing);
        };

        let model = options.model.as_deref().unwrap_or(&self.config.model);
        let _ = tracing::Span::current().record("model", model);
        let body = self.build_request(model, prompt, options);

        debug!(
            prompt_chars = prompt.chars().count(),
            structured = options.schema.is_some(),
            "sending generateContent"
        );

        let response = self
            .client
            .post(self.api_url(model))
            .header(API_KEY_HEADER, key.0.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                error!(error = %e, "Gemini request failed");
                ClientError::transport(e.to_string())
            })?;

        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(|e| ClientError::transport(e.without_url().to_string()))?;

        if !status.is_success() {
            let (message, code) = parse_api_error(&body_text, status.as_u16());
            error!(
                status = status.as_u16(),
                code = code.as_deref().unwrap_or("unknown"),
                "Gemini API error"
            );
            return Err(ClientError::from_status(status.as_u16(), message));
        }

        // An unreadable envelope is a provider fault, not bad model output.
        let parsed: GenerateContentResponse = serde_json::from_str(&body_text).map_err(|e| {
            ClientError::from_status(status.as_u16(), format!("invalid response body: {e}"))
        })?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                input_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                finish_reason = parsed.finish_reason().unwrap_or("unknown"),
                "generateContent finished"
            );
        }

        let text = parsed.text();
        if text.trim().is_empty() {
            warn!(
                block_reason = parsed.block_reason().unwrap_or("none"),
                finish_reason = parsed.finish_reason().unwrap_or("none"),
                "Gemini returned no text"
            );
            return Err(ClientError::EmptyResponse);
        }

        match &options.schema {
            Some(schema) => {
                let json_text = strip_json_fence(&text);
                let value: serde_json::Value = serde_json::from_str(json_text)
                    .map_err(|e| ClientError::MalformedResponse(format!("not JSON: {e}")))?;
                schema
                    .validate(&value)
                    .map_err(ClientError::MalformedResponse)?;
                Ok(json_text.to_string())
            }
            None => Ok(text),
        }
    }
}

/// Parse an API error response body into `(message, status code name)`.
fn parse_api_error(body: &str, status: u16) -> (String, Option<String>) {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        let error = &json["error"];
        let message = error["message"]
            .as_str()
            .unwrap_or("Unknown error")
            .to_string();
        let code = error["status"].as_str().map(String::from);
        (message, code)
    } else {
        (format!("HTTP {status}: {body}"), None)
    }
}

/// Drop a surrounding Markdown code fence, if any.
fn strip_json_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_start_matches("json").trim_start_matches("JSON");
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;
    use tinnhanh_core::schema::ResponseSchema;
    use tinnhanh_core::security::{NoCredentials, StaticCredentials};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer, model: &str) -> GeminiClient {
        GeminiClient::new(
            GeminiConfig::new(model).with_base_url(server.uri()),
            Arc::new(StaticCredentials::new("test-key")),
        )
    }

    fn text_response(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5, "totalTokenCount": 15}
        })
    }

    // ── request building ─────────────────────────────────────────────

    #[test]
    fn gen_config_gemini3_forces_temperature_1() {
        let client = GeminiClient::new(
            GeminiConfig::new("gemini-3-pro-preview").with_temperature(Some(0.2)),
            Arc::new(NoCredentials),
        );
        let config = client.build_generation_config("gemini-3-pro-preview", &CompletionOptions::default());
        assert_eq!(config.temperature, Some(1.0));
    }

    #[test]
    fn gen_config_gemini25_preserves_temperature() {
        let client = GeminiClient::new(
            GeminiConfig::new("gemini-2.5-flash").with_temperature(Some(0.3)),
            Arc::new(NoCredentials),
        );
        let config = client.build_generation_config("gemini-2.5-flash", &CompletionOptions::default());
        assert_eq!(config.temperature, Some(0.3));
        assert!(config.response_mime_type.is_none());
    }

    #[test]
    fn gen_config_schema_requests_json() {
        let client = GeminiClient::new(GeminiConfig::new("gemini-2.5-flash"), Arc::new(NoCredentials));
        let options = CompletionOptions::default().with_schema(ResponseSchema::article());
        let config = client.build_generation_config("gemini-2.5-flash", &options);
        assert_eq!(config.response_mime_type.as_deref(), Some("application/json"));
        assert_eq!(config.response_schema.unwrap()["type"], "OBJECT");
    }

    #[test]
    fn gen_config_max_tokens() {
        let client = GeminiClient::new(
            GeminiConfig::new("unknown-model").with_max_tokens(512),
            Arc::new(NoCredentials),
        );
        let config = client.build_generation_config("unknown-model", &CompletionOptions::default());
        assert_eq!(config.max_output_tokens, Some(512));
    }

    #[test]
    fn blank_system_instruction_is_omitted() {
        let client = GeminiClient::new(GeminiConfig::new("gemini-2.5-flash"), Arc::new(NoCredentials));
        let options = CompletionOptions::default().with_system_instruction("   ");
        let request = client.build_request("gemini-2.5-flash", "hi", &options);
        assert!(request.system_instruction.is_none());
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let client = GeminiClient::new(
            GeminiConfig::new("m").with_base_url("http://localhost:1234/v1beta/"),
            Arc::new(NoCredentials),
        );
        assert_eq!(
            client.api_url("m"),
            "http://localhost:1234/v1beta/models/m:generateContent"
        );
    }

    // ── parse_api_error / fences ─────────────────────────────────────

    #[test]
    fn parse_api_error_json() {
        let body = r#"{"error":{"status":"PERMISSION_DENIED","message":"API key not valid"}}"#;
        let (msg, code) = parse_api_error(body, 403);
        assert_eq!(msg, "API key not valid");
        assert_eq!(code.as_deref(), Some("PERMISSION_DENIED"));
    }

    #[test]
    fn parse_api_error_non_json() {
        let (msg, code) = parse_api_error("Bad Gateway", 502);
        assert!(msg.contains("502"));
        assert!(code.is_none());
    }

    #[test]
    fn strips_code_fences() {
        assert_eq!(strip_json_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_json_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    // ── HTTP round trips ─────────────────────────────────────────────

    #[tokio::test]
    async fn complete_sends_key_header_and_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header(API_KEY_HEADER, "test-key"))
            .and(body_partial_json(json!({
                "contents": [{"role": "user", "parts": [{"text": "Cax"}]}],
                "systemInstruction": {"parts": [{"text": "sửa lỗi"}]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("Công an xã")))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, "gemini-2.5-flash");
        let options = CompletionOptions::default().with_system_instruction("sửa lỗi");
        let text = client.complete("Cax", &options).await.unwrap();
        assert_eq!(text, "Công an xã");
    }

    #[tokio::test]
    async fn per_call_model_override_changes_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-3-pro-preview:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("ok")))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, "gemini-2.5-flash");
        let options = CompletionOptions::default().with_model(Some("gemini-3-pro-preview"));
        assert_eq!(client.complete("x", &options).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn missing_credential_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("never")))
            .expect(0)
            .mount(&server)
            .await;

        let client = GeminiClient::new(
            GeminiConfig::new("gemini-2.5-flash").with_base_url(server.uri()),
            Arc::new(NoCredentials),
        );
        let err = client
            .complete("x", &CompletionOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, ClientError::CredentialMissing);
    }

    #[tokio::test]
    async fn non_2xx_maps_to_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({
                "error": {"code": 503, "status": "UNAVAILABLE", "message": "overloaded"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, "gemini-2.5-flash");
        let err = client
            .complete("x", &CompletionOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, ClientError::from_status(503, "overloaded"));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn error_message_does_not_contain_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
            .mount(&server)
            .await;

        let client = client_for(&server, "gemini-2.5-flash");
        let err = client
            .complete("x", &CompletionOptions::default())
            .await
            .unwrap_err();
        assert!(!err.to_string().contains("test-key"));
    }

    #[tokio::test]
    async fn timeout_maps_to_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(text_response("late"))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::new(
            GeminiConfig::new("gemini-2.5-flash")
                .with_base_url(server.uri())
                .with_timeout(Duration::from_millis(200)),
            Arc::new(StaticCredentials::new("test-key")),
        );
        let err = client
            .complete("x", &CompletionOptions::default())
            .await
            .unwrap_err();
        assert_matches!(err, ClientError::Upstream { status: None, .. });
    }

    #[tokio::test]
    async fn unreadable_success_body_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, "gemini-2.5-flash");
        let err = client
            .complete("x", &CompletionOptions::default())
            .await
            .unwrap_err();
        assert_matches!(
            err,
            ClientError::Upstream { status: Some(200), message } if message.starts_with("invalid response body")
        );
    }

    #[tokio::test]
    async fn no_candidates_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, "gemini-2.5-flash");
        let err = client
            .complete("x", &CompletionOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, ClientError::EmptyResponse);
    }

    #[tokio::test]
    async fn structured_output_is_validated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "generationConfig": {"responseMimeType": "application/json"}
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(text_response(r#"{"title":"T","content":"C"}"#)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, "gemini-2.5-flash");
        let options = CompletionOptions::default().with_schema(ResponseSchema::article());
        let err = client.complete("x", &options).await.unwrap_err();
        assert_matches!(err, ClientError::MalformedResponse(msg) if msg.contains("tags"));

        let ok = client
            .complete("x", &CompletionOptions::default().with_schema(ResponseSchema::revision()))
            .await
            .unwrap();
        assert_eq!(ok, r#"{"title":"T","content":"C"}"#);
    }

    #[tokio::test]
    async fn non_json_structured_output_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("không phải JSON")))
            .mount(&server)
            .await;

        let client = client_for(&server, "gemini-2.5-flash");
        let options = CompletionOptions::default().with_schema(ResponseSchema::article());
        let err = client.complete("x", &options).await.unwrap_err();
        assert_matches!(err, ClientError::MalformedResponse(_));
    }
}
