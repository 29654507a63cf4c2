//! GeminiProvider -- concrete [`LlmProvider`] for the Gemini REST API.
//!
//! Sends `POST {base_url}/models/{model}:generateContent` with the key in the
//! `x-goog-api-key` header. The key is a [`SecretString`] and only exposed
//! while building that header.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::Instrument;

use messenger_core::llm::provider::LlmProvider;
use messenger_observe::genai_attrs::{
    GEN_AI_RESPONSE_FINISH_REASONS, GEN_AI_RESPONSE_ID, GEN_AI_USAGE_INPUT_TOKENS,
    GEN_AI_USAGE_OUTPUT_TOKENS, OP_CHAT, PROVIDER_GEMINI,
};
use messenger_types::config::DEFAULT_BASE_URL;
use messenger_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, MessageRole, StopReason, Usage,
};

use super::types::{
    GeminiContent, GeminiErrorEnvelope, GeminiGenerationConfig, GeminiPart, GeminiRequest,
    GeminiResponse, GeminiSystemInstruction,
};

/// Google Gemini chat provider.
///
/// Deliberately not `Debug`: the struct holds the API key.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    /// Create a provider for `model` with a per-request `timeout`.
    pub fn new(api_key: SecretString, model: String, timeout: Duration) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model,
        })
    }

    /// Override the base URL (proxies, tests).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn url(&self, model: &str) -> String {
        format!("{}/models/{model}:generateContent", self.base_url)
    }

    /// Convert a generic [`CompletionRequest`] into a [`GeminiRequest`].
    fn to_gemini_request(request: &CompletionRequest) -> GeminiRequest {
        let contents = request
            .messages
            .iter()
            .map(|m| GeminiContent {
                role: Some(
                    match m.role {
                        MessageRole::User => "user",
                        MessageRole::Assistant => "model",
                    }
                    .to_string(),
                ),
                parts: vec![GeminiPart::text(m.content.clone())],
            })
            .collect();

        let system_instruction = request
            .system
            .as_ref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| GeminiSystemInstruction {
                parts: vec![GeminiPart::text(s.clone())],
            });

        let generation_config = (request.temperature.is_some() || request.max_tokens.is_some())
            .then(|| GeminiGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            });

        GeminiRequest {
            contents,
            system_instruction,
            generation_config,
        }
    }

    fn map_finish_reason(reason: Option<&str>) -> StopReason {
        match reason {
            None | Some("STOP") | Some("FINISH_REASON_UNSPECIFIED") => StopReason::EndTurn,
            Some("MAX_TOKENS") => StopReason::MaxTokens,
            Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") | Some("PROHIBITED_CONTENT")
            | Some("SPII") => StopReason::Safety,
            Some(_) => StopReason::Other,
        }
    }

    fn map_send_error(e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(e.to_string())
        }
    }

    fn map_status(status: reqwest::StatusCode, retry_after: Option<u64>, body: &str) -> LlmError {
        let message = serde_json::from_str::<GeminiErrorEnvelope>(body)
            .map(|env| env.error.message)
            .unwrap_or_else(|_| body.to_string());

        match status.as_u16() {
            401 | 403 => LlmError::AuthenticationFailed,
            429 => LlmError::RateLimited {
                retry_after_ms: retry_after.map(|secs| secs * 1000),
            },
            400 | 404 => LlmError::InvalidRequest(message),
            503 => LlmError::Overloaded(message),
            _ => LlmError::Provider {
                message: format!("HTTP {status}: {message}"),
            },
        }
    }

    fn into_completion(resp: GeminiResponse, model: &str) -> Result<CompletionResponse, LlmError> {
        let Some(candidate) = resp.candidates.into_iter().next() else {
            return Err(match resp.prompt_feedback.and_then(|f| f.block_reason) {
                Some(reason) => LlmError::Blocked(reason),
                None => LlmError::EmptyResponse,
            });
        };

        let stop_reason = Self::map_finish_reason(candidate.finish_reason.as_deref());
        let content = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if content.is_empty() {
            return Err(match stop_reason {
                StopReason::Safety => {
                    LlmError::Blocked(candidate.finish_reason.unwrap_or_default())
                }
                _ => LlmError::EmptyResponse,
            });
        }

        let usage = resp.usage_metadata.unwrap_or_default();
        Ok(CompletionResponse {
            id: resp.response_id.unwrap_or_default(),
            content,
            model: resp.model_version.unwrap_or_else(|| model.to_string()),
            stop_reason,
            usage: Usage {
                input_tokens: usage.prompt_token_count,
                output_tokens: usage.candidates_token_count,
            },
        })
    }

    async fn send(&self, model: &str, body: &GeminiRequest) -> Result<CompletionResponse, LlmError> {
        let response = self
            .client
            .post(self.url(model))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let error_body = response.text().await.unwrap_or_default();
            return Err(Self::map_status(status, retry_after, &error_body));
        }

        let gemini_resp: GeminiResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout
            } else {
                LlmError::Deserialization(format!("failed to parse response: {e}"))
            }
        })?;

        Self::into_completion(gemini_resp, model)
    }
}

impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        PROVIDER_GEMINI
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let model = if request.model.is_empty() {
            self.model.as_str()
        } else {
            request.model.as_str()
        };
        let body = Self::to_gemini_request(request);

        let span = tracing::info_span!(
            "chat",
            otel.name = %format!("{OP_CHAT} {model}"),
            gen_ai.operation.name = OP_CHAT,
            gen_ai.provider.name = PROVIDER_GEMINI,
            gen_ai.request.model = %model,
            gen_ai.request.temperature = request.temperature,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.usage.input_tokens = tracing::field::Empty,
            gen_ai.usage.output_tokens = tracing::field::Empty,
            gen_ai.response.finish_reasons = tracing::field::Empty,
            gen_ai.response.id = tracing::field::Empty,
        );

        let result = self.send(model, &body).instrument(span.clone()).await;
        match &result {
            Ok(resp) => {
                span.record(GEN_AI_USAGE_INPUT_TOKENS, resp.usage.input_tokens);
                span.record(GEN_AI_USAGE_OUTPUT_TOKENS, resp.usage.output_tokens);
                span.record(
                    GEN_AI_RESPONSE_FINISH_REASONS,
                    tracing::field::display(resp.stop_reason),
                );
                span.record(GEN_AI_RESPONSE_ID, resp.id.as_str());
            }
            Err(err) => {
                span.in_scope(|| tracing::debug!(error = %err, "gemini request failed"));
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use messenger_types::llm::Message;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL: &str = "gemini-2.5-flash";
    const ENDPOINT: &str = "/models/gemini-2.5-flash:generateContent";

    fn provider_for(server: &MockServer) -> GeminiProvider {
        GeminiProvider::new(
            SecretString::from("test-key-not-real"),
            MODEL.to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
        .with_base_url(server.uri())
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: MODEL.to_string(),
            messages: vec![
                Message::user("hi"),
                Message::assistant("hello"),
                Message::user("how are you?"),
            ],
            system: Some("You are a pirate.".to_string()),
            max_tokens: None,
            temperature: Some(0.7),
        }
    }

    fn ok_body(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 4, "totalTokenCount": 16 },
            "modelVersion": "gemini-2.5-flash",
            "responseId": "resp-1"
        })
    }

    #[test]
    fn test_to_gemini_request_maps_roles_and_persona() {
        let body = GeminiProvider::to_gemini_request(&request());
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["contents"][2]["parts"][0]["text"], "how are you?");
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "You are a pirate.");
        assert_eq!(json["generationConfig"]["temperature"], 0.7);
    }

    #[test]
    fn test_generation_config_omitted_when_unset() {
        let mut req = request();
        req.temperature = None;
        let json = serde_json::to_value(GeminiProvider::to_gemini_request(&req)).unwrap();
        assert!(json.get("generationConfig").is_none());
    }

    #[tokio::test]
    async fn test_complete_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .and(header("x-goog-api-key", "test-key-not-real"))
            .and(body_partial_json(json!({
                "systemInstruction": { "parts": [{ "text": "You are a pirate." }] }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("Arr, fine!")))
            .expect(1)
            .mount(&server)
            .await;

        let resp = provider_for(&server).complete(&request()).await.unwrap();
        assert_eq!(resp.content, "Arr, fine!");
        assert_eq!(resp.id, "resp-1");
        assert_eq!(resp.stop_reason, StopReason::EndTurn);
        assert_eq!(resp.usage.input_tokens, 12);
        assert_eq!(resp.usage.output_tokens, 4);
    }

    #[tokio::test]
    async fn test_multi_part_text_is_joined() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": "Hello, " }, { "text": "world" }] },
                    "finishReason": "MAX_TOKENS"
                }]
            })))
            .mount(&server)
            .await;

        let resp = provider_for(&server).complete(&request()).await.unwrap();
        assert_eq!(resp.content, "Hello, world");
        assert_eq!(resp.stop_reason, StopReason::MaxTokens);
        assert_eq!(resp.model, MODEL);
        assert_eq!(resp.usage, Usage::default());
    }

    #[tokio::test]
    async fn test_status_errors_are_mapped() {
        let cases = [
            (401, "auth"),
            (403, "auth"),
            (429, "rate"),
            (400, "invalid"),
            (503, "overloaded"),
            (500, "provider"),
        ];
        for (status, expected) in cases {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path(ENDPOINT))
                .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                    "error": { "code": status, "message": "nope", "status": "X" }
                })))
                .mount(&server)
                .await;

            let err = provider_for(&server).complete(&request()).await.unwrap_err();
            let matched = match expected {
                "auth" => matches!(err, LlmError::AuthenticationFailed),
                "rate" => matches!(err, LlmError::RateLimited { .. }),
                "invalid" => matches!(&err, LlmError::InvalidRequest(m) if m == "nope"),
                "overloaded" => matches!(err, LlmError::Overloaded(_)),
                _ => matches!(err, LlmError::Provider { .. }),
            };
            assert!(matched, "status {status} mapped to {err:?}");
        }
    }

    #[tokio::test]
    async fn test_retry_after_header_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;

        let err = provider_for(&server).complete(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            LlmError::RateLimited {
                retry_after_ms: Some(7000)
            }
        ));
    }

    #[tokio::test]
    async fn test_blocked_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "promptFeedback": { "blockReason": "SAFETY" } })),
            )
            .mount(&server)
            .await;

        let err = provider_for(&server).complete(&request()).await.unwrap_err();
        assert!(matches!(&err, LlmError::Blocked(r) if r == "SAFETY"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_deserialization_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = provider_for(&server).complete(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Deserialization(_)));
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(ok_body("late"))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(
            SecretString::from("test-key-not-real"),
            MODEL.to_string(),
            Duration::from_millis(50),
        )
        .unwrap()
        .with_base_url(server.uri());

        let err = provider.complete(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Timeout), "got {err:?}");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let provider = GeminiProvider::new(
            SecretString::from("k"),
            MODEL.to_string(),
            Duration::from_secs(2),
        )
        .unwrap()
        .with_base_url("http://127.0.0.1:1".to_string());

        let err = provider.complete(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Network(_)), "got {err:?}");
    }
}
