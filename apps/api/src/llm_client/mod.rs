//! LLM Client: the single point of entry for all AI gateway calls in SkillSync.
//!
//! The gateway speaks the OpenAI chat-completions dialect. Every call sends a
//! system/user message pair and asks for a JSON object back.
//!
//! No retries: a 429 or 402 is surfaced to the caller as-is and the user re-triggers.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

pub mod prompts;

pub const DEFAULT_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
/// The model used for all gateway calls. Hardcoded to prevent drift between deployments.
pub const MODEL: &str = "google/gemini-2.5-flash";
const TEMPERATURE: f64 = 0.7;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("AI service credits exhausted")]
    QuotaExhausted,

    #[error("AI gateway error: {status} {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Builds a single-choice response. Mostly useful for stub gateways.
    pub fn from_content(content: impl Into<String>) -> Self {
        Self {
            choices: vec![Choice {
                message: ChoiceMessage {
                    content: Some(content.into()),
                },
            }],
            usage: None,
        }
    }

    /// Extracts the message content of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

/// Seam between the analysis service and the network.
///
/// Carried in `AppState` as `Arc<dyn ChatGateway>` so tests can swap in a stub.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<ChatResponse, LlmError>;

    /// Calls the gateway and parses the message content as JSON.
    /// Only syntax is checked; the shape of the value is the caller's business.
    async fn complete_json(&self, system: &str, prompt: &str) -> Result<Value, LlmError> {
        let response = self.complete(system, prompt).await?;

        let text = response.text().ok_or(LlmError::EmptyContent)?;

        // Strip markdown code fences if the model wraps JSON in them
        let text = strip_json_fences(text);

        serde_json::from_str(text).map_err(|e| {
            error!("Failed to parse AI response as JSON: {text}");
            LlmError::Parse(e)
        })
    }
}

/// HTTP implementation of [`ChatGateway`] with bearer-token auth.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    url: String,
}

impl LlmClient {
    pub fn new(api_key: String, url: String) -> Self {
        Self {
            // No explicit timeout: the transport default applies.
            client: Client::new(),
            api_key,
            url,
        }
    }
}

#[async_trait]
impl ChatGateway for LlmClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<ChatResponse, LlmError> {
        let request_body = ChatRequest {
            model: MODEL,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("AI gateway error: {} {}", status, body);
            return Err(classify_failure(status.as_u16(), body));
        }

        let chat_response: ChatResponse = response.json().await?;

        if let Some(usage) = &chat_response.usage {
            debug!(
                "Gateway call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(chat_response)
    }
}

/// Maps a non-success gateway status to the error the caller acts on.
fn classify_failure(status: u16, body: String) -> LlmError {
    match status {
        429 => LlmError::RateLimited,
        402 => LlmError::QuotaExhausted,
        _ => LlmError::Api {
            status,
            message: body,
        },
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(stripped) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };
    let stripped = stripped.trim_start();
    stripped
        .strip_suffix("```")
        .map(|s| s.trim())
        .unwrap_or(stripped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct StubGateway {
        status: StatusCode,
        body: String,
        seen: Arc<Mutex<Option<(HeaderMap, Value)>>>,
    }

    async fn stub_handler(
        State(stub): State<StubGateway>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, String) {
        *stub.seen.lock().unwrap() = Some((headers, body));
        (stub.status, stub.body.clone())
    }

    /// Serves a canned chat-completions response on an ephemeral port.
    async fn spawn_stub(status: StatusCode, body: &str) -> (LlmClient, StubGateway) {
        let stub = StubGateway {
            status,
            body: body.to_string(),
            seen: Arc::new(Mutex::new(None)),
        };
        let app = Router::new()
            .route("/v1/chat/completions", post(stub_handler))
            .with_state(stub.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let client = LlmClient::new(
            "test-key".to_string(),
            format!("http://{addr}/v1/chat/completions"),
        );
        (client, stub)
    }

    fn completion_body(content: &str) -> String {
        serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }],
            "usage": { "prompt_tokens": 120, "completion_tokens": 80 }
        })
        .to_string()
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_classify_failure_maps_known_statuses() {
        assert!(matches!(classify_failure(429, String::new()), LlmError::RateLimited));
        assert!(matches!(classify_failure(402, String::new()), LlmError::QuotaExhausted));
        match classify_failure(503, "upstream down".to_string()) {
            LlmError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_request_shape_sent_to_gateway() {
        let (client, stub) = spawn_stub(StatusCode::OK, &completion_body("{}")).await;

        client.complete("system text", "user text").await.unwrap();

        let (headers, body) = stub.seen.lock().unwrap().take().unwrap();
        assert_eq!(headers["authorization"], "Bearer test-key");
        assert_eq!(body["model"], MODEL);
        assert_eq!(body["temperature"], 0.7);
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "system text");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "user text");
    }

    #[tokio::test]
    async fn test_complete_json_parses_message_content() {
        let content = r#"{"skills":[],"careerMatch":{"career":"UX Designer","matchedSkills":[],"percentageFit":10}}"#;
        let (client, _) = spawn_stub(StatusCode::OK, &completion_body(content)).await;

        let value = client.complete_json("s", "u").await.unwrap();
        assert_eq!(value["careerMatch"]["percentageFit"], 10);
    }

    #[tokio::test]
    async fn test_gateway_429_is_rate_limited() {
        let (client, _) = spawn_stub(StatusCode::TOO_MANY_REQUESTS, "slow down").await;
        let err = client.complete("s", "u").await.unwrap_err();
        assert!(matches!(err, LlmError::RateLimited));
    }

    #[tokio::test]
    async fn test_gateway_402_is_quota_exhausted() {
        let (client, _) = spawn_stub(StatusCode::PAYMENT_REQUIRED, "no credits").await;
        let err = client.complete("s", "u").await.unwrap_err();
        assert!(matches!(err, LlmError::QuotaExhausted));
    }

    #[tokio::test]
    async fn test_gateway_other_failure_keeps_body() {
        let (client, _) = spawn_stub(StatusCode::BAD_GATEWAY, "bad upstream").await;
        match client.complete("s", "u").await.unwrap_err() {
            LlmError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "bad upstream");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_content_is_parse_error() {
        let (client, _) = spawn_stub(StatusCode::OK, &completion_body("I think you'd be great!")).await;
        let err = client.complete_json("s", "u").await.unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
    }

    #[tokio::test]
    async fn test_missing_content_is_empty_content() {
        let body = serde_json::json!({ "choices": [] }).to_string();
        let (client, _) = spawn_stub(StatusCode::OK, &body).await;
        let err = client.complete_json("s", "u").await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }
}
