/// LLM Client: the single point of entry for all model calls in the interview coach.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// Orchestration code only sees the `JsonGenerator` trait, so tests and
/// alternative backends can be swapped in without touching callers.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::interview::normalize::RawRecord;

pub mod prompts;

/// Messages endpoint used when `ANTHROPIC_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Model used when `LLM_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 2048;

/// Failure modes of a single generation attempt.
///
/// `Unavailable` and `Malformed` are recoverable: callers substitute the
/// deterministic fallback. `Http` and `Api` are service faults and surface.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation unavailable: {0}")]
    Unavailable(String),

    #[error("generation returned malformed output: {0}")]
    Malformed(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl GenerationError {
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GenerationError::Unavailable(_) | GenerationError::Malformed(_)
        )
    }
}

/// The external generation collaborator: prompt in, JSON object out.
///
/// Carried in `AppState` as `Arc<dyn JsonGenerator>`.
#[async_trait]
pub trait JsonGenerator: Send + Sync {
    async fn generate_json(&self, prompt: &str) -> Result<RawRecord, GenerationError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Wraps the Anthropic Messages API. One attempt per call, bounded by the
/// client timeout; a failed attempt is never retried here.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    api_url: String,
}

impl LlmClient {
    pub fn new(api_key: Option<String>, model: String, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            model,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    /// Points the client at a different Messages endpoint (proxy, gateway).
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes a raw call to the Messages API, returning the full response object.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            GenerationError::Unavailable("ANTHROPIC_API_KEY is not configured".to_string())
        })?;

        let request_body = AnthropicRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature: 0.2,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        // A 2xx whose body is not a Messages payload (proxy page, truncated
        // stream) is bad output, not a service fault.
        let body = response.text().await.map_err(classify_transport_error)?;
        let llm_response: LlmResponse = serde_json::from_str(&body).map_err(|e| {
            GenerationError::Malformed(format!("undecodable response body: {e}"))
        })?;

        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}",
            llm_response.usage.input_tokens, llm_response.usage.output_tokens
        );

        Ok(llm_response)
    }
}

#[async_trait]
impl JsonGenerator for LlmClient {
    async fn generate_json(&self, prompt: &str) -> Result<RawRecord, GenerationError> {
        let response = self.call(prompt, prompts::JSON_ONLY_SYSTEM).await?;
        let text = response
            .text()
            .ok_or_else(|| GenerationError::Malformed("LLM returned empty content".to_string()))?;
        parse_json_object(text)
    }
}

/// A timed-out request is treated like a missing backend and an undecodable
/// body like malformed output: the caller falls back in both cases.
fn classify_transport_error(err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        GenerationError::Unavailable(format!("request timed out: {err}"))
    } else if err.is_decode() {
        GenerationError::Malformed(format!("undecodable response body: {err}"))
    } else {
        GenerationError::Http(err)
    }
}

/// Parses model text into a JSON object, rejecting anything else as malformed.
pub fn parse_json_object(text: &str) -> Result<RawRecord, GenerationError> {
    match serde_json::from_str::<Value>(strip_json_fences(text)) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(GenerationError::Malformed(
            "expected a JSON object".to_string(),
        )),
        Err(e) => Err(GenerationError::Malformed(format!(
            "LLM response was not valid JSON: {e}"
        ))),
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start()),
        None => text,
    }
}
