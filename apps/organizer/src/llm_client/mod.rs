//! LLM client: the only place the organizer talks to the Anthropic Messages API.
//!
//! Rendered prompts from `crate::prompts` are submitted here; nothing else in the
//! crate builds HTTP requests to the model provider.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Default model when `ANTHROPIC_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 2048;
const MAX_ATTEMPTS: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("gave up after {attempts} attempts")]
    Exhausted { attempts: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct Completion {
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

impl Completion {
    /// Text of the first text block, if any.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Anthropic Messages API client with retry on rate limits and server errors.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: String, model: String) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one user message and returns the raw completion.
    /// 429 and 5xx responses (and transport errors) are retried with exponential backoff.
    pub async fn complete(&self, prompt: &str, system: &str) -> Result<Completion, LlmError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let mut last_error = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                let delay = backoff_delay(attempt);
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "LLM call failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if is_retryable(status) {
                let message = response.text().await.unwrap_or_default();
                warn!(status = status.as_u16(), "LLM API returned retryable status");
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
                continue;
            }

            if !status.is_success() {
                let raw = response.text().await.unwrap_or_default();
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: api_error_message(raw),
                });
            }

            let completion: Completion = response.json().await?;
            debug!(
                model = %self.model,
                input_tokens = completion.usage.input_tokens,
                output_tokens = completion.usage.output_tokens,
                "LLM call succeeded"
            );
            return Ok(completion);
        }

        Err(last_error.unwrap_or(LlmError::Exhausted {
            attempts: MAX_ATTEMPTS,
        }))
    }

    /// Sends one user message and returns the trimmed reply text.
    pub async fn complete_text(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let completion = self.complete(prompt, system).await?;
        let text = completion.text().map(str::trim).unwrap_or_default();
        if text.is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(text.to_string())
    }

    /// Sends one user message and deserializes the reply as JSON.
    /// The prompt must instruct the model to answer with JSON only.
    pub async fn complete_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, LlmError> {
        let completion = self.complete(prompt, system).await?;
        let text = completion.text().ok_or(LlmError::EmptyContent)?;
        parse_json_reply(text)
    }
}

/// Parses a model reply as JSON, tolerating a surrounding code fence.
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    serde_json::from_str(strip_json_fences(text)).map_err(LlmError::Parse)
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// 1s, 2s, 4s, ...
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(1000 * (1 << attempt.saturating_sub(1).min(6)))
}

fn api_error_message(raw: String) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(&raw)
        .map(|e| e.error.message)
        .unwrap_or(raw)
}

/// Strips ```json ... ``` or ``` ... ``` fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };
    let inner = inner.trim_start();
    inner.strip_suffix("```").map(str::trim).unwrap_or(inner)
}
