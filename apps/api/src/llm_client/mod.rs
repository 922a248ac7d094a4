//! LLM client: the single point of entry for chat completion calls.
//!
//! No other module talks to the completion endpoint directly. Callers hold an
//! `Arc<dyn CompletionService>`, which in production is an `OpenAiClient`
//! wrapped in a `RetryingClient`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;
pub mod retry;

pub use retry::{RetryPolicy, RetryingClient, TokioSleeper};

/// Tagged failure from the completion service.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompletionError {
    #[error("rate limited: {message}")]
    RateLimited {
        message: String,
        /// Server-provided wait, when the response carried `Retry-After`.
        retry_after: Option<Duration>,
    },

    #[error("authentication failed: {message}")]
    Authentication { message: String },

    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("{message}")]
    Other { message: String },
}

impl CompletionError {
    /// Stable tag for logs and error envelopes.
    pub fn tag(&self) -> &'static str {
        match self {
            CompletionError::RateLimited { .. } => "rate_limit",
            CompletionError::Authentication { .. } => "authentication",
            CompletionError::InvalidRequest { .. } => "invalid_request",
            CompletionError::Other { .. } => "other",
        }
    }

    /// Authentication and malformed-request failures never succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CompletionError::RateLimited { .. } | CompletionError::Other { .. }
        )
    }

    fn other(message: impl Into<String>) -> Self {
        CompletionError::Other {
            message: message.into(),
        }
    }
}

/// Success text or a tagged error, never both.
pub type CompletionResult = Result<String, CompletionError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Body of a chat completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// The opaque completion boundary: prompt in, text or tagged error out.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> CompletionResult;
}

#[async_trait]
impl<T: CompletionService + ?Sized> CompletionService for std::sync::Arc<T> {
    async fn complete(&self, request: &ChatRequest) -> CompletionResult {
        self.as_ref().complete(request).await
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Single-attempt client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(
        base_url: &str,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
        })
    }
}

#[async_trait]
impl CompletionService for OpenAiClient {
    async fn complete(&self, request: &ChatRequest) -> CompletionResult {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| CompletionError::other(format!("HTTP error: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body, retry_after));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::other(format!("unreadable completion body: {e}")))?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "Completion succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        first_choice_text(parsed)
    }
}

/// Maps a non-success HTTP status onto the error taxonomy.
fn classify_failure(status: StatusCode, body: &str, retry_after: Option<Duration>) -> CompletionError {
    let message = serde_json::from_str::<ApiError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| {
            if body.trim().is_empty() {
                status.to_string()
            } else {
                body.trim().to_string()
            }
        });

    match status {
        StatusCode::TOO_MANY_REQUESTS => CompletionError::RateLimited {
            message,
            retry_after,
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            CompletionError::Authentication { message }
        }
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
            CompletionError::InvalidRequest { message }
        }
        _ => CompletionError::other(format!("API error (status {}): {message}", status.as_u16())),
    }
}

fn first_choice_text(response: ChatResponse) -> CompletionResult {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| CompletionError::other("completion returned empty content"))
}
