//! Model Client — the single point of entry for all language-model calls.
//!
//! ARCHITECTURAL RULE: no other module may talk to the model endpoint
//! directly. All LLM interactions go through [`ModelClient`], which owns the
//! model allow-list check, the per-request timeout, and the retry loop.
//!
//! The wire format is the OpenAI-compatible `/chat/completions` contract
//! (Bearer auth, `choices[0].message.content`), whole-response only — no
//! streaming. The HTTP layer sits behind [`CompletionTransport`] so tests can
//! inject fakes and the retry machinery stays transport-agnostic.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::errors::PipelineError;

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";
const MAX_ATTEMPTS: u32 = 3;
const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 1500;
/// Per-request wall-clock budget. A request exceeding it is cancelled and
/// counted as one attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A single failed exchange with the model endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("model returned empty content")]
    EmptyContent,
}

impl TransportError {
    /// Whether retrying the same request can plausibly succeed.
    /// 4xx responses other than 429 are caller bugs and are not retried.
    fn is_retryable(&self) -> bool {
        match self {
            TransportError::Http(_) | TransportError::Timeout(_) => true,
            TransportError::Api { status, .. } => *status == 429 || *status >= 500,
            TransportError::EmptyContent => false,
        }
    }
}

/// One whole-response exchange with a model endpoint.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        prompt: &str,
        model: &str,
    ) -> Result<String, TransportError>;
}

// ────────────────────────────────────────────────────────────────────────────
// HTTP transport (OpenAI-compatible chat completions)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        // No reqwest-level timeout: the caller-facing budget is enforced by
        // ModelClient so a fake transport obeys the same rules as this one.
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl CompletionTransport for HttpTransport {
    async fn complete(
        &self,
        system: &str,
        prompt: &str,
        model: &str,
    ) -> Result<String, TransportError> {
        let body = ChatRequest {
            model,
            messages: vec![
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
            max_tokens: MAX_TOKENS,
        };

        let url = format!("{}{}", self.base_url, CHAT_COMPLETIONS_PATH);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Surface the structured error message when the endpoint sends one.
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(TransportError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(TransportError::EmptyContent);
        }

        Ok(content)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Model client with retry state machine
// ────────────────────────────────────────────────────────────────────────────

/// The model's raw text plus how many retries it took to get it.
#[derive(Debug, Clone)]
pub struct ModelReply {
    pub content: String,
    /// Failed attempts before the successful one (0 on first-try success).
    pub retries: u32,
}

/// Explicit states of the retry loop. Keeping this a real state machine
/// (rather than an ad hoc loop) makes the max-attempt and cancellation
/// semantics testable in isolation.
#[derive(Debug)]
enum RetryState {
    Idle,
    Attempting { attempt: u32 },
    Backoff { next_attempt: u32, delay: Duration },
}

/// Exponential backoff: 1s after the first failure, 2s after the second.
fn backoff_delay(failed_attempt: u32) -> Duration {
    Duration::from_millis(1000 * (1 << (failed_attempt - 1)))
}

pub struct ModelClient {
    transport: Arc<dyn CompletionTransport>,
    allowed_models: Vec<String>,
    timeout: Duration,
}

impl ModelClient {
    /// Builds a client with the real HTTP transport from resolved config.
    pub fn new(config: &Config) -> Result<Self> {
        let transport = HttpTransport::new(&config.base_url, &config.api_key)?;
        Ok(Self::with_transport(
            Arc::new(transport),
            config.models.clone(),
            DEFAULT_TIMEOUT,
        ))
    }

    /// Builds a client over an arbitrary transport. Tests use this with fakes.
    pub fn with_transport(
        transport: Arc<dyn CompletionTransport>,
        allowed_models: Vec<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            allowed_models,
            timeout,
        }
    }

    pub fn allowed_models(&self) -> &[String] {
        &self.allowed_models
    }

    /// The first configured model is the default.
    pub fn default_model(&self) -> &str {
        &self.allowed_models[0]
    }

    /// Sends the prompt to `model`, retrying transport failures up to
    /// `MAX_ATTEMPTS` with exponential backoff.
    ///
    /// - unknown model → `Configuration`, never retried
    /// - a request exceeding the timeout is cancelled (the in-flight future
    ///   is dropped, releasing its connection) and counts as one attempt
    /// - exhausted retries → `Generation` carrying the last cause
    pub async fn generate(
        &self,
        system: &str,
        prompt: &str,
        model: &str,
    ) -> Result<ModelReply, PipelineError> {
        if !self.allowed_models.iter().any(|m| m == model) {
            return Err(PipelineError::Configuration(format!(
                "model '{model}' is not in the configured model list"
            )));
        }

        let mut state = RetryState::Idle;

        loop {
            state = match state {
                RetryState::Idle => RetryState::Attempting { attempt: 1 },

                RetryState::Attempting { attempt } => {
                    debug!(model, attempt, "calling model endpoint");
                    let outcome =
                        tokio::time::timeout(self.timeout, self.transport.complete(system, prompt, model))
                            .await
                            // Elapsed timeout drops the in-flight future.
                            .unwrap_or(Err(TransportError::Timeout(self.timeout)));

                    match outcome {
                        Ok(content) => {
                            // Succeeded: retries = failed attempts before this one.
                            return Ok(ModelReply {
                                content,
                                retries: attempt - 1,
                            });
                        }
                        Err(e) if e.is_retryable() && attempt < MAX_ATTEMPTS => {
                            let delay = backoff_delay(attempt);
                            warn!(
                                model,
                                attempt,
                                delay_ms = delay.as_millis() as u64,
                                "model call failed, backing off: {e}"
                            );
                            RetryState::Backoff {
                                next_attempt: attempt + 1,
                                delay,
                            }
                        }
                        Err(e) => {
                            // Exhausted (or non-retryable): surface the last cause.
                            return Err(PipelineError::Generation {
                                attempts: attempt,
                                source: e,
                            });
                        }
                    }
                }

                RetryState::Backoff {
                    next_attempt,
                    delay,
                } => {
                    tokio::time::sleep(delay).await;
                    RetryState::Attempting {
                        attempt: next_attempt,
                    }
                }
            };
        }
    }
}
