//! Chat-completions client with rate-limit-aware retries.
//!
//! One [`LlmClient::call`] is one analysis: it POSTs the prompt to the
//! configured endpoint, classifies each response (rate limit, hard failure,
//! malformed, success), and consults the [`RetryPolicy`] between attempts.
//! The client holds no mutable state and is safe to share across
//! concurrent enrichments.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use dealscope_shared::{AppConfig, DealscopeError, Result, resolve_api_key};

use crate::parse;
use crate::prompt::SYSTEM_PROMPT;
use crate::retry::{AttemptFailure, RetryDecision, RetryPolicy, RetryState};

/// Sampling temperature — low, to favor schema-stable output.
const DEFAULT_TEMPERATURE: f32 = 0.4;

/// Output-token ceiling — generous enough for the full schema.
const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Per-request timeout. Covers slow generations without letting a hung
/// connection stall the whole attempt budget.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Runtime configuration for the LLM client.
///
/// The credential is an explicit `Option`: a keyless config is a valid
/// state that the orchestrator routes to fallback mode, not an error.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Chat-completions endpoint URL.
    pub endpoint: String,
    /// Model identifier to request.
    pub model: String,
    /// Bearer credential, if configured.
    pub api_key: Option<String>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Output-token ceiling.
    pub max_tokens: u32,
    /// Retry behavior.
    pub retry: RetryPolicy,
}

impl LlmConfig {
    /// Build from the application config, resolving the API key from the
    /// configured environment variable.
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            endpoint: config.llm.endpoint.clone(),
            model: config.llm.model.clone(),
            api_key: resolve_api_key(config),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            retry: RetryPolicy {
                max_attempts: config.llm.max_attempts,
                ..RetryPolicy::default()
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

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
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: ChatResponseMessage,
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Stateless chat-completions client.
pub struct LlmClient {
    client: Client,
    config: LlmConfig,
}

impl LlmClient {
    /// Create a new client with the given configuration.
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DealscopeError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Whether a credential is configured. Without one, [`call`](Self::call)
    /// fails immediately and the pipeline should go straight to fallback.
    pub fn has_credential(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Send `prompt` for analysis and return the parsed JSON object.
    ///
    /// Retries per the configured policy; after exhaustion, returns the
    /// typed [`DealscopeError::LlmUnavailable`] carrying the last failure.
    #[instrument(skip_all, fields(model = %self.config.model))]
    pub async fn call(&self, prompt: &str) -> Result<Value> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(DealscopeError::config("LLM API key not configured"));
        };

        let mut state = RetryState::default();

        loop {
            match self.attempt(prompt, api_key).await {
                Ok(value) => {
                    debug!(attempts = state.attempts_used + 1, "analysis call succeeded");
                    return Ok(value);
                }
                Err(failure) => {
                    warn!(
                        attempt = state.attempts_used + 1,
                        max = self.config.retry.max_attempts,
                        error = %failure,
                        "analysis attempt failed"
                    );

                    match self.config.retry.on_failure(state, &failure) {
                        RetryDecision::Retry { delay, state: next } => {
                            tokio::time::sleep(delay).await;
                            state = next;
                        }
                        RetryDecision::Exhausted => {
                            return Err(DealscopeError::LlmUnavailable {
                                attempts: self.config.retry.max_attempts,
                                message: failure.to_string(),
                            });
                        }
                    }
                }
            }
        }
    }

    /// One POST to the endpoint, classified into success or a failure class.
    async fn attempt(
        &self,
        prompt: &str,
        api_key: &str,
    ) -> std::result::Result<Value, AttemptFailure> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AttemptFailure::Failed(format!("transport: {e}")))?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AttemptFailure::RateLimited);
        }

        if !status.is_success() {
            return Err(AttemptFailure::Failed(format!("HTTP {status}")));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AttemptFailure::Failed(format!("invalid response body: {e}")))?;

        // An empty message is a malformed response, not a transport error,
        // but it spends an attempt just the same.
        let content = body
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AttemptFailure::Failed("empty response content".into()))?;

        parse::extract_json(content).map_err(|e| AttemptFailure::Failed(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
