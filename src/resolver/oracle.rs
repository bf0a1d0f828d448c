//! AI oracle abstraction and the default chat-completions implementation.
//!
//! The oracle is the most expensive rung of the resolution ladder, so the
//! client rate-limits itself between calls and every call is counted by
//! the shared [`UsageTracker`]. Answers are canonicalized against the
//! allowed-value list when one is given; an answer outside the list is
//! treated as a refusal, not an error.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::OracleConfig;
use crate::error::{Error, Result};
use crate::memory::{AttributeKind, Language};
use crate::usage::UsageTracker;

/// One question for the oracle
#[derive(Debug, Clone)]
pub struct OracleRequest {
    pub kind: AttributeKind,
    /// Verbatim source string the answer will be keyed by
    pub key: String,
    /// Target language for the canonical value
    pub language: Language,
    /// Closed answer vocabulary; empty means free-form
    pub allowed_values: Vec<String>,
    /// Below-threshold heuristic guess, offered as a starting point
    pub heuristic_hint: Option<String>,
}

/// Vendor-agnostic completion capability. `Ok(None)` means the oracle
/// declined to answer; only transport and protocol problems are errors.
#[async_trait]
pub trait AiOracle: Send + Sync {
    async fn complete(&self, request: &OracleRequest) -> Result<Option<String>>;
}

/// Minimum spacing between consecutive oracle calls
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("oracle rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct OracleAnswer {
    value: Option<String>,
}

/// Chat-completions oracle over any OpenAI-compatible endpoint
pub struct HttpOracle {
    http_client: reqwest::Client,
    rate_limiter: RateLimiter,
    config: OracleConfig,
    usage: Arc<UsageTracker>,
}

impl HttpOracle {
    pub fn new(config: OracleConfig, usage: Arc<UsageTracker>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Oracle(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            rate_limiter: RateLimiter::new(config.call_delay_ms),
            config,
            usage,
        })
    }

    fn build_prompt(request: &OracleRequest) -> String {
        let mut prompt = format!(
            "Determine the {} for this table-tennis eshop product.\n\
             Source string ({}): {}\n",
            request.kind.label(),
            request.language,
            request.key,
        );
        if !request.allowed_values.is_empty() {
            prompt.push_str(&format!(
                "Answer must be exactly one of: {}\n",
                request.allowed_values.join(", ")
            ));
        }
        if let Some(hint) = &request.heuristic_hint {
            prompt.push_str(&format!("A keyword heuristic suggests: {hint}\n"));
        }
        prompt.push_str(
            "Reply with JSON: {\"value\": \"<answer>\"} or {\"value\": null} if undeterminable.",
        );
        prompt
    }

    /// Map a free-form answer onto the allowed vocabulary, matching
    /// case-insensitively (Unicode-aware, the vocabulary is Czech).
    /// No list means any non-empty answer stands.
    fn canonicalize(answer: &str, allowed: &[String]) -> Option<String> {
        let answer = answer.trim();
        if answer.is_empty() {
            return None;
        }
        if allowed.is_empty() {
            return Some(answer.to_string());
        }
        let answer_lower = answer.to_lowercase();
        allowed
            .iter()
            .find(|v| v.to_lowercase() == answer_lower)
            .cloned()
    }
}

#[async_trait]
impl AiOracle for HttpOracle {
    async fn complete(&self, request: &OracleRequest) -> Result<Option<String>> {
        self.rate_limiter.wait().await;

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You normalize product attributes for a table-tennis eshop. \
                              Answer with the canonical value only, as JSON."
                        .to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: Self::build_prompt(request),
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            temperature: 0.0,
        };

        let mut http_request = self.http_client.post(&self.config.api_url).json(&body);
        if let Some(api_key) = &self.config.api_key {
            http_request = http_request.bearer_auth(api_key);
        }

        let response = http_request.send().await.map_err(|e| {
            self.usage.record_failure();
            Error::Oracle(format!("oracle request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            self.usage.record_failure();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Oracle(format!("oracle returned {status}: {text}")));
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            self.usage.record_failure();
            Error::Oracle(format!("malformed oracle response: {e}"))
        })?;

        let (prompt_tokens, completion_tokens) = chat
            .usage
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or((0, 0));
        self.usage.record(prompt_tokens, completion_tokens);

        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| Error::Oracle("oracle response had no choices".to_string()))?;

        let answer: OracleAnswer = serde_json::from_str(content)
            .map_err(|e| Error::Oracle(format!("oracle answer was not JSON: {e}")))?;

        Ok(answer
            .value
            .as_deref()
            .and_then(|v| Self::canonicalize(v, &request.allowed_values)))
    }
}
