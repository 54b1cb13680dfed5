//! Translator backed by an OpenAI-compatible `/chat/completions` endpoint.
//!
//! Works with OpenAI, OpenRouter and local servers such as Ollama or vLLM
//! that expose the same API.

use async_trait::async_trait;
use deck_core::{ProviderConfig, TranslateError, Translator};
use log::{debug, error, warn};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::filter::needs_translation;
use crate::prompt::build_system_prompt;
use crate::retry::{reset_wait, RetryPolicy};

const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";

/// Chat message object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

/// Request body for `/chat/completions`.
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

/// Response body of `/chat/completions`; only the fields we read.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

impl ChatResponse {
    /// Trimmed content of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .map(|c| c.message.content.trim())
            .filter(|t| !t.is_empty())
    }
}

/// A failed attempt, with the provider's reset hint when it sent one.
#[derive(Debug)]
struct AttemptError {
    error: TranslateError,
    reset_wait: Option<Duration>,
}

impl From<TranslateError> for AttemptError {
    fn from(error: TranslateError) -> Self {
        Self {
            error,
            reset_wait: None,
        }
    }
}

/// Translates paragraphs through a chat completion model.
///
/// Gemini is reached through its OpenAI-compatible endpoint,
/// `https://generativelanguage.googleapis.com/v1beta/openai`.
#[derive(Debug, Clone)]
pub struct ChatTranslator {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    system_prompt: String,
    retry: RetryPolicy,
}

impl ChatTranslator {
    /// Create a translator from provider settings.
    pub fn new(config: &ProviderConfig) -> Result<Self, TranslateError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TranslateError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            system_prompt: build_system_prompt(&config.target_language, &config.glossary),
            retry: RetryPolicy::from_config(config),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn request_for(&self, text: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::new("system", self.system_prompt.as_str()),
                ChatMessage::new("user", text),
            ],
            temperature: self.temperature,
        }
    }

    /// One request, without retries.
    async fn complete(&self, request: &ChatRequest) -> Result<String, AttemptError> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if !self.api_key.is_empty() && self.api_key != "EMPTY" {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TranslateError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let reset = response
                .headers()
                .get(RATE_LIMIT_RESET_HEADER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| reset_wait(v, now_ms()));
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Chat completion API error ({}): {}", status, message);

            let error = if status == StatusCode::TOO_MANY_REQUESTS {
                TranslateError::RateLimited(message)
            } else {
                TranslateError::Api {
                    status: status.as_u16(),
                    message,
                }
            };
            return Err(AttemptError {
                error,
                reset_wait: reset,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| TranslateError::Parse(e.to_string()))?;

        body.text()
            .map(str::to_string)
            .ok_or_else(|| TranslateError::Parse("response has no completion text".to_string()).into())
    }
}

#[async_trait]
impl Translator for ChatTranslator {
    async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        if !needs_translation(text) {
            debug!("Passing through without translation: {:?}", text);
            return Ok(text.to_string());
        }

        let request = self.request_for(text);
        let attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            let failure = match self.complete(&request).await {
                Ok(translated) => return Ok(translated),
                Err(failure) => failure,
            };

            if !failure.error.is_retryable() || attempt + 1 >= attempts {
                return Err(failure.error);
            }

            let rate_limited = matches!(
                failure.error,
                TranslateError::RateLimited(_) | TranslateError::Api { status: 429, .. }
            );
            let wait = self.retry.delay(attempt, rate_limited, failure.reset_wait);
            warn!(
                "API request failed (attempt {}/{}), retrying in {}ms: {}",
                attempt + 1,
                attempts,
                wait.as_millis(),
                failure.error
            );
            tokio::time::sleep(wait).await;
            attempt += 1;
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
