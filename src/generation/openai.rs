//! OpenAI-compatible chat completions backend.
//!
//! [`ChatClient`] performs one system+user exchange against a chat
//! completions endpoint. [`OpenAiGenerator`] uses it to produce statements;
//! the intake analyzer shares the same client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::schema::GenerationConfig;
use crate::error::{ConfigError, GenerationError};

use super::prompt::{system_prompt, user_content};
use super::{GenerationRequest, GenerationResponse, StatementGenerator};

/// Maximum number of response-body bytes kept in an HTTP status error.
const MAX_ERROR_BODY: usize = 512;

// ============================================================================
// Chat Client
// ============================================================================

/// Minimal chat completions client.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl ChatClient {
    /// Creates a client for `base_url` with a bearer key.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Network` if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| GenerationError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            timeout,
        })
    }

    /// Creates a client from configuration.
    ///
    /// Returns `Ok(None)` when the configured API key variable is unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an unparseable timeout.
    pub fn from_config(config: &GenerationConfig) -> Result<Option<Self>, ConfigError> {
        let Some(api_key) = config.api_key() else {
            return Ok(None);
        };
        let timeout = config.timeout_duration()?;
        Self::new(&config.base_url, api_key, &config.model, timeout)
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                field: "generation".to_string(),
                value: config.base_url.clone(),
                expected: format!("a usable HTTP client ({e})"),
            })
    }

    /// Model name sent with each request.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one system+user exchange and returns the first choice's text.
    ///
    /// # Errors
    ///
    /// - `GenerationError::Timeout` if the deadline passes
    /// - `GenerationError::Network` on connection failures
    /// - `GenerationError::HttpStatus` on non-2xx responses
    /// - `GenerationError::InvalidResponse` if the body cannot be decoded
    /// - `GenerationError::EmptyResponse` if the first choice has no text
    pub async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Result<String, GenerationError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature,
            max_tokens,
        };

        debug!(model = %self.model, temperature, "sending chat completion request");

        let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
        let request = self
            .http
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&body);

        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| GenerationError::Timeout(timeout_ms))?
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let mut text = response.text().await.unwrap_or_default();
            truncate_at_char_boundary(&mut text, MAX_ERROR_BODY);
            return Err(GenerationError::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: ChatResponse = tokio::time::timeout(self.timeout, response.json())
            .await
            .map_err(|_| GenerationError::Timeout(timeout_ms))?
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        first_choice_text(parsed)
    }
}

fn first_choice_text(response: ChatResponse) -> Result<String, GenerationError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or(GenerationError::EmptyResponse)
}

fn truncate_at_char_boundary(text: &mut String, max: usize) {
    if text.len() <= max {
        return;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

// ============================================================================
// Statement Generator
// ============================================================================

/// Statement generator backed by a chat completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiGenerator {
    client: ChatClient,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiGenerator {
    /// Creates a generator over `client`.
    #[must_use]
    pub const fn new(client: ChatClient, temperature: f32, max_tokens: u32) -> Self {
        Self {
            client,
            temperature,
            max_tokens,
        }
    }
}

#[async_trait]
impl StatementGenerator for OpenAiGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        let started = Instant::now();
        let result = self
            .client
            .complete(
                &system_prompt(&request),
                &user_content(&request),
                self.temperature,
                Some(self.max_tokens),
            )
            .await;
        crate::observability::metrics::record_generation_duration(started.elapsed());
        result.map(|text| GenerationResponse { text })
    }
}
