/*!
 * Provider implementations for different translation backends.
 *
 * This module contains client implementations for various LLM providers:
 * - Ollama: Local LLM server
 * - OpenAI: OpenAI API and OpenAI-compatible servers such as LM Studio
 * - Anthropic: Anthropic API integration
 * - Mock: Scripted provider for tests
 */

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::fmt::Debug;
use std::time::Duration;
use log::{error, warn};

use crate::errors::ProviderError;

/// A prompt sent to a backend
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Fully composed user prompt
    pub prompt: String,
    /// Optional system prompt
    pub system: Option<String>,
    /// Target language name, for logging and test doubles
    pub language: String,
}

impl CompletionRequest {
    /// Create a request without system prompt
    pub fn new(prompt: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            language: language.into(),
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// Text returned by a backend with its token usage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    /// Generated text
    pub text: String,
    /// Prompt tokens, when the backend reports them
    pub input_tokens: Option<u64>,
    /// Completion tokens, when the backend reports them
    pub output_tokens: Option<u64>,
}

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably behind `Arc<dyn Provider>`.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Short provider name for logs and usage summaries
    fn name(&self) -> &str;

    /// Model used for completions
    fn model(&self) -> &str;

    /// Complete a prompt
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

/// Retry and pacing settings shared by the HTTP clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Base backoff time in milliseconds, doubled on each retry
    pub backoff_base_ms: u64,
    /// Optional rate limit in requests per minute
    pub rate_limit: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 1000,
            rate_limit: None,
        }
    }
}

impl RetryPolicy {
    /// Delay before the given retry attempt (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        let mut delay = self.backoff_base_ms.saturating_mul(1u64 << shift);
        if let Some(rate_limit) = self.rate_limit.filter(|r| *r > 0) {
            delay = delay.max(60_000 / rate_limit as u64);
        }
        Duration::from_millis(delay)
    }
}

/// Build an HTTP client with the given request timeout
pub(crate) fn build_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .unwrap_or_default()
}

/// POST a JSON body, retrying on network errors, rate limiting and server errors.
///
/// Returns the response body of the first successful attempt.
pub(crate) async fn post_json_with_retry<T: serde::Serialize + ?Sized>(
    client: &Client,
    url: &str,
    headers: &[(&str, &str)],
    body: &T,
    policy: &RetryPolicy,
    provider: &str,
) -> Result<String, ProviderError> {
    let mut attempt = 0;
    let mut last_error = None;

    while attempt <= policy.max_retries {
        let mut request = client.post(url).json(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                let text = response.text().await
                    .unwrap_or_else(|_| "Failed to get response text".to_string());

                if status.is_success() {
                    return Ok(text);
                }

                let error = classify_status(status, text, provider);
                if !is_retryable(status) {
                    error!("{} API error ({}): {}", provider, status, error);
                    return Err(error);
                }
                warn!("{} API error ({}) - attempt {}/{}", provider, status, attempt + 1, policy.max_retries + 1);
                last_error = Some(error);
            }
            Err(e) => {
                warn!("{} network error: {} - attempt {}/{}", provider, e, attempt + 1, policy.max_retries + 1);
                last_error = Some(ProviderError::ConnectionError(e.to_string()));
            }
        }

        attempt += 1;
        if attempt <= policy.max_retries {
            tokio::time::sleep(policy.backoff(attempt)).await;
        }
    }

    Err(last_error.unwrap_or_else(|| {
        ProviderError::RequestFailed(format!("{} request failed after {} attempts", provider, policy.max_retries + 1))
    }))
}

fn is_retryable(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

fn classify_status(status: StatusCode, message: String, provider: &str) -> ProviderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ProviderError::AuthenticationError(format!("{}: {}", provider, message))
        }
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded(format!("{}: {}", provider, message)),
        _ => ProviderError::ApiError {
            status_code: status.as_u16(),
            message,
        },
    }
}

pub mod ollama;
pub mod openai;
pub mod anthropic;
pub mod mock;

pub use mock::{MockBehavior, MockProvider};
