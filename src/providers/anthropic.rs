use async_trait::async_trait;
use serde::{Serialize, Deserialize};
use reqwest::Client;

use super::{build_client, post_json_with_retry, Completion, CompletionRequest, Provider, RetryPolicy};
use crate::errors::ProviderError;

/// Default public API endpoint
const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com";

/// API version header value
const API_VERSION: &str = "2023-06-01";

/// Anthropic client for interacting with Anthropic API
#[derive(Debug)]
pub struct Anthropic {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL (empty means the public API)
    endpoint: String,
    /// Model to use
    model: String,
    /// Sampling temperature
    temperature: f32,
    /// Maximum number of tokens to generate
    max_tokens: u32,
    /// Retry and pacing settings
    policy: RetryPolicy,
}

/// Anthropic message request
#[derive(Debug, Serialize)]
pub struct AnthropicRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<AnthropicMessage>,

    /// System prompt to guide the AI
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Maximum number of tokens to generate
    max_tokens: u32,
}

/// Anthropic message format
#[derive(Debug, Serialize, Deserialize)]
pub struct AnthropicMessage {
    /// Role of the message sender (user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct TokenUsage {
    /// Number of input tokens
    pub input_tokens: u64,
    /// Number of output tokens
    pub output_tokens: u64,
}

/// Anthropic response
#[derive(Debug, Deserialize)]
pub struct AnthropicResponse {
    /// The content of the response
    pub content: Vec<AnthropicContent>,
    /// Token usage information
    pub usage: Option<TokenUsage>,
}

/// Individual content block in an Anthropic response
#[derive(Debug, Deserialize)]
pub struct AnthropicContent {
    /// The type of content
    #[serde(rename = "type")]
    pub content_type: String,

    /// The actual text content
    #[serde(default)]
    pub text: String,
}

impl AnthropicRequest {
    /// Create a new Anthropic request
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            system: None,
            temperature: None,
            max_tokens,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(AnthropicMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

impl Anthropic {
    /// Create a new Anthropic client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new_with_config(api_key, endpoint, model, 0.3, 60, RetryPolicy::default())
    }

    /// Create a new Anthropic client with custom retry and timeout settings
    pub fn new_with_config(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        timeout_secs: u64,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            client: build_client(timeout_secs),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            temperature,
            max_tokens: 4096,
            policy,
        }
    }

    /// Messages API URL
    pub fn messages_url(&self) -> String {
        let base = if self.endpoint.is_empty() { DEFAULT_ENDPOINT } else { self.endpoint.as_str() };
        format!("{}/v1/messages", base.trim_end_matches('/'))
    }

    /// Send a messages request
    pub async fn send(&self, request: &AnthropicRequest) -> Result<AnthropicResponse, ProviderError> {
        let headers = [
            ("x-api-key", self.api_key.as_str()),
            ("anthropic-version", API_VERSION),
        ];
        let body = post_json_with_retry(&self.client, &self.messages_url(), &headers, request, &self.policy, "Anthropic").await?;

        serde_json::from_str::<AnthropicResponse>(&body)
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Anthropic API response: {}", e)))
    }

    /// Extract text from Anthropic response
    pub fn extract_text_from_response(response: &AnthropicResponse) -> String {
        response.content.iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text.as_str())
            .collect()
    }
}

#[async_trait]
impl Provider for Anthropic {
    fn name(&self) -> &str {
        "Anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        let mut message = AnthropicRequest::new(&self.model, self.max_tokens)
            .temperature(self.temperature)
            .add_message("user", request.prompt);
        if let Some(system) = request.system {
            message = message.system(system);
        }

        let response = self.send(&message).await?;
        Ok(Completion {
            text: Self::extract_text_from_response(&response),
            input_tokens: response.usage.as_ref().map(|u| u.input_tokens),
            output_tokens: response.usage.as_ref().map(|u| u.output_tokens),
        })
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let request = AnthropicRequest::new(&self.model, 10).add_message("user", "Hello");
        self.send(&request).await.map(|_| ())
    }
}
