/*!
 * OpenAI chat completions client.
 *
 * Also serves OpenAI-compatible local servers such as LM Studio, which accept
 * the same request shape under their own base URL.
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use reqwest::Client;

use super::{build_client, post_json_with_retry, Completion, CompletionRequest, Provider, RetryPolicy};
use crate::errors::ProviderError;

/// Default public API base URL
const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// OpenAI client for interacting with the chat completions API
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key sent as bearer token, may be empty for local servers
    api_key: String,
    /// Base URL ending before `/chat/completions`
    endpoint: String,
    /// Model to use
    model: String,
    /// Sampling temperature
    temperature: f32,
    /// Name reported in logs
    display_name: String,
    /// Retry and pacing settings
    policy: RetryPolicy,
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    #[serde(default)]
    pub content: String,
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// The model to use
    model: String,
    /// The messages for the conversation
    messages: Vec<ChatMessage>,
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct ChatUsage {
    /// Number of prompt tokens
    pub prompt_tokens: u64,
    /// Number of completion tokens
    pub completion_tokens: u64,
}

/// One generated choice
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    /// Generated message
    pub message: ChatMessage,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// Generated choices
    pub choices: Vec<ChatChoice>,
    /// Token usage information
    pub usage: Option<ChatUsage>,
}

impl ChatRequest {
    /// Create a new chat request
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

impl OpenAI {
    /// Create a new OpenAI client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new_with_config(api_key, endpoint, model, 0.3, 30, RetryPolicy::default())
    }

    /// Create a new OpenAI client with custom retry and timeout settings
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
            display_name: "OpenAI".to_string(),
            policy,
        }
    }

    /// Override the name used in logs
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Chat completions URL
    pub fn completions_url(&self) -> String {
        let base = if self.endpoint.is_empty() { DEFAULT_ENDPOINT } else { self.endpoint.as_str() };
        format!("{}/chat/completions", base.trim_end_matches('/'))
    }

    /// Send a chat request
    pub async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let authorization = format!("Bearer {}", self.api_key);
        let headers: Vec<(&str, &str)> = if self.api_key.is_empty() {
            Vec::new()
        } else {
            vec![("Authorization", authorization.as_str())]
        };

        let body = post_json_with_retry(
            &self.client,
            &self.completions_url(),
            &headers,
            request,
            &self.policy,
            &self.display_name,
        ).await?;

        serde_json::from_str::<ChatResponse>(&body)
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse {} response: {}", self.display_name, e)))
    }
}

#[async_trait]
impl Provider for OpenAI {
    fn name(&self) -> &str {
        &self.display_name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        let mut chat = ChatRequest::new(&self.model).temperature(self.temperature);
        if let Some(system) = request.system {
            chat = chat.add_message("system", system);
        }
        chat = chat.add_message("user", request.prompt);

        let response = self.send(&chat).await?;
        let text = response.choices.first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| ProviderError::ParseError(format!("{} returned no choices", self.display_name)))?;

        Ok(Completion {
            text,
            input_tokens: response.usage.as_ref().map(|u| u.prompt_tokens),
            output_tokens: response.usage.as_ref().map(|u| u.completion_tokens),
        })
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let request = ChatRequest::new(&self.model).add_message("user", "Hello");
        self.send(&request).await.map(|_| ())
    }
}
