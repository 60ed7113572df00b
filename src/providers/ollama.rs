/*!
 * Ollama client for local LLM servers.
 */

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use log::{debug, warn};

use super::{build_client, post_json_with_retry, Completion, CompletionRequest, Provider, RetryPolicy};
use crate::errors::ProviderError;

/// Ollama client for interacting with Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// Model name to use for generation
    model: String,
    /// Sampling temperature
    temperature: f32,
    /// HTTP client for making requests
    client: Client,
    /// Retry and pacing settings
    policy: RetryPolicy,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    #[serde(default)]
    pub model: String,
    /// Generated text
    pub response: String,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
    /// Number of prompt tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

/// Version response from the Ollama API
#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: String,
}

impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            options: None,
            stream: Some(false),
        }
    }

    /// Set the system message
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options = Some(GenerationOptions { temperature: Some(temperature) });
        self
    }
}

impl Ollama {
    /// Create a new Ollama client
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new_with_config(base_url, model, 0.3, 30, RetryPolicy::default())
    }

    /// Create a new Ollama client with custom retry and timeout settings
    pub fn new_with_config(
        base_url: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        timeout_secs: u64,
        policy: RetryPolicy,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            model: model.into(),
            temperature,
            client: build_client(timeout_secs),
            policy,
        }
    }

    /// Base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Generate a completion for a request
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = post_json_with_retry(&self.client, &url, &[], request, &self.policy, "Ollama").await?;
        parse_generation_response(&body)
    }

    /// Get the Ollama server version
    pub async fn version(&self) -> Result<String, ProviderError> {
        let url = format!("{}/api/version", self.base_url);
        let response = self.client.get(&url).send().await
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to connect to Ollama at {}: {}", self.base_url, e)))?;

        if !response.status().is_success() {
            return Err(ProviderError::ApiError {
                status_code: response.status().as_u16(),
                message: "Ollama version request failed".to_string(),
            });
        }

        let version: VersionResponse = response.json().await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;
        Ok(version.version)
    }
}

/// Parse a generate response, falling back to concatenating a JSONL stream
fn parse_generation_response(body: &str) -> Result<GenerationResponse, ProviderError> {
    if let Ok(response) = serde_json::from_str::<GenerationResponse>(body) {
        return Ok(response);
    }

    debug!("Ollama response is not a single JSON object, trying JSONL");
    let mut combined = GenerationResponse {
        model: String::new(),
        response: String::new(),
        done: false,
        prompt_eval_count: None,
        eval_count: None,
    };
    let mut parsed_any = false;

    for line in body.lines().filter(|l| !l.trim().is_empty()) {
        match serde_json::from_str::<GenerationResponse>(line) {
            Ok(chunk) => {
                parsed_any = true;
                combined.response.push_str(&chunk.response);
                combined.model = chunk.model;
                combined.done = chunk.done;
                combined.prompt_eval_count = chunk.prompt_eval_count.or(combined.prompt_eval_count);
                combined.eval_count = chunk.eval_count.or(combined.eval_count);
            }
            Err(e) => warn!("Skipping unparseable Ollama line: {}", e),
        }
    }

    if parsed_any {
        Ok(combined)
    } else {
        Err(ProviderError::ParseError(format!("Unexpected Ollama response: {}", body)))
    }
}

#[async_trait]
impl Provider for Ollama {
    fn name(&self) -> &str {
        "Ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        let mut generation = GenerationRequest::new(&self.model, request.prompt).temperature(self.temperature);
        if let Some(system) = request.system {
            generation = generation.system(system);
        }

        let response = self.generate(&generation).await?;
        Ok(Completion {
            text: response.response,
            input_tokens: response.prompt_eval_count,
            output_tokens: response.eval_count,
        })
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let version = self.version().await?;
        debug!("Connected to Ollama {}", version);
        Ok(())
    }
}
