/*!
 * Core translation service.
 *
 * Drives one document through the pipeline: version detection, cluster
 * splitting, per-cluster extraction, the backend round trip through the string
 * cache, reinsertion, and final assembly.
 */

use anyhow::{anyhow, Context, Result};
use indicatif::ProgressBar;
use log::{debug, info};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

use crate::app_config::{CacheConfig, Config, TranslationConfig, TranslationProvider};
use crate::database::Repository;
use crate::errors::{ProviderError, TranslationError, XliffError};
use crate::providers::anthropic::Anthropic;
use crate::providers::ollama::Ollama;
use crate::providers::openai::OpenAI;
use crate::providers::{CompletionRequest, Provider, RetryPolicy};
use crate::xliff::{self, segments, SplitDocument, XliffVersion};

use super::cache::StringCache;
use super::codec::{TranslationMap, TranslationRequest};
use super::extract::{ensure_consumed, extract_texts, reinsert};
use super::prompts::PromptTemplate;

/// Token usage statistics for a translation run
#[derive(Debug, Clone)]
pub struct TokenUsageStats {
    /// Number of prompt tokens
    pub prompt_tokens: u64,

    /// Number of completion tokens
    pub completion_tokens: u64,

    /// Total number of tokens
    pub total_tokens: u64,

    /// Number of backend calls made
    pub requests: u64,

    /// Number of prompts answered from the string cache
    pub cached_requests: u64,

    /// Start time of token tracking
    pub start_time: Instant,

    /// Total time spent on API requests
    pub api_duration: Duration,

    /// Provider name
    pub provider: String,

    /// Model name
    pub model: String,
}

impl Default for TokenUsageStats {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenUsageStats {
    /// Create a new empty token usage stats instance
    pub fn new() -> Self {
        Self::with_provider_info(String::new(), String::new())
    }

    /// Create new token usage stats with provider info
    pub fn with_provider_info(provider: String, model: String) -> Self {
        Self {
            prompt_tokens: 0,
            completion_tokens: 0,
            total_tokens: 0,
            requests: 0,
            cached_requests: 0,
            start_time: Instant::now(),
            api_duration: Duration::from_secs(0),
            provider,
            model,
        }
    }

    /// Add token usage numbers
    pub fn add_token_usage(&mut self, prompt_tokens: Option<u64>, completion_tokens: Option<u64>) {
        if let Some(pt) = prompt_tokens {
            self.prompt_tokens += pt;
            self.total_tokens += pt;
        }

        if let Some(ct) = completion_tokens {
            self.completion_tokens += ct;
            self.total_tokens += ct;
        }
    }

    /// Fold another run's numbers into this one
    pub fn merge(&mut self, other: &TokenUsageStats) {
        self.add_token_usage(Some(other.prompt_tokens), Some(other.completion_tokens));
        self.requests += other.requests;
        self.cached_requests += other.cached_requests;
        self.api_duration += other.api_duration;
    }

    /// Calculate tokens per minute rate
    pub fn tokens_per_minute(&self) -> f64 {
        // API time when known, wall time otherwise
        let duration_minutes = if self.api_duration.as_secs_f64() > 0.0 {
            self.api_duration.as_secs_f64() / 60.0
        } else {
            self.start_time.elapsed().as_secs_f64() / 60.0
        };

        if duration_minutes > 0.0 {
            self.total_tokens as f64 / duration_minutes
        } else {
            0.0
        }
    }

    /// Generate a summary of token usage
    pub fn summary(&self) -> String {
        let elapsed = self.start_time.elapsed();
        let elapsed_minutes = elapsed.as_secs_f64() / 60.0;
        let api_minutes = self.api_duration.as_secs_f64() / 60.0;

        format!(
            "Token Usage Summary:\n\
             Provider: {}\n\
             Model: {}\n\
             Backend requests: {} ({} from cache)\n\
             Prompt tokens: {}\n\
             Completion tokens: {}\n\
             Total tokens: {}\n\
             Elapsed time: {:.2} minutes\n\
             API request time: {:.2} minutes\n\
             Tokens per minute: {:.2}",
            self.provider,
            self.model,
            self.requests,
            self.cached_requests,
            self.prompt_tokens,
            self.completion_tokens,
            self.total_tokens,
            elapsed_minutes,
            api_minutes,
            self.tokens_per_minute()
        )
    }
}

/// Result of translating one document
#[derive(Debug, Clone)]
pub struct DocumentTranslation {
    /// Detected dialect
    pub version: XliffVersion,
    /// The translated document
    pub content: String,
    /// Number of clusters the document was split into
    pub clusters: usize,
    /// Token usage of this document
    pub usage: TokenUsageStats,
}

/// Normalize an endpoint into a base URL, adding `http://` when no scheme is given
pub fn normalize_endpoint(endpoint: &str) -> Result<String> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err(anyhow!("Endpoint cannot be empty"));
    }

    let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Url::parse(endpoint)?
    } else {
        Url::parse(&format!("http://{}", endpoint))?
    };

    if url.host_str().is_none() {
        return Err(anyhow!("Invalid host in endpoint: {}", endpoint));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Build the backend client selected in the configuration
pub fn build_provider(config: &TranslationConfig) -> Result<Arc<dyn Provider>> {
    let endpoint = normalize_endpoint(&config.get_endpoint())
        .with_context(|| format!("Invalid {} endpoint", config.provider.display_name()))?;
    let model = config.get_model();
    let api_key = config.get_api_key();
    let timeout_secs = config.get_timeout_secs();
    let temperature = config.common.temperature;
    let policy = RetryPolicy {
        max_retries: config.common.retry_count,
        backoff_base_ms: config.common.retry_backoff_ms,
        rate_limit: config.get_rate_limit(),
    };

    let provider: Arc<dyn Provider> = match config.provider {
        TranslationProvider::Ollama => {
            Arc::new(Ollama::new_with_config(endpoint, model, temperature, timeout_secs, policy))
        }
        TranslationProvider::OpenAI => {
            Arc::new(OpenAI::new_with_config(api_key, endpoint, model, temperature, timeout_secs, policy))
        }
        TranslationProvider::Anthropic => {
            Arc::new(Anthropic::new_with_config(api_key, endpoint, model, temperature, timeout_secs, policy))
        }
        TranslationProvider::LMStudio => {
            // LM Studio ignores the key but some builds require the header
            let api_key = if api_key.is_empty() { "lm-studio".to_string() } else { api_key };
            Arc::new(
                OpenAI::new_with_config(api_key, endpoint, model, temperature, timeout_secs, policy)
                    .with_display_name("LM Studio"),
            )
        }
    };

    Ok(provider)
}

/// Build the string cache described by the configuration
pub fn build_cache(config: &CacheConfig) -> Result<StringCache> {
    if !config.persistent {
        return Ok(StringCache::new(config.enabled));
    }

    let repository = match &config.path {
        Some(path) => Repository::new(crate::database::DatabaseConnection::new(path)?),
        None => Repository::new_default()?,
    };
    Ok(StringCache::with_store(config.enabled, repository))
}

/// Translation service for XLIFF documents
pub struct TranslationService {
    /// Backend client
    provider: Arc<dyn Provider>,

    /// Response cache
    cache: StringCache,

    /// User prompt template
    prompt: PromptTemplate,

    /// System prompt template with a {language} placeholder
    system_prompt: String,

    /// Upper bound for `header + cluster + footer`
    max_cluster_bytes: usize,
}

impl TranslationService {
    /// Create a new translation service from the application configuration
    pub fn new(config: &Config) -> Result<Self> {
        let provider = build_provider(&config.translation)?;
        let cache = build_cache(&config.cache)?;

        Ok(Self::with_provider(provider, cache, config.xliff.max_cluster_bytes)
            .with_prompt(PromptTemplate::new(&config.translation.common.prompt_template))
            .with_system_prompt(&config.translation.common.system_prompt))
    }

    /// Create a service around an existing backend and cache
    pub fn with_provider(provider: Arc<dyn Provider>, cache: StringCache, max_cluster_bytes: usize) -> Self {
        Self {
            provider,
            cache,
            prompt: PromptTemplate::default(),
            system_prompt: PromptTemplate::SYSTEM_PROMPT.to_string(),
            max_cluster_bytes: max_cluster_bytes.max(1),
        }
    }

    /// Replace the user prompt template
    pub fn with_prompt(mut self, prompt: PromptTemplate) -> Self {
        self.prompt = prompt;
        self
    }

    /// Replace the system prompt template
    pub fn with_system_prompt(mut self, system_prompt: &str) -> Self {
        self.system_prompt = system_prompt.to_string();
        self
    }

    /// The string cache
    pub fn cache(&self) -> &StringCache {
        &self.cache
    }

    /// Mutable access to the string cache, to bypass or re-enable it
    pub fn cache_mut(&mut self) -> &mut StringCache {
        &mut self.cache
    }

    /// The backend client
    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// Configured cluster size limit
    pub fn max_cluster_bytes(&self) -> usize {
        self.max_cluster_bytes
    }

    /// Test the connection to the backend
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        self.provider.test_connection().await
    }

    /// Translate a whole document into `language`.
    ///
    /// Clusters are translated one after the other. For 2.0 documents a given
    /// `locale` is declared as `trgLang` on the root element.
    pub async fn translate_document(
        &self,
        content: &str,
        language: &str,
        locale: Option<&str>,
        progress: Option<&ProgressBar>,
    ) -> Result<DocumentTranslation, TranslationError> {
        let split = SplitDocument::parse(content)?;
        let clusters = split.clusters(self.max_cluster_bytes);
        let mut usage = TokenUsageStats::with_provider_info(
            self.provider.name().to_string(),
            self.provider.model().to_string(),
        );

        info!(
            "XLIFF {} document: {} units in {} clusters, translating into {}",
            split.version, split.units.len(), clusters.len(), language
        );
        if let Some(pb) = progress {
            pb.set_length(clusters.len() as u64);
            pb.set_position(0);
        }

        let mut bodies = Vec::with_capacity(clusters.len());
        for cluster in &clusters {
            debug!("Cluster {}: {} units, {} bytes", cluster.index, cluster.units.len(), cluster.wrapped_len());

            let translated = self
                .translate_fragment(&cluster.fragment(), split.version, language, &mut usage)
                .await
                .map_err(|e| e.in_cluster(cluster.index))?;
            bodies.push(xliff::extract_cluster_body(cluster, &translated)?);

            if let Some(pb) = progress {
                pb.inc(1);
            }
        }

        let content = xliff::assemble(split.version, &split.header, &bodies, &split.footer, locale);
        Ok(DocumentTranslation {
            version: split.version,
            content,
            clusters: clusters.len(),
            usage,
        })
    }

    /// Translate one standalone document or cluster fragment.
    ///
    /// Every segment container gets a target mirroring its source, filled
    /// from a single backend request covering the whole fragment.
    pub async fn translate_fragment(
        &self,
        fragment: &str,
        version: XliffVersion,
        language: &str,
        usage: &mut TokenUsageStats,
    ) -> Result<String, TranslationError> {
        let mut document = xliff::parse(fragment)?;
        let root = document
            .root_mut()
            .ok_or_else(|| XliffError::Structure("document has no root element".to_string()))?;

        let texts: Vec<String> = segments::sources(root, version)
            .into_iter()
            .flat_map(extract_texts)
            .collect();
        let request = TranslationRequest::from_texts(&texts);

        let map = if request.is_empty() {
            debug!("No translatable text in fragment, skipping backend");
            TranslationMap::default()
        } else {
            request.check_framing()?;
            let response = self.fetch_response(language, &request, usage).await?;
            request.parse_response(&response)?
        };
        let replacements = map.apply(&texts)?;

        let mut cursor = 0;
        let written = segments::write_targets(root, version, |source| {
            reinsert(source, &replacements, &mut cursor)
        })?;
        ensure_consumed(cursor, replacements.len())?;
        debug!("Wrote {} targets from {} unique strings", written, request.len());

        Ok(document.to_xml())
    }

    /// Get the backend response for a request, through the string cache
    async fn fetch_response(
        &self,
        language: &str,
        request: &TranslationRequest,
        usage: &mut TokenUsageStats,
    ) -> Result<String, TranslationError> {
        let prompt = self.prompt.render(language, request);

        if let Some(cached) = self.cache.get(language, &prompt).await? {
            usage.cached_requests += 1;
            return Ok(cached);
        }

        let completion_request = CompletionRequest::new(prompt.clone(), language)
            .system(PromptTemplate::system_prompt(&self.system_prompt, language));

        let started = Instant::now();
        let completion = self.provider.complete(completion_request).await?;
        usage.api_duration += started.elapsed();
        usage.requests += 1;
        usage.add_token_usage(completion.input_tokens, completion.output_tokens);

        self.cache.put(language, &prompt, &completion.text).await?;
        Ok(completion.text)
    }
}
