use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::default::Default;
use std::path::Path;
use log::info;

use crate::language_utils::LanguageTable;
use crate::translation::prompts::PromptTemplate;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Target language names, as used in prompts and output file names
    #[serde(default = "default_target_languages")]
    pub target_languages: Vec<String>,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// XLIFF handling config
    #[serde(default)]
    pub xliff: XliffConfig,

    /// String cache config
    #[serde(default)]
    pub cache: CacheConfig,

    /// Language name to locale code, used for the 2.0 target-language declaration
    #[serde(default = "default_language_codes")]
    pub language_codes: BTreeMap<String, String>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Ollama
    #[default]
    Ollama,
    // @provider: OpenAI
    OpenAI,
    // @provider: Anthropic
    Anthropic,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }

    // @returns: Whether requests need an API key
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI | Self::Anthropic)
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Rate limit (requests per minute)
    #[serde(default)]
    pub rate_limit: Option<u32>,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model: default_model(provider_type),
            api_key: String::new(),
            endpoint: default_endpoint(provider_type),
            timeout_secs: match provider_type {
                TranslationProvider::Anthropic => default_anthropic_timeout_secs(),
                _ => default_timeout_secs(),
            },
            rate_limit: default_rate_limit(provider_type),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Prompt template with {language} and {texts} placeholders
    #[serde(default = "default_prompt_template")]
    pub prompt_template: String,

    /// System prompt template with a {language} placeholder
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            prompt_template: default_prompt_template(),
            system_prompt: default_system_prompt(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
        }
    }
}

/// XLIFF splitting and output settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct XliffConfig {
    /// Upper bound in bytes for `header + cluster + footer`
    #[serde(default = "default_max_cluster_bytes")]
    pub max_cluster_bytes: usize,

    /// Extension of the translated document
    #[serde(default = "default_output_extension")]
    pub output_extension: String,

    /// Extension of the pretty-printed copy, empty to skip it
    #[serde(default = "default_pretty_extension")]
    pub pretty_extension: String,
}

impl Default for XliffConfig {
    fn default() -> Self {
        Self {
            max_cluster_bytes: default_max_cluster_bytes(),
            output_extension: default_output_extension(),
            pretty_extension: default_pretty_extension(),
        }
    }
}

/// String cache settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CacheConfig {
    /// Look up and store backend responses
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Keep responses in an SQLite database between runs
    #[serde(default = "default_true")]
    pub persistent: bool,

    /// Database path, the user data directory when absent
    #[serde(default)]
    pub path: Option<String>,

    /// Clear the entries of each target language before it is processed
    #[serde(default)]
    pub clear_on_start: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            persistent: true,
            path: None,
            clear_on_start: false,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// The matching `log` filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_anthropic_timeout_secs() -> u64 {
    60
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // doubled on each retry
}

fn default_temperature() -> f32 {
    0.3
}

fn default_true() -> bool {
    true
}

fn default_max_cluster_bytes() -> usize {
    32768
}

fn default_output_extension() -> String {
    "xlf".to_string()
}

fn default_pretty_extension() -> String {
    "xml".to_string()
}

fn default_target_languages() -> Vec<String> {
    vec!["Duits".to_string()]
}

fn default_prompt_template() -> String {
    PromptTemplate::STRING_TRANSLATOR.to_string()
}

fn default_system_prompt() -> String {
    PromptTemplate::SYSTEM_PROMPT.to_string()
}

fn default_language_codes() -> BTreeMap<String, String> {
    LanguageTable::default().into_map()
}

fn default_endpoint(provider: TranslationProvider) -> String {
    match provider {
        TranslationProvider::Ollama => "http://localhost:11434".to_string(),
        TranslationProvider::OpenAI => "https://api.openai.com/v1".to_string(),
        TranslationProvider::Anthropic => "https://api.anthropic.com".to_string(),
        // LM Studio serves the OpenAI API on port 1234 under /v1
        TranslationProvider::LMStudio => "http://localhost:1234/v1".to_string(),
    }
}

fn default_model(provider: TranslationProvider) -> String {
    match provider {
        TranslationProvider::Ollama => "llama2".to_string(),
        TranslationProvider::OpenAI => "gpt-3.5-turbo".to_string(),
        TranslationProvider::Anthropic => "claude-3-haiku".to_string(),
        // Placeholder; users should set to the loaded model name in LM Studio
        TranslationProvider::LMStudio => "local-model".to_string(),
    }
}

fn default_rate_limit(provider: TranslationProvider) -> Option<u32> {
    match provider {
        TranslationProvider::OpenAI => Some(60),
        // Anthropic allows 50 requests per minute
        TranslationProvider::Anthropic => Some(45),
        TranslationProvider::Ollama | TranslationProvider::LMStudio => None,
    }
}

impl Config {
    /// Load the configuration from a JSON file, creating it with defaults when missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        let config = Config::default();
        config.save(path)?;
        info!("Created default configuration at {}", path.display());
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// The language table built from `language_codes`
    pub fn language_table(&self) -> LanguageTable {
        LanguageTable::from_map(self.language_codes.clone())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.target_languages.is_empty() {
            return Err(anyhow!("At least one target language is required"));
        }
        if let Some(empty) = self.target_languages.iter().find(|l| l.trim().is_empty()) {
            return Err(anyhow!("Invalid target language name: '{}'", empty));
        }

        if self.xliff.max_cluster_bytes == 0 {
            return Err(anyhow!("max_cluster_bytes must be greater than zero"));
        }
        if self.xliff.output_extension.trim().is_empty() {
            return Err(anyhow!("output_extension cannot be empty"));
        }

        self.language_table().validate()?;

        if !self.translation.common.prompt_template.contains("{texts}") {
            return Err(anyhow!("Prompt template must contain the {{texts}} placeholder"));
        }

        let provider = self.translation.provider;
        if provider.requires_api_key() && self.translation.get_api_key().is_empty() {
            return Err(anyhow!("Translation API key is required for {} provider", provider.display_name()));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            target_languages: default_target_languages(),
            translation: TranslationConfig::default(),
            xliff: XliffConfig::default(),
            cache: CacheConfig::default(),
            language_codes: default_language_codes(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &TranslationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get a mutable configuration for a provider, adding a default one when missing
    pub fn provider_config_mut(&mut self, provider_type: TranslationProvider) -> &mut ProviderConfig {
        let provider_str = provider_type.to_lowercase_string();
        let index = match self.available_providers.iter().position(|p| p.provider_type == provider_str) {
            Some(index) => index,
            None => {
                self.available_providers.push(ProviderConfig::new(provider_type));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[index]
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.model.clone())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| default_model(self.provider))
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.endpoint.clone())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| default_endpoint(self.provider))
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .filter(|t| *t > 0)
            .unwrap_or_else(default_timeout_secs)
    }

    /// Get the rate limit for the active provider
    pub fn get_rate_limit(&self) -> Option<u32> {
        match self.get_active_provider_config() {
            Some(provider_config) => provider_config.rate_limit,
            None => default_rate_limit(self.provider),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::Ollama),
                ProviderConfig::new(TranslationProvider::OpenAI),
                ProviderConfig::new(TranslationProvider::Anthropic),
                ProviderConfig::new(TranslationProvider::LMStudio),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
