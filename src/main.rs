// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use xliffai::app_config::{self, Config, TranslationProvider};
use xliffai::app_controller::Controller;
use xliffai::database::{DatabaseConnection, Repository};
use xliffai::translation::core::build_cache;
use xliffai::translation::CacheScope;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Ollama,
    OpenAI,
    Anthropic,
    LMStudio,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::LMStudio => TranslationProvider::LMStudio,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate XLIFF documents (default command)
    Translate(TranslateArgs),

    /// Inspect or clear the string cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,

        /// Configuration file path
        #[arg(short, long, default_value = "conf.json")]
        config_path: String,
    },

    /// Generate shell completions for xliffai
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Show the number of stored responses and hits
    Stats {
        /// Also count the responses stored for this target language
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Remove stored responses
    Clear {
        /// Only clear the responses for this target language
        #[arg(short, long)]
        language: Option<String>,
    },
}

#[derive(Args, Debug, Clone, Default)]
struct TranslateArgs {
    /// Input XLIFF files or directories to process
    #[arg(value_name = "INPUT_PATH")]
    inputs: Vec<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Provider endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Provider API key
    #[arg(long, env = "XLIFFAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Target language name, repeatable (e.g., 'Duits', 'French')
    #[arg(short, long = "target-language")]
    target_languages: Vec<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Maximum size in bytes of a translated fragment
    #[arg(long)]
    max_cluster_bytes: Option<usize>,

    /// Neither read nor write the string cache
    #[arg(long)]
    no_cache: bool,

    /// Clear the string cache of each target language before translating
    #[arg(long)]
    clear_cache: bool,

    /// Do not write the pretty-printed copy
    #[arg(long)]
    no_pretty: bool,
}

/// xliffai - XLIFF translation with AI
///
/// Translates XLIFF 1.2 and 2.0 documents with generative AI providers while
/// keeping the inline markup of every segment intact.
#[derive(Parser, Debug)]
#[command(name = "xliffai")]
#[command(version)]
#[command(about = "AI-powered XLIFF translation tool")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "xliffai translates the source segments of XLIFF 1.2 and 2.0 documents using AI providers
and writes '<name> <language>.xlf' plus a pretty-printed '<name> <language>.xml' next to each input.

EXAMPLES:
    xliffai manual.xlf                              # Translate using default config
    xliffai -t Duits -t Frans manual.xlf            # Translate into two languages
    xliffai -f -p openai -m gpt-4 docs/             # Force overwrite, specific provider and model
    xliffai --max-cluster-bytes 16000 big.xlf       # Smaller fragments per request
    xliffai cache clear --language Duits            # Forget cached German responses
    xliffai completions bash > xliffai.bash         # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    ollama    - Local Ollama server
    openai    - OpenAI API (requires API key)
    anthropic - Anthropic Claude API (requires API key)
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    translate: TranslateArgs,
}

// @struct: Custom logger implementation
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the configuration is known
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "xliffai", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Cache { action, config_path }) => run_cache(action, &config_path).await,
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => run_translate(cli.translate).await,
    }
}

/// Load the configuration file and apply command line overrides
fn load_config(options: &TranslateArgs) -> Result<Config> {
    if !Path::new(&options.config_path).exists() {
        warn!("Config file not found at '{}', creating default config.", options.config_path);
    }
    let mut config = Config::load_or_create(&options.config_path)?;

    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }

    let active = config.translation.provider;
    let provider_config = config.translation.provider_config_mut(active);
    if let Some(model) = &options.model {
        provider_config.model = model.clone();
    }
    if let Some(endpoint) = &options.endpoint {
        provider_config.endpoint = endpoint.clone();
    }
    if let Some(api_key) = &options.api_key {
        provider_config.api_key = api_key.clone();
    }

    if !options.target_languages.is_empty() {
        config.target_languages = options.target_languages.clone();
    }
    if let Some(max_cluster_bytes) = options.max_cluster_bytes {
        config.xliff.max_cluster_bytes = max_cluster_bytes;
    }
    if options.no_cache {
        config.cache.enabled = false;
    }
    if options.clear_cache {
        config.cache.clear_on_start = true;
    }
    if options.no_pretty {
        config.xliff.pretty_extension.clear();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    Ok(config)
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    if options.inputs.is_empty() {
        return Err(anyhow!("INPUT_PATH is required when no subcommand is specified"));
    }

    let config = load_config(&options)?;
    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;
    let summary = controller.run(&options.inputs, options.force_overwrite).await?;

    if !summary.is_success() {
        for failure in &summary.failures {
            warn!("Failed: {:?} ({}): {}", failure.input, failure.language, failure.message);
        }
        return Err(anyhow!("{} file(s) could not be translated", summary.failures.len()));
    }

    Ok(())
}

async fn run_cache(action: CacheAction, config_path: &str) -> Result<()> {
    let config = Config::load_or_create(config_path)?;
    if !config.cache.persistent {
        info!("The string cache is not persistent, nothing is stored between runs");
        return Ok(());
    }

    match action {
        CacheAction::Stats { language } => {
            let connection = match &config.cache.path {
                Some(path) => DatabaseConnection::new(path)?,
                None => DatabaseConnection::new_default()?,
            };
            let size = connection.file_size();
            let path = connection.path().to_path_buf();
            let repository = Repository::new(connection);
            let stats = repository.get_cache_stats().await?;
            info!("String cache at {}: {} ({} bytes)", path.display(), stats, size);
            if let Some(language) = language {
                let records = repository.get_language_records(&language).await?;
                let hits: i64 = records.iter().map(|record| record.hit_count).sum();
                info!("{}: {} stored responses, {} hits", language, records.len(), hits);
            }
        }
        CacheAction::Clear { language } => {
            let cache = build_cache(&config.cache)?;
            let scope = match language {
                Some(language) => CacheScope::Language(language),
                None => CacheScope::All,
            };
            cache.clear(&scope).await?;
            info!("String cache cleared ({:?})", scope);
        }
    }

    Ok(())
}
