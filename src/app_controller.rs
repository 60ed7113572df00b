use anyhow::{Result, Context};
use log::{error, warn, info, debug};
use std::path::{Path, PathBuf};
use std::time::Instant;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::language_utils::{locale_language_name, LanguageTable};
use crate::translation::{CacheScope, TokenUsageStats, TranslationService};
use crate::xliff;

// @module: Application controller for batch XLIFF translation

/// What happened to one input file for one language
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Translated and written
    Translated {
        /// Translated document path
        output: PathBuf,
        /// Pretty-printed copy, when configured
        pretty: Option<PathBuf>,
        /// Number of clusters translated
        clusters: usize,
    },
    /// Output already existed and overwriting was not forced
    Skipped {
        /// Existing output path
        output: PathBuf,
    },
}

/// A file that could not be translated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    /// Input path
    pub input: PathBuf,
    /// Target language
    pub language: String,
    /// Error message
    pub message: String,
}

/// Totals of a batch run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Files translated
    pub translated: usize,
    /// Files skipped because the output existed
    pub skipped: usize,
    /// Files that failed
    pub failures: Vec<FileFailure>,
    /// Combined token usage
    pub usage: TokenUsageStats,
}

impl RunSummary {
    /// Whether every file was translated or skipped
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Main application controller for XLIFF translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Translation pipeline
    service: TranslationService,
    // @field: Language name to locale
    languages: LanguageTable,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let service = TranslationService::new(&config)
            .context("Failed to create translation service")?;
        Ok(Self::with_service(config, service))
    }

    // @method: Create a controller around an existing service
    pub fn with_service(config: Config, service: TranslationService) -> Self {
        let languages = config.language_table();
        Self { config, service, languages }
    }

    /// The configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The translation service
    pub fn service(&self) -> &TranslationService {
        &self.service
    }

    /// Mutable access to the translation service
    pub fn service_mut(&mut self) -> &mut TranslationService {
        &mut self.service
    }

    /// Translate every input into every configured target language
    pub async fn run<P: AsRef<Path>>(&self, inputs: &[P], force_overwrite: bool) -> Result<RunSummary> {
        let start_time = Instant::now();
        let languages = &self.config.target_languages;

        let mut files = FileManager::collect_inputs(inputs)?;
        files.retain(|file| {
            let own_output = FileManager::is_translated_output(file, languages);
            if own_output {
                debug!("Ignoring earlier output {:?}", file);
            }
            !own_output
        });

        if files.is_empty() {
            warn!("No XLIFF files found");
            return Ok(RunSummary::default());
        }

        let provider = self.service.provider();
        let mut summary = RunSummary {
            usage: TokenUsageStats::with_provider_info(provider.name().to_string(), provider.model().to_string()),
            ..RunSummary::default()
        };
        let multi_progress = MultiProgress::new();

        info!("xliffai: {} file(s) into {}", files.len(), languages.join(", "));
        let cache = self.service.cache();
        debug!(
            "String cache {}, {}",
            if cache.is_enabled() { "enabled" } else { "disabled" },
            if cache.is_persistent() { "persistent" } else { "in memory" }
        );

        for language in languages {
            if self.config.cache.clear_on_start {
                self.service.cache().clear(&CacheScope::Language(language.clone())).await
                    .with_context(|| format!("Failed to clear string cache for {}", language))?;
                info!("Cleared string cache for {}", language);
            }

            for input in &files {
                let file_name = input.file_name().unwrap_or_default().to_string_lossy().to_string();
                match self.translate_file(input, language, force_overwrite, &multi_progress, &mut summary.usage).await {
                    Ok(FileOutcome::Translated { output, .. }) => {
                        summary.translated += 1;
                        info!("Success: {}", output.display());
                    }
                    Ok(FileOutcome::Skipped { output }) => {
                        summary.skipped += 1;
                        warn!("Skipping {}, translation already exists (use -f to force overwrite): {}", file_name, output.display());
                    }
                    Err(e) => {
                        error!("Error processing file {} ({}): {:#}", file_name, language, e);
                        summary.failures.push(FileFailure {
                            input: input.clone(),
                            language: language.clone(),
                            message: format!("{:#}", e),
                        });
                    }
                }
            }
        }

        let (hits, misses, rate) = self.service.cache().stats();
        info!(
            "Done in {:.1}s: {} translated, {} skipped, {} failed; cache {} hits / {} misses ({:.0}%)",
            start_time.elapsed().as_secs_f64(),
            summary.translated,
            summary.skipped,
            summary.failures.len(),
            hits,
            misses,
            rate * 100.0
        );
        if summary.usage.requests > 0 {
            info!("{}", summary.usage.summary());
        }

        Ok(summary)
    }

    /// Translate one file into one language and write the outputs next to it
    pub async fn translate_file(
        &self,
        input: &Path,
        language: &str,
        force_overwrite: bool,
        multi_progress: &MultiProgress,
        usage: &mut TokenUsageStats,
    ) -> Result<FileOutcome> {
        let output = FileManager::generate_output_path(input, language, &self.config.xliff.output_extension);
        if output.exists() && !force_overwrite {
            return Ok(FileOutcome::Skipped { output });
        }

        let started = Instant::now();
        let content = FileManager::read_to_string(input)?;
        let locale = self.languages.locale_for(language);
        match locale {
            Some(code) => debug!(
                "{} uses locale {} ({})",
                language,
                code,
                locale_language_name(code).unwrap_or("unknown language")
            ),
            None => debug!(
                "No locale code configured for {}, known: {}",
                language,
                self.languages.language_names().collect::<Vec<_>>().join(", ")
            ),
        }

        let progress_bar = multi_progress.add(ProgressBar::new(0));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} clusters ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message(format!("{} → {}", input.file_name().unwrap_or_default().to_string_lossy(), language));

        let result = self.service
            .translate_document(&content, language, locale, Some(&progress_bar))
            .await;
        progress_bar.finish_and_clear();
        let translation = result.with_context(|| format!("Failed to translate {:?} into {}", input, language))?;

        FileManager::write_to_file(&output, &translation.content)?;

        let pretty = if self.config.xliff.pretty_extension.trim().is_empty() {
            None
        } else {
            let pretty_path = FileManager::generate_output_path(input, language, &self.config.xliff.pretty_extension);
            let pretty_content = xliff::pretty_print(&translation.content)
                .with_context(|| format!("Failed to pretty-print {:?}", output))?;
            FileManager::write_to_file(&pretty_path, &pretty_content)?;
            Some(pretty_path)
        };

        info!(
            "Translated {:?} (XLIFF {}) into {} in {:.1}s, {} cluster(s)",
            input.file_name().unwrap_or_default(),
            translation.version,
            language,
            started.elapsed().as_secs_f64(),
            translation.clusters
        );
        usage.merge(&translation.usage);

        Ok(FileOutcome::Translated {
            output,
            pretty,
            clusters: translation.clusters,
        })
    }
}
