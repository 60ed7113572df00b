/*!
 * # xliffai - XLIFF translation with AI
 *
 * A Rust library for translating XLIFF localization documents with
 * generative AI backends while keeping their inline markup intact.
 *
 * ## Features
 *
 * - XLIFF 1.2 and 2.0 documents
 * - Size-bounded splitting of large documents into parseable fragments
 * - Deduplicated, numbered translation requests with validated responses
 * - Structure-preserving reinsertion of translated text into `<target>` elements
 * - Translation through various AI providers:
 *   - Ollama (local LLM)
 *   - OpenAI API and LM Studio
 *   - Anthropic API
 * - In-memory and SQLite-backed string cache
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `xliff`: Dialect detection, XML tree, cluster splitting and assembly
 * - `translation`: Extraction, reinsertion, request codec, cache and the service:
 *   - `translation::core`: Translation service driving whole documents
 *   - `translation::extract`: Text extraction and reinsertion
 *   - `translation::codec`: Request building and response matching
 *   - `translation::cache`: String cache for backend responses
 * - `database`: SQLite persistence for the string cache
 * - `providers`: Client implementations for various LLM providers
 * - `app_config`: Configuration management
 * - `app_controller`: Batch processing of files and languages
 * - `file_utils`: File system operations
 * - `language_utils`: Language names and locale codes
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod database;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod translation;
pub mod xliff;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use errors::{ProviderError, TranslationError, XliffError};
pub use language_utils::LanguageTable;
pub use translation::{StringCache, TranslationService};
pub use xliff::XliffVersion;
