/*!
 * Translation of XLIFF text through generative backends.
 *
 * - `core`: the translation service driving documents through the pipeline
 * - `extract`: text extraction and structural reinsertion
 * - `filter`: which texts are worth sending
 * - `codec`: deduplicated requests and response matching
 * - `cache`: string cache for backend responses
 * - `prompts`: prompt templates
 */

// Re-export main types for easier usage
pub use self::cache::{CacheScope, StringCache};
pub use self::codec::{TranslationMap, TranslationRequest};
pub use self::core::{DocumentTranslation, TokenUsageStats, TranslationService};
pub use self::filter::is_translatable;
pub use self::prompts::PromptTemplate;

// Submodules
pub mod cache;
pub mod codec;
pub mod core;
pub mod extract;
pub mod filter;
pub mod prompts;
