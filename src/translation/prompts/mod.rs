/*!
 * Prompt construction for batched string translation.
 */

pub mod templates;

// Re-export main types
pub use templates::PromptTemplate;
