/*!
 * Prompt templates for batched string translation.
 *
 * Templates use two placeholders: `{language}` for the target language name
 * and `{texts}` for the numbered, bracketed listing built by the codec.
 */

use crate::translation::codec::TranslationRequest;

/// Prompt template for batched translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default prompt for translating numbered strings.
    pub const STRING_TRANSLATOR: &'static str = r#"Translate the texts below into {language}.

Each text is on its own line, preceded by its number and enclosed in double square brackets.
Answer with exactly one line per text, in the same order, keeping the number and the double
square brackets, like this:
1 [[translated text]]

Rules:
- Translate only what is inside the brackets
- Keep placeholders, codes and punctuation as they are
- Do not merge, split, skip or add entries
- Do not add explanations or any other text

{texts}"#;

    /// System prompt sent along with every request
    pub const SYSTEM_PROMPT: &'static str = "You are a professional translator of technical and educational documents. You translate into {language} and follow the requested output format exactly.";

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default string translator template.
    pub fn string_translator() -> Self {
        Self::new(Self::STRING_TRANSLATOR)
    }

    /// The raw template text
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Render the template for a target language and a set of strings.
    pub fn render(&self, language: &str, request: &TranslationRequest) -> String {
        self.template
            .replace("{language}", language)
            .replace("{texts}", &request.render_entries())
    }

    /// Render a system prompt template for a target language.
    pub fn system_prompt(template: &str, language: &str) -> String {
        template.replace("{language}", language)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::string_translator()
    }
}
