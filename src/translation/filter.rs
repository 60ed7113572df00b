/*!
 * Decides which text fragments are worth sending to the backend.
 */

/// Whether a text fragment should be translated.
///
/// Single characters and placeholder codes starting with `%` are copied
/// through untouched.
pub fn is_translatable(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && trimmed.chars().count() > 1 && !trimmed.starts_with('%')
}
