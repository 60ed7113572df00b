/*!
 * Request building and response parsing for batched translations.
 *
 * Unique translatable strings are numbered from 1 and wrapped in double
 * brackets, one per line:
 *
 * ```text
 * 1 [[Open the door]]
 * 2 [[Close the window]]
 * ```
 *
 * The backend is expected to answer in the same shape. Entries are matched
 * back by their number when every entry carries one, positionally otherwise,
 * and the count must always match.
 */

use std::collections::{HashMap, HashSet};

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::TranslationError;
use super::filter::is_translatable;

/// Optional entry number followed by a bracketed text that closes at a line end
static ENTRY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)(?:(\d+)[ \t]*[.:)\-]?[ \t]*)?\[\[(.*?)\]\][ \t]*(?:\r?\n|\z)")
        .expect("Invalid entry regex")
});

/// Closing brackets at a line end, which would end an entry early
static LINE_END_CLOSE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\]\][ \t]*\r?\n").expect("Invalid line end regex")
});

/// Unique translatable strings of one cluster
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationRequest {
    entries: Vec<String>,
}

impl TranslationRequest {
    /// Deduplicate the translatable texts, keeping first-occurrence order
    pub fn from_texts<S: AsRef<str>>(texts: &[S]) -> Self {
        let mut seen = HashSet::new();
        let entries = texts
            .iter()
            .map(|text| text.as_ref().trim())
            .filter(|text| is_translatable(text))
            .filter(|text| seen.insert(*text))
            .map(str::to_string)
            .collect();
        Self { entries }
    }

    /// The unique strings in request order
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of unique strings
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there is nothing to translate
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Numbered, bracketed listing for the prompt
    pub fn render_entries(&self) -> String {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, text)| format!("{} [[{}]]", i + 1, text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Fail for an entry the response framing cannot carry.
    ///
    /// An entry closes at `]]` followed by a line end, so a text with such a
    /// sequence inside would be cut short.
    pub fn check_framing(&self) -> Result<(), TranslationError> {
        match self.entries.iter().find(|text| LINE_END_CLOSE_REGEX.is_match(text)) {
            Some(text) => Err(TranslationError::UnframeableEntry(text.clone())),
            None => Ok(()),
        }
    }

    /// Match a backend response against this request
    pub fn parse_response(&self, response: &str) -> Result<TranslationMap, TranslationError> {
        let parsed: Vec<(Option<usize>, String)> = ENTRY_REGEX
            .captures_iter(response)
            .map(|caps| {
                let index = caps.get(1).and_then(|m| m.as_str().parse::<usize>().ok());
                let text = caps.get(2).map(|m| m.as_str().trim().to_string()).unwrap_or_default();
                (index, text)
            })
            .collect();

        if parsed.len() != self.entries.len() {
            return Err(TranslationError::ResponseCountMismatch {
                expected: self.entries.len(),
                found: parsed.len(),
            });
        }

        let mut translations = HashMap::with_capacity(parsed.len());
        let numbered = !parsed.is_empty() && parsed.iter().all(|(index, _)| index.is_some());

        if numbered {
            let mut used = vec![false; self.entries.len()];
            for (index, text) in parsed {
                let index = index.unwrap_or_default();
                let slot = index
                    .checked_sub(1)
                    .filter(|slot| *slot < used.len() && !used[*slot])
                    .ok_or(TranslationError::ResponseIndexMismatch {
                        index,
                        expected: self.entries.len(),
                    })?;
                used[slot] = true;
                translations.insert(self.entries[slot].clone(), text);
            }
        } else {
            debug!("Response entries carry no numbering, matching {} entries by position", parsed.len());
            for (source, (_, text)) in self.entries.iter().zip(parsed) {
                translations.insert(source.clone(), text);
            }
        }

        Ok(TranslationMap { translations })
    }
}

/// Source string to translated string, scoped to one cluster
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationMap {
    translations: HashMap<String, String>,
}

impl TranslationMap {
    /// Build a map from explicit pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            translations: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Translation of a source string
    pub fn get(&self, source: &str) -> Option<&str> {
        self.translations.get(source.trim()).map(String::as_str)
    }

    /// Number of translated strings
    pub fn len(&self) -> usize {
        self.translations.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.translations.is_empty()
    }

    /// Replacement list for extracted texts, one per text position.
    ///
    /// Texts the filter rejects are passed through unchanged.
    pub fn apply<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<String>, TranslationError> {
        texts
            .iter()
            .map(|text| {
                let text = text.as_ref();
                if !is_translatable(text) {
                    return Ok(text.to_string());
                }
                self.get(text)
                    .map(str::to_string)
                    .ok_or_else(|| TranslationError::MissingTranslation(text.to_string()))
            })
            .collect()
    }
}
