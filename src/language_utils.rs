use anyhow::{Result, anyhow};
use isolang::Language;
use std::collections::BTreeMap;

/// Language utilities for target-language names and locale codes
///
/// Target languages are named the way they appear in prompts and output file
/// names ("Duits", "German"). The table maps those names to the locale code
/// declared in translated 2.0 documents ("de-DE").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageTable {
    codes: BTreeMap<String, String>,
}

const DEFAULT_LANGUAGES: &[(&str, &str)] = &[
    ("Bulgaars", "bg-BG"),
    ("Duits", "de-DE"),
    ("Engels", "en-GB"),
    ("Frans", "fr-FR"),
    ("Grieks", "el-GR"),
    ("Italiaans", "it-IT"),
    ("Oekraïens", "uk-UA"),
    ("Pools", "pl-PL"),
    ("Portugees", "pt-PT"),
    ("Roemeens", "ro-RO"),
    ("Russisch", "ru-RU"),
    ("Spaans", "es-ES"),
    ("Bulgarian", "bg-BG"),
    ("German", "de-DE"),
    ("English", "en-GB"),
    ("French", "fr-FR"),
    ("Greek", "el-GR"),
    ("Italian", "it-IT"),
    ("Ukrainian", "uk-UA"),
    ("Polish", "pl-PL"),
    ("Portuguese", "pt-PT"),
    ("Romanian", "ro-RO"),
    ("Russian", "ru-RU"),
    ("Spanish", "es-ES"),
];

impl Default for LanguageTable {
    fn default() -> Self {
        Self::from_map(
            DEFAULT_LANGUAGES
                .iter()
                .map(|(name, code)| (name.to_string(), code.to_string()))
                .collect(),
        )
    }
}

impl LanguageTable {
    /// Create a table from name to locale pairs
    pub fn from_map(codes: BTreeMap<String, String>) -> Self {
        Self { codes }
    }

    /// The underlying name to locale map
    pub fn into_map(self) -> BTreeMap<String, String> {
        self.codes
    }

    /// Locale code for a language name, matched case-insensitively
    pub fn locale_for(&self, language: &str) -> Option<&str> {
        let wanted = language.trim();
        self.codes
            .get(wanted)
            .or_else(|| {
                self.codes
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
                    .map(|(_, code)| code)
            })
            .map(String::as_str)
    }

    /// Known language names
    pub fn language_names(&self) -> impl Iterator<Item = &str> {
        self.codes.keys().map(String::as_str)
    }

    /// Check every locale code in the table
    pub fn validate(&self) -> Result<()> {
        for (name, code) in &self.codes {
            validate_locale(code).map_err(|e| anyhow!("Language '{}': {}", name, e))?;
        }
        Ok(())
    }
}

/// Validate a locale code such as `de-DE`, `pt` or `es-419`
///
/// The primary subtag must be an ISO 639-1 or ISO 639-3 code; a region, when
/// present, must be two letters or three digits.
pub fn validate_locale(code: &str) -> Result<()> {
    let mut parts = code.trim().split(['-', '_']);
    let primary = parts.next().unwrap_or_default().to_lowercase();

    let known = match primary.len() {
        2 => Language::from_639_1(&primary).is_some(),
        3 => Language::from_639_3(&primary).is_some(),
        _ => false,
    };
    if !known {
        return Err(anyhow!("Invalid locale code: {}", code));
    }

    if let Some(region) = parts.next() {
        let valid_region = (region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic()))
            || (region.len() == 3 && region.chars().all(|c| c.is_ascii_digit()));
        if !valid_region {
            return Err(anyhow!("Invalid region in locale code: {}", code));
        }
    }

    if parts.next().is_some() {
        return Err(anyhow!("Unsupported locale code: {}", code));
    }

    Ok(())
}

/// English name of the language of a locale code
pub fn locale_language_name(code: &str) -> Option<&'static str> {
    let primary = code.split(['-', '_']).next()?.to_lowercase();
    let language = match primary.len() {
        2 => Language::from_639_1(&primary),
        3 => Language::from_639_3(&primary),
        _ => None,
    }?;
    Some(language.to_name())
}
