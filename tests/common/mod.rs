/*!
 * Common test utilities for the xliffai test suite
 */

use std::path::{Path, PathBuf};
use std::fs;
use std::sync::Arc;
use anyhow::Result;
use regex::Regex;
use tempfile::TempDir;

use xliffai::providers::MockProvider;
use xliffai::translation::{StringCache, TranslationService};

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// An XLIFF 1.2 document with one trans-unit per source
pub fn xliff12_document(sources: &[&str]) -> String {
    let mut units = String::new();
    for (i, source) in sources.iter().enumerate() {
        units.push_str(&format!(
            "\n      <trans-unit id=\"{}\">\n        <source>{}</source>\n      </trans-unit>",
            i + 1,
            source
        ));
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <xliff version=\"1.2\" xmlns=\"urn:oasis:names:tc:xliff:document:1.2\">\n  \
         <file original=\"manual.docx\" source-language=\"nl\" datatype=\"plaintext\">\n    \
         <body>{}\n    </body>\n  </file>\n</xliff>\n",
        units
    )
}

/// An XLIFF 2.0 document with one unit holding one segment per source
pub fn xliff20_document(sources: &[&str]) -> String {
    let mut units = String::new();
    for (i, source) in sources.iter().enumerate() {
        units.push_str(&format!(
            "\n    <unit id=\"u{}\">\n      <segment>\n        <source>{}</source>\n      </segment>\n    </unit>",
            i + 1,
            source
        ));
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <xliff xmlns=\"urn:oasis:names:tc:xliff:document:2.0\" version=\"2.0\" srcLang=\"nl\">\n  \
         <file id=\"f1\">{}\n  </file>\n</xliff>\n",
        units
    )
}

/// Inner markup of every target element, in document order
pub fn targets(content: &str) -> Vec<String> {
    let re = Regex::new(r"(?s)<target(?:\s[^>]*)?>(.*?)</target>").expect("Invalid target regex");
    re.captures_iter(content).map(|caps| caps[1].to_string()).collect()
}

/// A translation service around a mock backend with a memory-only cache
pub fn mock_service(mock: &MockProvider, max_cluster_bytes: usize) -> TranslationService {
    TranslationService::with_provider(Arc::new(mock.clone()), StringCache::new(true), max_cluster_bytes)
}

/// Answer every entry with its text in upper case
pub fn uppercase_response(request: &xliffai::providers::CompletionRequest) -> String {
    MockProvider::prompt_entries(&request.prompt)
        .iter()
        .enumerate()
        .map(|(i, text)| format!("{} [[{}]]", i + 1, text.to_uppercase()))
        .collect::<Vec<_>>()
        .join("\n")
}
