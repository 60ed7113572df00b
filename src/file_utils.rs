use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

/// Extensions recognized as XLIFF documents
pub const XLIFF_EXTENSIONS: &[&str] = &["xlf", "xliff"];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Output path for a translated document, next to the input
    // @params: input_file, target_language, extension
    pub fn generate_output_path<P: AsRef<Path>>(
        input_file: P,
        target_language: &str,
        extension: &str,
    ) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default().to_string_lossy();
        let extension = extension.trim_start_matches('.');

        let output_filename = format!("{} {}.{}", stem, target_language, extension);
        match input_file.parent() {
            Some(parent) => parent.join(output_filename),
            None => PathBuf::from(output_filename),
        }
    }

    // @checks: Whether a path looks like our own output for one of the languages
    pub fn is_translated_output<P: AsRef<Path>, S: AsRef<str>>(path: P, languages: &[S]) -> bool {
        let stem = path.as_ref().file_stem().unwrap_or_default().to_string_lossy().to_string();
        languages
            .iter()
            .any(|language| stem.ends_with(&format!(" {}", language.as_ref())))
    }

    // @checks: XLIFF extension, case-insensitive
    pub fn is_xliff_file<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy();
                XLIFF_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known))
            })
            .unwrap_or(false)
    }

    /// Find XLIFF files in a directory, recursively and in sorted order
    pub fn find_xliff_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && Self::is_xliff_file(path) {
                result.push(path.to_path_buf());
            }
        }

        Ok(result)
    }

    /// Expand a list of files and directories into the XLIFF files to process
    pub fn collect_inputs<P: AsRef<Path>>(inputs: &[P]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for input in inputs {
            let input = input.as_ref();
            if Self::dir_exists(input) {
                files.extend(Self::find_xliff_files(input)?);
            } else if Self::file_exists(input) {
                files.push(input.to_path_buf());
            } else {
                return Err(anyhow::anyhow!("Input does not exist: {:?}", input));
            }
        }

        let mut seen = std::collections::HashSet::new();
        files.retain(|file| seen.insert(file.clone()));
        Ok(files)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
