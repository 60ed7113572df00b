/*!
 * Tests for configuration, language table and file handling
 */

use std::collections::BTreeMap;
use std::str::FromStr;

use xliffai::app_config::{Config, TranslationProvider};
use xliffai::file_utils::FileManager;
use xliffai::language_utils::{validate_locale, LanguageTable};
use crate::common;

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path).unwrap();

    assert!(path.exists());
    assert_eq!(config.target_languages, vec!["Duits"]);
    assert_eq!(config.xliff.max_cluster_bytes, 32768);
    assert_eq!(config.translation.provider, TranslationProvider::Ollama);
    assert!(config.validate().is_ok());
}

#[test]
fn test_loadOrCreate_withPartialFile_shouldFillDefaults() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{"target_languages": ["Frans", "Pools"], "xliff": {"max_cluster_bytes": 2000}}"#,
    )
    .unwrap();

    let config = Config::load_or_create(&path).unwrap();

    assert_eq!(config.target_languages, vec!["Frans", "Pools"]);
    assert_eq!(config.xliff.max_cluster_bytes, 2000);
    assert_eq!(config.xliff.output_extension, "xlf");
    assert!(config.cache.enabled);
    assert_eq!(config.language_table().locale_for("Pools"), Some("pl-PL"));
}

#[test]
fn test_save_withChangedValues_shouldReloadEqual() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("conf.json");
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::LMStudio;
    config.translation.provider_config_mut(TranslationProvider::LMStudio).model = "qwen2.5-7b".to_string();
    config.cache.persistent = false;

    config.save(&path).unwrap();
    let loaded = Config::load_or_create(&path).unwrap();

    assert_eq!(loaded.translation.provider, TranslationProvider::LMStudio);
    assert_eq!(loaded.translation.get_model(), "qwen2.5-7b");
    assert_eq!(loaded.translation.get_endpoint(), "http://localhost:1234/v1");
    assert!(!loaded.cache.persistent);
}

#[test]
fn test_validate_withInvalidSettings_shouldFail() {
    let mut config = Config::default();
    config.target_languages.clear();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.xliff.max_cluster_bytes = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.translation.common.prompt_template = "Translate into {language}".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.language_codes.insert("Klingon".to_string(), "tlh-XX-extra".to_string());
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withKeyedProviderWithoutKey_shouldFail() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Anthropic;
    assert!(config.validate().is_err());

    config.translation.provider_config_mut(TranslationProvider::Anthropic).api_key = "sk-test".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_translationProvider_fromStr_shouldRoundTripDisplay() {
    for provider in [
        TranslationProvider::Ollama,
        TranslationProvider::OpenAI,
        TranslationProvider::Anthropic,
        TranslationProvider::LMStudio,
    ] {
        assert_eq!(TranslationProvider::from_str(&provider.to_string()).unwrap(), provider);
    }
    assert!(TranslationProvider::from_str("gemini").is_err());
}

#[test]
fn test_languageTable_withCustomMap_shouldResolveCaseInsensitively() {
    let mut codes = BTreeMap::new();
    codes.insert("Nederlands".to_string(), "nl-NL".to_string());
    codes.insert("Latijns-Amerikaans Spaans".to_string(), "es-419".to_string());
    let table = LanguageTable::from_map(codes);

    assert_eq!(table.locale_for("nederlands"), Some("nl-NL"));
    assert_eq!(table.locale_for(" Latijns-Amerikaans Spaans "), Some("es-419"));
    assert_eq!(table.locale_for("Duits"), None);
    assert!(table.validate().is_ok());
}

#[test]
fn test_validateLocale_withMalformedCodes_shouldFail() {
    assert!(validate_locale("de-DE").is_ok());
    assert!(validate_locale("pt").is_ok());
    assert!(validate_locale("xx-DE").is_err());
    assert!(validate_locale("de-Deutschland").is_err());
    assert!(validate_locale("").is_err());
}

#[test]
fn test_generateOutputPath_shouldAppendLanguageToStem() {
    let output = FileManager::generate_output_path("docs/manual.xlf", "Duits", "xml");
    assert_eq!(output, std::path::PathBuf::from("docs/manual Duits.xml"));

    assert!(FileManager::is_translated_output(&output, &["Frans", "Duits"]));
    assert!(!FileManager::is_translated_output("docs/manual.xlf", &["Duits"]));
}

#[test]
fn test_collectInputs_withDirectoryAndFile_shouldFindXliffOnce() {
    let temp_dir = common::create_temp_dir().unwrap();
    let nested = temp_dir.path().join("nested");
    FileManager::ensure_dir(&nested).unwrap();
    let a = common::create_test_file(temp_dir.path(), "a.xlf", "<xliff/>").unwrap();
    let b = common::create_test_file(&nested, "b.XLIFF", "<xliff/>").unwrap();
    common::create_test_file(temp_dir.path(), "notes.txt", "ignored").unwrap();

    let files = FileManager::collect_inputs(&[temp_dir.path().to_path_buf(), a.clone()]).unwrap();

    assert_eq!(files, vec![a, b]);
}

#[test]
fn test_collectInputs_withMissingPath_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let missing = temp_dir.path().join("missing.xlf");
    assert!(FileManager::collect_inputs(&[missing]).is_err());
}
