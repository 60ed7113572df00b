/*!
 * Batch runs through the controller: output files, skipping and failures
 */

use std::sync::Arc;

use xliffai::app_config::Config;
use xliffai::app_controller::Controller;
use xliffai::providers::MockProvider;
use xliffai::translation::{StringCache, TranslationService};
use crate::common;

fn memory_config(languages: &[&str]) -> Config {
    let mut config = Config::default();
    config.target_languages = languages.iter().map(|l| l.to_string()).collect();
    config.cache.persistent = false;
    config
}

fn controller(mock: &MockProvider, config: Config) -> Controller {
    let service = common::mock_service(mock, config.xliff.max_cluster_bytes);
    Controller::with_service(config, service)
}

#[tokio::test]
async fn test_run_withSingleFile_shouldWriteTranslatedAndPrettyOutputs() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(
        temp_dir.path(),
        "manual.xlf",
        &common::xliff12_document(&["Open the door", "Close the door"]),
    )
    .unwrap();
    let mock = MockProvider::working();
    let controller = controller(&mock, memory_config(&["Duits"]));

    let summary = controller.run(&[input], false).await.unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.translated, 1);
    let output = temp_dir.path().join("manual Duits.xlf");
    let pretty = temp_dir.path().join("manual Duits.xml");
    assert!(output.exists());
    assert!(pretty.exists());

    let translated = std::fs::read_to_string(&output).unwrap();
    assert_eq!(common::targets(&translated), vec!["&lt;Duits&gt; Open the door", "&lt;Duits&gt; Close the door"]);
    let pretty_content = std::fs::read_to_string(&pretty).unwrap();
    assert!(pretty_content.contains("Close the door"));
}

#[tokio::test]
async fn test_run_withSeveralLanguages_shouldWriteOneOutputPerLanguage() {
    let temp_dir = common::create_temp_dir().unwrap();
    let content = common::xliff20_document(&["Good morning"]);
    common::create_test_file(temp_dir.path(), "greeting.xlf", &content).unwrap();
    let mock = MockProvider::working();
    let mut config = memory_config(&["Duits", "Frans"]);
    config.xliff.pretty_extension.clear();
    let controller = controller(&mock, config);

    let summary = controller.run(&[temp_dir.path()], false).await.unwrap();

    assert_eq!(summary.translated, 2);
    assert_eq!(mock.request_count(), 2);
    let french = std::fs::read_to_string(temp_dir.path().join("greeting Frans.xlf")).unwrap();
    assert!(french.contains("trgLang=\"fr-FR\""));
    assert_eq!(common::targets(&french), vec!["&lt;Frans&gt; Good morning"]);
    assert!(!temp_dir.path().join("greeting Duits.xml").exists());
}

#[tokio::test]
async fn test_run_withExistingOutput_shouldSkipUnlessForced() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(
        temp_dir.path(),
        "manual.xlf",
        &common::xliff12_document(&["Open the door"]),
    )
    .unwrap();
    common::create_test_file(temp_dir.path(), "manual Duits.xlf", "old").unwrap();
    let mock = MockProvider::working();
    let controller = controller(&mock, memory_config(&["Duits"]));

    let skipped = controller.run(&[input.clone()], false).await.unwrap();
    assert_eq!((skipped.translated, skipped.skipped), (0, 1));
    assert_eq!(mock.request_count(), 0);

    let forced = controller.run(&[input], true).await.unwrap();
    assert_eq!((forced.translated, forced.skipped), (1, 0));
    let output = std::fs::read_to_string(temp_dir.path().join("manual Duits.xlf")).unwrap();
    assert_eq!(common::targets(&output), vec!["&lt;Duits&gt; Open the door"]);
}

#[tokio::test]
async fn test_run_withDirectory_shouldIgnoreEarlierOutputs() {
    let temp_dir = common::create_temp_dir().unwrap();
    let content = common::xliff12_document(&["Open the door"]);
    common::create_test_file(temp_dir.path(), "manual.xlf", &content).unwrap();
    common::create_test_file(temp_dir.path(), "manual Duits.xlf", &content).unwrap();
    let mock = MockProvider::working();
    let controller = controller(&mock, memory_config(&["Duits"]));

    let summary = controller.run(&[temp_dir.path()], true).await.unwrap();

    assert_eq!(summary.translated, 1);
    assert!(!temp_dir.path().join("manual Duits Duits.xlf").exists());
}

#[tokio::test]
async fn test_run_withMalformedFile_shouldRecordFailureAndContinue() {
    let temp_dir = common::create_temp_dir().unwrap();
    let good = common::create_test_file(
        temp_dir.path(),
        "a.xlf",
        &common::xliff12_document(&["Open the door"]),
    )
    .unwrap();
    let broken = common::create_test_file(temp_dir.path(), "b.xlf", "<xliff version=\"1.2\"><file><body><trans-unit id=\"1\"><source>Hi there</source></file></xliff>").unwrap();
    let mock = MockProvider::working();
    let controller = controller(&mock, memory_config(&["Duits"]));

    let summary = controller.run(&[good, broken.clone()], false).await.unwrap();

    assert!(!summary.is_success());
    assert_eq!(summary.translated, 1);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].input, broken);
    assert_eq!(summary.failures[0].language, "Duits");
    assert!(!temp_dir.path().join("b Duits.xlf").exists());
}

#[tokio::test]
async fn test_run_withUnreachableBackend_shouldFailEveryFile() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(
        temp_dir.path(),
        "manual.xlf",
        &common::xliff12_document(&["Open the door"]),
    )
    .unwrap();
    let mock = MockProvider::failing();
    let controller = controller(&mock, memory_config(&["Duits", "Frans"]));

    let summary = controller.run(&[input], false).await.unwrap();

    assert_eq!(summary.failures.len(), 2);
    assert!(summary.failures[0].message.contains("Cluster 0"));
    assert_eq!(summary.translated, 0);
}

#[tokio::test]
async fn test_run_withClearOnStart_shouldForgetCachedResponses() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(
        temp_dir.path(),
        "manual.xlf",
        &common::xliff12_document(&["Open the door"]),
    )
    .unwrap();
    let mock = MockProvider::working();
    let cache = StringCache::new(true);
    let service = || TranslationService::with_provider(Arc::new(mock.clone()), cache.clone(), 32768);

    let cached = Controller::with_service(memory_config(&["Duits"]), service());
    cached.run(&[input.clone()], true).await.unwrap();
    cached.run(&[input.clone()], true).await.unwrap();
    assert_eq!(mock.request_count(), 1);

    let mut config = memory_config(&["Duits"]);
    config.cache.clear_on_start = true;
    let clearing = Controller::with_service(config, service());
    clearing.run(&[input.clone()], true).await.unwrap();
    clearing.run(&[input], true).await.unwrap();
    assert_eq!(mock.request_count(), 3);
}

#[test]
fn test_run_withNoInputs_shouldReturnEmptySummary() {
    let temp_dir = common::create_temp_dir().unwrap();
    let mock = MockProvider::working();
    let controller = controller(&mock, memory_config(&["Duits"]));

    let summary = tokio_test::block_on(async {
        controller.run(&[temp_dir.path()], false).await
    })
    .unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.translated + summary.skipped, 0);
}
