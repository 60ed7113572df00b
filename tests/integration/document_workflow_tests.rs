/*!
 * End-to-end document translation through the service with mock backends
 */

use std::sync::Arc;

use xliffai::database::Repository;
use xliffai::errors::{ProviderError, TranslationError, XliffError};
use xliffai::providers::MockProvider;
use xliffai::translation::{StringCache, TranslationService};
use xliffai::xliff::{SplitDocument, XliffVersion};
use crate::common;

const SOURCES: &[&str] = &[
    "Welcome to the <g id=\"b1\">installation</g> guide",
    "Remove the cover",
    "Tighten the four screws",
    "Remove the cover",
    "Press <x id=\"p1\"/> to continue",
    "Connect the power cable",
    "Check the <g id=\"b2\">status</g> light",
    "Done",
];

/// The original document with an upper-case target after every source
fn expected_uppercase(content: &str, sources: &[&str]) -> String {
    let mut expected = content.to_string();
    let mut done = std::collections::HashSet::new();
    for source in sources.iter().filter(|source| done.insert(**source)) {
        expected = expected.replace(
            &format!("<source>{}</source>\n", source),
            &format!("<source>{}</source>\n        <target>{}</target>\n", source, uppercase_markup(source)),
        );
    }
    expected
}

/// Upper-case the text between tags, leaving the tags themselves alone
fn uppercase_markup(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut in_tag = false;
    for c in markup.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ => {}
        }
        if in_tag || c == '>' {
            out.push(c);
        } else {
            out.extend(c.to_uppercase());
        }
    }
    out
}

#[tokio::test]
async fn test_translateDocument_withVersion12_shouldAddTargetsAndKeepEverythingElse() {
    let mock = MockProvider::working().with_custom_response(common::uppercase_response);
    let service = common::mock_service(&mock, 32768);
    let content = common::xliff12_document(SOURCES);

    let translation = service.translate_document(&content, "Duits", Some("de-DE"), None).await.unwrap();

    assert_eq!(translation.version, XliffVersion::V1_2);
    assert_eq!(translation.clusters, 1);
    assert_eq!(translation.content, expected_uppercase(&content, SOURCES));
    assert!(!translation.content.contains("trgLang"));
    assert_eq!(mock.request_count(), 1);
    assert_eq!(translation.usage.requests, 1);
}

#[tokio::test]
async fn test_translateDocument_withVersion20_shouldDeclareTargetLanguage() {
    let mock = MockProvider::working().with_custom_response(common::uppercase_response);
    let service = common::mock_service(&mock, 32768);
    let content = common::xliff20_document(SOURCES);

    let translation = service.translate_document(&content, "Duits", Some("de-DE"), None).await.unwrap();

    assert_eq!(translation.version, XliffVersion::V2_0);
    let expected = expected_uppercase(&content, SOURCES)
        .replace("srcLang=\"nl\">", "srcLang=\"nl\" trgLang=\"de-DE\">");
    assert_eq!(translation.content, expected);
}

#[tokio::test]
async fn test_translateDocument_withSmallClusters_shouldMatchSingleClusterResult() {
    let content = common::xliff12_document(SOURCES);
    let split = SplitDocument::parse(&content).unwrap();
    let small = split.header.len() + split.footer.len() + 200;

    let single_mock = MockProvider::working().with_custom_response(common::uppercase_response);
    let single = common::mock_service(&single_mock, 32768)
        .translate_document(&content, "Duits", None, None)
        .await
        .unwrap();

    let split_mock = MockProvider::working().with_custom_response(common::uppercase_response);
    let clustered = common::mock_service(&split_mock, small)
        .translate_document(&content, "Duits", None, None)
        .await
        .unwrap();

    assert!(clustered.clusters > 1);
    assert_eq!(split_mock.request_count(), clustered.clusters);
    assert_eq!(clustered.content, single.content);
    assert_eq!(common::targets(&clustered.content).len(), SOURCES.len());
}

#[tokio::test]
async fn test_translateDocument_withRepeatedRun_shouldAnswerFromCache() {
    let mock = MockProvider::working();
    let service = common::mock_service(&mock, 32768);
    let content = common::xliff12_document(SOURCES);

    let first = service.translate_document(&content, "Frans", None, None).await.unwrap();
    let second = service.translate_document(&content, "Frans", None, None).await.unwrap();

    assert_eq!(mock.request_count(), 1);
    assert_eq!(first.content, second.content);
    assert_eq!(second.usage.requests, 0);
    assert_eq!(second.usage.cached_requests, 1);

    service.translate_document(&content, "Pools", None, None).await.unwrap();
    assert_eq!(mock.request_count(), 2);
}

#[tokio::test]
async fn test_translateDocument_withSharedStore_shouldReuseResponsesAcrossServices() {
    let store = Repository::new_in_memory().unwrap();
    let content = common::xliff20_document(SOURCES);

    let first_mock = MockProvider::working();
    let first = TranslationService::with_provider(
        Arc::new(first_mock.clone()),
        StringCache::with_store(true, store.clone()),
        32768,
    );
    let translated = first.translate_document(&content, "Duits", None, None).await.unwrap();

    let second_mock = MockProvider::failing();
    let second = TranslationService::with_provider(
        Arc::new(second_mock.clone()),
        StringCache::with_store(true, store.clone()),
        32768,
    );
    let again = second.translate_document(&content, "Duits", None, None).await.unwrap();

    assert_eq!(first_mock.request_count(), 1);
    assert_eq!(second_mock.request_count(), 0);
    assert_eq!(again.content, translated.content);
    assert_eq!(store.get_cache_stats().await.unwrap().total_entries, 1);
}

#[tokio::test]
async fn test_translateDocument_withDisabledCache_shouldAlwaysAskBackend() {
    let mock = MockProvider::working();
    let mut service = common::mock_service(&mock, 32768);
    service.cache_mut().set_enabled(false);
    let content = common::xliff12_document(&["Open the door"]);

    service.translate_document(&content, "Duits", None, None).await.unwrap();
    service.translate_document(&content, "Duits", None, None).await.unwrap();

    assert_eq!(mock.request_count(), 2);
    assert!(service.cache().is_empty());
}

#[tokio::test]
async fn test_translateDocument_withFailingSecondCluster_shouldNameCluster() {
    let content = common::xliff12_document(SOURCES);
    let split = SplitDocument::parse(&content).unwrap();
    let small = split.header.len() + split.footer.len() + 200;
    let mock = MockProvider::intermittent(2);
    let service = common::mock_service(&mock, small);

    let result = service.translate_document(&content, "Duits", None, None).await;

    match result {
        Err(TranslationError::Cluster { cluster, source }) => {
            assert_eq!(cluster, 1);
            assert!(matches!(*source, TranslationError::Provider(ProviderError::ApiError { status_code: 500, .. })));
        }
        other => panic!("expected a cluster failure, got {:?}", other.map(|t| t.clusters)),
    }
    assert_eq!(mock.request_count(), 2);
}

#[tokio::test]
async fn test_translateDocument_withShortResponse_shouldFailWithoutWritingCache() {
    let mock = MockProvider::dropping();
    let service = common::mock_service(&mock, 32768);
    let content = common::xliff12_document(&["Open the door", "Close the door"]);

    let result = service.translate_document(&content, "Duits", None, None).await;

    match result {
        Err(TranslationError::Cluster { cluster: 0, source }) => {
            assert!(matches!(*source, TranslationError::ResponseCountMismatch { expected: 2, found: 1 }));
        }
        other => panic!("expected a count mismatch, got {:?}", other.map(|t| t.clusters)),
    }
}

#[tokio::test]
async fn test_translateDocument_withUnsupportedVersion_shouldFailBeforeBackend() {
    let mock = MockProvider::working();
    let service = common::mock_service(&mock, 32768);
    let content = common::xliff12_document(&["Hello there"]).replace("version=\"1.2\"", "version=\"1.1\"");

    let result = service.translate_document(&content, "Duits", None, None).await;

    assert!(matches!(
        result,
        Err(TranslationError::Xliff(XliffError::UnsupportedVersion(Some(ref v)))) if v == "1.1"
    ));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_translateDocument_withLineBreakReferenceInAttribute_shouldKeepReference() {
    let mock = MockProvider::working();
    let service = common::mock_service(&mock, 32768);
    let content = common::xliff12_document(&["Open the door"])
        .replace("<trans-unit id=\"1\">", "<trans-unit id=\"1\" resname=\"door&#10;open\">");

    let translation = service.translate_document(&content, "Duits", None, None).await.unwrap();

    assert!(translation.content.contains("<trans-unit id=\"1\" resname=\"door&#10;open\">"));
    assert_eq!(common::targets(&translation.content), vec!["&lt;Duits&gt; Open the door"]);
}
