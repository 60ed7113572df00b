/*!
 * Tests for fragment translation: extraction, request building and reinsertion
 */

use xliffai::errors::TranslationError;
use xliffai::providers::MockProvider;
use xliffai::translation::{PromptTemplate, TokenUsageStats, TranslationRequest};
use xliffai::xliff::XliffVersion;
use crate::common;

#[tokio::test]
async fn test_translateFragment_withRepeatedSources_shouldSendEachStringOnce() {
    let mock = MockProvider::working().with_custom_response(common::uppercase_response);
    let service = common::mock_service(&mock, 32768);
    let fragment = common::xliff12_document(&["Save file", "Open file", "Save file"]);
    let mut usage = TokenUsageStats::new();

    let translated = service
        .translate_fragment(&fragment, XliffVersion::V1_2, "Duits", &mut usage)
        .await
        .unwrap();

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(MockProvider::prompt_entries(&requests[0].prompt), vec!["Save file", "Open file"]);
    assert_eq!(common::targets(&translated), vec!["SAVE FILE", "OPEN FILE", "SAVE FILE"]);
    assert_eq!(usage.requests, 1);
}

#[tokio::test]
async fn test_translateFragment_withInlineMarkup_shouldKeepTagsAndAttributes() {
    let mock = MockProvider::working().with_custom_response(common::uppercase_response);
    let service = common::mock_service(&mock, 32768);
    let fragment = common::xliff12_document(&[
        "Press <g id=\"1\" ctype=\"bold\">Start</g> and <x id=\"2\"/> wait &amp; see",
    ]);
    let mut usage = TokenUsageStats::new();

    let translated = service
        .translate_fragment(&fragment, XliffVersion::V1_2, "Engels", &mut usage)
        .await
        .unwrap();

    assert_eq!(
        common::targets(&translated),
        vec!["PRESS <g id=\"1\" ctype=\"bold\">START</g> AND <x id=\"2\"/> WAIT &amp; SEE"]
    );
    let sent = MockProvider::prompt_entries(&mock.requests()[0].prompt);
    assert_eq!(sent, vec!["Press", "Start", "and", "wait & see"]);
}

#[tokio::test]
async fn test_translateFragment_withExistingTarget_shouldReplaceIt() {
    let mock = MockProvider::working().with_custom_response(common::uppercase_response);
    let service = common::mock_service(&mock, 32768);
    let fragment = common::xliff12_document(&["Close window"])
        .replace("</source>", "</source>\n        <target state=\"needs-translation\">Oud</target>");
    let mut usage = TokenUsageStats::new();

    let translated = service
        .translate_fragment(&fragment, XliffVersion::V1_2, "Duits", &mut usage)
        .await
        .unwrap();

    assert_eq!(common::targets(&translated), vec!["CLOSE WINDOW"]);
    assert!(!translated.contains("Oud"));
}

#[tokio::test]
async fn test_translateFragment_withSeveralSegments_shouldTargetEachSegment() {
    let mock = MockProvider::working().with_custom_response(common::uppercase_response);
    let service = common::mock_service(&mock, 32768);
    let fragment = common::xliff20_document(&["First sentence"]).replace(
        "      </segment>\n",
        "      </segment>\n      <segment>\n        <source>Second sentence</source>\n      </segment>\n",
    );
    let mut usage = TokenUsageStats::new();

    let translated = service
        .translate_fragment(&fragment, XliffVersion::V2_0, "Frans", &mut usage)
        .await
        .unwrap();

    assert_eq!(common::targets(&translated), vec!["FIRST SENTENCE", "SECOND SENTENCE"]);
}

#[tokio::test]
async fn test_translateFragment_withPlaceholdersOnly_shouldCopySourceWithoutRequest() {
    let mock = MockProvider::working();
    let service = common::mock_service(&mock, 32768);
    let fragment = common::xliff12_document(&["%1", "<ph id=\"1\"/> ?"]);
    let mut usage = TokenUsageStats::new();

    let translated = service
        .translate_fragment(&fragment, XliffVersion::V1_2, "Duits", &mut usage)
        .await
        .unwrap();

    assert_eq!(mock.request_count(), 0);
    assert_eq!(common::targets(&translated), vec!["%1", "<ph id=\"1\"/> ?"]);
    assert_eq!(usage.requests, 0);
}

#[tokio::test]
async fn test_translateFragment_withMissingEntry_shouldReportCountMismatch() {
    let mock = MockProvider::dropping();
    let service = common::mock_service(&mock, 32768);
    let fragment = common::xliff12_document(&["Save file", "Open file"]);
    let mut usage = TokenUsageStats::new();

    let result = service
        .translate_fragment(&fragment, XliffVersion::V1_2, "Duits", &mut usage)
        .await;

    assert!(matches!(
        result,
        Err(TranslationError::ResponseCountMismatch { expected: 2, found: 1 })
    ));
}

#[tokio::test]
async fn test_translateFragment_withCustomTemplate_shouldRenderLanguageAndSystemPrompt() {
    let mock = MockProvider::working();
    let service = common::mock_service(&mock, 32768)
        .with_prompt(PromptTemplate::new("To {language}:\n{texts}"))
        .with_system_prompt("Translator for {language}");
    let fragment = common::xliff12_document(&["Good morning"]);
    let mut usage = TokenUsageStats::new();

    service
        .translate_fragment(&fragment, XliffVersion::V1_2, "Spaans", &mut usage)
        .await
        .unwrap();

    let request = &mock.requests()[0];
    assert_eq!(request.prompt, "To Spaans:\n1 [[Good morning]]");
    assert_eq!(request.system.as_deref(), Some("Translator for Spaans"));
    assert_eq!(request.language, "Spaans");
}

#[test]
fn test_parseResponse_withReorderedAndChattyResponse_shouldMatchByNumber() {
    let request = TranslationRequest::from_texts(&["Yes", "No", "Maybe"]);
    let response = "Sure! Here are the translations:\n\n3 [[Misschien]]\n1 [[Ja]]\n2 [[Nee]]\nLet me know.";

    let map = request.parse_response(response).unwrap();

    assert_eq!(map.apply(&["No", "Yes", "Maybe", "No"]).unwrap(), vec!["Nee", "Ja", "Misschien", "Nee"]);
}

#[test]
fn test_fromTexts_withSurroundingWhitespace_shouldDeduplicateTrimmed() {
    let request = TranslationRequest::from_texts(&["  Next page ", "Next page", "\tNext page\n"]);
    assert_eq!(request.entries(), &["Next page"]);
}

#[tokio::test]
async fn test_translateFragment_withBracketsInSource_shouldTranslateWholeText() {
    let mock = MockProvider::working().with_custom_response(common::uppercase_response);
    let service = common::mock_service(&mock, 32768);
    let fragment = common::xliff12_document(&["See [[wiki]] page", "Other text"]);
    let mut usage = TokenUsageStats::new();

    let translated = service
        .translate_fragment(&fragment, XliffVersion::V1_2, "Duits", &mut usage)
        .await
        .unwrap();

    assert_eq!(common::targets(&translated), vec!["SEE [[WIKI]] PAGE", "OTHER TEXT"]);
}

#[tokio::test]
async fn test_translateFragment_withUnframeableSource_shouldFailBeforeBackend() {
    let mock = MockProvider::working();
    let service = common::mock_service(&mock, 32768);
    let fragment = common::xliff12_document(&["Items [[a]]\nfollow"]);
    let mut usage = TokenUsageStats::new();

    let result = service
        .translate_fragment(&fragment, XliffVersion::V1_2, "Duits", &mut usage)
        .await;

    assert!(matches!(result, Err(TranslationError::UnframeableEntry(_))));
    assert_eq!(mock.request_count(), 0);
}
