/*!
 * Tests for version detection, cluster splitting and reassembly
 */

use xliffai::errors::XliffError;
use xliffai::xliff::{self, SplitDocument, XliffVersion};
use crate::common;

fn varied_sources(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("Stap {} van de <g id=\"{}\">procedure</g>{}", i, i, " lang".repeat(i % 7)))
        .collect()
}

#[test]
fn test_detect_withBothDialects_shouldSelectVersion() {
    let v12 = common::xliff12_document(&["Hallo"]);
    let v20 = common::xliff20_document(&["Hallo"]);

    assert_eq!(XliffVersion::detect(&v12).unwrap(), XliffVersion::V1_2);
    assert_eq!(XliffVersion::detect(&v20).unwrap(), XliffVersion::V2_0);
}

#[test]
fn test_detect_withMissingOrUnknownVersion_shouldFail() {
    let missing = XliffVersion::detect("<xliff><file/></xliff>");
    assert!(matches!(missing, Err(XliffError::UnsupportedVersion(None))));

    let unknown = XliffVersion::detect("<xliff version=\"2.1\"><file/></xliff>");
    assert!(matches!(unknown, Err(XliffError::UnsupportedVersion(Some(ref v))) if v == "2.1"));
}

#[test]
fn test_clusters_withVariousLimits_shouldPartitionCompletelyWithinBound() {
    let sources = varied_sources(40);
    let refs: Vec<&str> = sources.iter().map(String::as_str).collect();
    let content = common::xliff12_document(&refs);
    let split = SplitDocument::parse(&content).unwrap();
    assert_eq!(split.units.len(), 40);

    for max in [400, 700, 1500, 5000, 1_000_000] {
        let clusters = split.clusters(max);

        let rejoined: String = clusters.iter().map(|c| c.body()).collect();
        assert_eq!(rejoined, split.body(), "max {}", max);
        assert_eq!(clusters.iter().map(|c| c.units.len()).sum::<usize>(), 40);

        for cluster in &clusters {
            assert!(cluster.wrapped_len() <= max || cluster.units.len() == 1, "max {}", max);
            let fragment = SplitDocument::parse(&cluster.fragment()).unwrap();
            assert_eq!(fragment.units.len(), cluster.units.len());
            assert_eq!(fragment.version, XliffVersion::V1_2);
        }
    }
}

#[test]
fn test_clusters_withDocumentUnderLimit_shouldYieldOne() {
    let content = common::xliff20_document(&["Een", "Twee", "Drie"]);
    let split = SplitDocument::parse(&content).unwrap();

    let clusters = split.clusters(content.len());

    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].fragment(), content);
}

#[test]
fn test_clusters_withOversizedUnit_shouldEmitItAlone() {
    let huge = "woord ".repeat(200);
    let content = common::xliff12_document(&["Kort", &huge, "Ook kort"]);
    let split = SplitDocument::parse(&content).unwrap();
    let overhead = split.header.len() + split.footer.len();

    let clusters = split.clusters(overhead + 120);

    assert_eq!(clusters.len(), 3);
    assert_eq!(clusters[1].units.len(), 1);
    assert!(clusters[1].wrapped_len() > overhead + 120);
}

#[test]
fn test_assemble_withUntranslatedClusters_shouldReproduceDocument() {
    let sources = varied_sources(25);
    let refs: Vec<&str> = sources.iter().map(String::as_str).collect();

    for content in [common::xliff12_document(&refs), common::xliff20_document(&refs)] {
        let split = SplitDocument::parse(&content).unwrap();
        let clusters = split.clusters(900);
        assert!(clusters.len() > 1);

        let bodies: Vec<String> = clusters
            .iter()
            .map(|c| xliff::extract_cluster_body(c, &c.fragment()).unwrap())
            .collect();
        let assembled = xliff::assemble(split.version, &split.header, &bodies, &split.footer, None);

        assert_eq!(assembled, content);
    }
}

#[test]
fn test_assemble_withLocale_shouldOnlyPatchVersion20() {
    let v20 = common::xliff20_document(&["Hallo"]);
    let split = SplitDocument::parse(&v20).unwrap();
    let assembled = xliff::assemble(split.version, &split.header, &[split.body()], &split.footer, Some("de-DE"));
    assert!(assembled.contains("version=\"2.0\" srcLang=\"nl\" trgLang=\"de-DE\">"));

    let v12 = common::xliff12_document(&["Hallo"]);
    let split = SplitDocument::parse(&v12).unwrap();
    let assembled = xliff::assemble(split.version, &split.header, &[split.body()], &split.footer, Some("de-DE"));
    assert_eq!(assembled, v12);
}

#[test]
fn test_patchTargetLanguage_withoutRootTag_shouldLeaveHeaderUnchanged() {
    let header = "<?xml version=\"1.0\"?>\n<!-- no root yet -->";
    assert_eq!(xliff::patch_target_language(header, "fr-FR"), header);
}
