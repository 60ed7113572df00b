/*!
 * Reassembly of translated clusters into a full document.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::TranslationError;
use super::cluster::{Cluster, SplitDocument};
use super::version::XliffVersion;

static ROOT_START_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(?:[A-Za-z_][\w.\-]*:)?xliff(?:\s[^>]*?)?(\s*/?>)")
        .expect("Invalid root tag regex")
});

static TRG_LANG_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(\strgLang\s*=\s*)("[^"]*"|'[^']*')"#)
        .expect("Invalid trgLang regex")
});

/// Declare the target language on the root start tag of a 2.0 header.
///
/// An existing `trgLang` is overwritten, otherwise the attribute is inserted
/// right before the end of the start tag. Only the first root tag is touched.
pub fn patch_target_language(header: &str, locale: &str) -> String {
    let Some(tag) = ROOT_START_TAG.captures(header) else {
        return header.to_string();
    };
    let (Some(whole), Some(close)) = (tag.get(0), tag.get(1)) else {
        return header.to_string();
    };

    let start_tag = &header[whole.start()..close.start()];
    let patched = if TRG_LANG_ATTRIBUTE.is_match(start_tag) {
        TRG_LANG_ATTRIBUTE
            .replacen(start_tag, 1, |caps: &regex::Captures| format!("{}\"{}\"", &caps[1], locale))
            .into_owned()
    } else {
        format!("{} trgLang=\"{}\"", start_tag, locale)
    };

    let mut out = String::with_capacity(header.len() + locale.len() + 12);
    out.push_str(&header[..whole.start()]);
    out.push_str(&patched);
    out.push_str(&header[close.start()..]);
    out
}

/// Pull the translated unit blocks back out of a translated cluster document.
///
/// The returned body starts with the separator the cluster originally had, so
/// bodies of consecutive clusters can simply be concatenated.
pub fn extract_cluster_body(cluster: &Cluster<'_>, translated_fragment: &str) -> Result<String, TranslationError> {
    let translated = SplitDocument::parse(translated_fragment)?;

    if translated.units.len() != cluster.units.len() {
        return Err(TranslationError::FragmentExtractionMismatch {
            cluster: cluster.index,
            expected: cluster.units.len(),
            found: translated.units.len(),
        });
    }

    let mut body = String::with_capacity(translated_fragment.len());
    body.push_str(cluster.leading_separator());
    for (i, unit) in translated.units.iter().enumerate() {
        if i > 0 {
            body.push_str(&unit.separator);
        }
        body.push_str(&unit.markup);
    }
    Ok(body)
}

/// Join header, translated cluster bodies and footer into the final document
pub fn assemble<S: AsRef<str>>(
    version: XliffVersion,
    header: &str,
    bodies: &[S],
    footer: &str,
    locale: Option<&str>,
) -> String {
    let header = match (version, locale) {
        (XliffVersion::V2_0, Some(locale)) => patch_target_language(header, locale),
        _ => header.to_string(),
    };

    let body_len: usize = bodies.iter().map(|b| b.as_ref().len()).sum();
    let mut document = String::with_capacity(header.len() + body_len + footer.len());
    document.push_str(&header);
    for body in bodies {
        document.push_str(body.as_ref());
    }
    document.push_str(footer);

    debug!("Assembled {} cluster bodies into {} bytes", bodies.len(), document.len());
    document
}
