/*!
 * Text extraction and structural reinsertion.
 *
 * Both walks visit a source subtree depth first, a node's own text before the
 * text of its children, and stop at the same text positions: character data
 * or CDATA that is not blank. Reinsertion consumes one replacement per
 * position through a cursor shared by every subtree of a cluster.
 */

use crate::errors::TranslationError;
use crate::xliff::tree::{decode_text, encode_text, Element, Node};
use crate::xliff::XliffVersion;

/// Attribute dropped from the target root
const LANG_ATTRIBUTE: &str = "xml:lang";

/// Collect the trimmed text positions of a source subtree in document order
pub fn extract_texts(source: &Element) -> Vec<String> {
    let mut texts = Vec::new();
    collect_texts(source, &mut texts);
    texts
}

fn collect_texts(element: &Element, texts: &mut Vec<String>) {
    for child in &element.children {
        match child {
            Node::Element(inner) => collect_texts(inner, texts),
            Node::Text(raw) => {
                let decoded = decode_text(raw);
                let trimmed = decoded.trim();
                if !trimmed.is_empty() {
                    texts.push(trimmed.to_string());
                }
            }
            Node::CData(data) => {
                let trimmed = data.trim();
                if !trimmed.is_empty() {
                    texts.push(trimmed.to_string());
                }
            }
            Node::Markup(_) => {}
        }
    }
}

/// Build a target subtree mirroring `source` with replacement texts filled in.
///
/// `cursor` points at the next unused replacement and is advanced once per
/// text position.
pub fn reinsert(
    source: &Element,
    replacements: &[String],
    cursor: &mut usize,
) -> Result<Element, TranslationError> {
    let mut target = mirror(source, replacements, cursor)?;
    target.name = match source.name.rfind(':') {
        Some(colon) => format!("{}{}", &source.name[..=colon], XliffVersion::TARGET_TAG),
        None => XliffVersion::TARGET_TAG.to_string(),
    };
    target.attributes.retain(|(key, _)| key != LANG_ATTRIBUTE);
    Ok(target)
}

/// Reinsert into a single subtree and require every replacement to be used
pub fn reinsert_all(source: &Element, replacements: &[String]) -> Result<Element, TranslationError> {
    let mut cursor = 0;
    let target = reinsert(source, replacements, &mut cursor)?;
    ensure_consumed(cursor, replacements.len())?;
    Ok(target)
}

/// Fail when a walk left replacements unused
pub fn ensure_consumed(cursor: usize, available: usize) -> Result<(), TranslationError> {
    if cursor == available {
        Ok(())
    } else {
        Err(TranslationError::ReinsertionLengthMismatch { consumed: cursor, available })
    }
}

fn mirror(element: &Element, replacements: &[String], cursor: &mut usize) -> Result<Element, TranslationError> {
    let mut copy = Element {
        name: element.name.clone(),
        attributes: element.attributes.clone(),
        children: Vec::with_capacity(element.children.len()),
        self_closing: element.self_closing,
    };

    for child in &element.children {
        let node = match child {
            Node::Element(inner) => Node::Element(mirror(inner, replacements, cursor)?),
            Node::Text(raw) => {
                let decoded = decode_text(raw);
                match padding(&decoded) {
                    Some((leading, trailing)) => {
                        let replacement = next_replacement(replacements, cursor)?;
                        Node::Text(format!("{}{}{}", leading, encode_text(replacement), trailing))
                    }
                    None => child.clone(),
                }
            }
            Node::CData(data) => match padding(data) {
                Some((leading, trailing)) => {
                    let replacement = next_replacement(replacements, cursor)?;
                    Node::CData(format!("{}{}{}", leading, replacement, trailing))
                }
                None => child.clone(),
            },
            Node::Markup(_) => child.clone(),
        };
        copy.children.push(node);
    }

    Ok(copy)
}

/// Leading and trailing whitespace of a text position, `None` when blank
fn padding(text: &str) -> Option<(&str, &str)> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let start = text.len() - text.trim_start().len();
    let end = start + trimmed.len();
    Some((&text[..start], &text[end..]))
}

fn next_replacement<'a>(replacements: &'a [String], cursor: &mut usize) -> Result<&'a str, TranslationError> {
    let replacement = replacements
        .get(*cursor)
        .ok_or(TranslationError::ReinsertionCursorOverflow {
            position: *cursor,
            available: replacements.len(),
        })?;
    *cursor += 1;
    Ok(replacement.as_str())
}
