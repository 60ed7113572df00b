/*!
 * Size-bounded splitting of XLIFF documents.
 *
 * A document is cut into an opaque header, a sequence of raw unit blocks and
 * an opaque footer. Consecutive units are then grouped greedily into clusters
 * so that `header + cluster body + footer` stays a parseable document of the
 * same dialect and under the configured byte budget.
 */

use log::{debug, warn};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::errors::XliffError;
use super::tree::local_name;
use super::version::XliffVersion;

/// One translation unit in raw form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawUnit {
    /// Text between the previous unit and this one (empty for the first unit)
    pub separator: String,
    /// The unit element itself
    pub markup: String,
}

impl RawUnit {
    /// Length in bytes of separator and markup
    pub fn len(&self) -> usize {
        self.separator.len() + self.markup.len()
    }

    /// Whether the unit holds no text at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A document cut into header, units and footer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitDocument {
    /// Detected dialect
    pub version: XliffVersion,
    /// Everything before the first unit
    pub header: String,
    /// Units in document order
    pub units: Vec<RawUnit>,
    /// Everything after the last unit
    pub footer: String,
}

impl SplitDocument {
    /// Cut a document at its translation-unit boundaries
    pub fn parse(content: &str) -> Result<Self, XliffError> {
        let content = content.trim_start_matches('\u{feff}');
        let version = XliffVersion::detect(content)?;
        let spans = unit_spans(content, version)?;

        let Some(&(first_start, _)) = spans.first() else {
            return Ok(Self {
                version,
                header: content.to_string(),
                units: Vec::new(),
                footer: String::new(),
            });
        };

        let mut units: Vec<RawUnit> = Vec::with_capacity(spans.len());
        let mut previous_end = first_start;

        for (start, end) in spans {
            let separator = &content[previous_end..start];
            let markup = &content[start..end];
            previous_end = end;

            // Structural markup between two units (a closing group, say) cannot
            // start a cluster, so such units stay glued to their predecessor.
            match units.last_mut() {
                Some(last) if !separator.trim().is_empty() => {
                    last.markup.push_str(separator);
                    last.markup.push_str(markup);
                }
                _ => units.push(RawUnit {
                    separator: separator.to_string(),
                    markup: markup.to_string(),
                }),
            }
        }

        Ok(Self {
            version,
            header: content[..first_start].to_string(),
            units,
            footer: content[previous_end..].to_string(),
        })
    }

    /// The units joined back together
    pub fn body(&self) -> String {
        join_units(&self.units)
    }

    /// Group units into clusters of at most `max_bytes` wrapped bytes
    pub fn clusters(&self, max_bytes: usize) -> Vec<Cluster<'_>> {
        cluster_units(&self.header, &self.units, &self.footer, max_bytes)
    }
}

/// A contiguous run of units translated as one fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cluster<'a> {
    /// Zero-based position of the cluster in the document
    pub index: usize,
    /// Shared document header
    pub header: &'a str,
    /// Units of this cluster
    pub units: &'a [RawUnit],
    /// Shared document footer
    pub footer: &'a str,
}

impl Cluster<'_> {
    /// The units of the cluster joined together
    pub fn body(&self) -> String {
        join_units(self.units)
    }

    /// The cluster as a standalone document
    pub fn fragment(&self) -> String {
        let mut fragment = String::with_capacity(self.wrapped_len());
        fragment.push_str(self.header);
        fragment.push_str(&self.body());
        fragment.push_str(self.footer);
        fragment
    }

    /// Size in bytes of the standalone document
    pub fn wrapped_len(&self) -> usize {
        self.header.len() + self.units.iter().map(RawUnit::len).sum::<usize>() + self.footer.len()
    }

    /// Separator preceding the first unit of the cluster
    pub fn leading_separator(&self) -> &str {
        self.units.first().map(|unit| unit.separator.as_str()).unwrap_or("")
    }
}

/// Greedily group units so each wrapped cluster fits in `max_bytes`.
///
/// A unit that does not fit even on its own is emitted as a cluster of one.
pub fn cluster_units<'a>(
    header: &'a str,
    units: &'a [RawUnit],
    footer: &'a str,
    max_bytes: usize,
) -> Vec<Cluster<'a>> {
    let overhead = header.len() + footer.len();
    let mut clusters = Vec::new();
    let mut start = 0;
    let mut size = overhead;

    for (i, unit) in units.iter().enumerate() {
        if i > start && size + unit.len() > max_bytes {
            clusters.push(Cluster {
                index: clusters.len(),
                header,
                units: &units[start..i],
                footer,
            });
            start = i;
            size = overhead;
        }
        size += unit.len();
        if i == start && size > max_bytes {
            warn!(
                "Translation unit {} alone is {} bytes, above the {} byte cluster limit",
                i + 1, size, max_bytes
            );
        }
    }

    if start < units.len() {
        clusters.push(Cluster {
            index: clusters.len(),
            header,
            units: &units[start..],
            footer,
        });
    }

    debug!("Split {} units into {} clusters (max {} bytes)", units.len(), clusters.len(), max_bytes);
    clusters
}

fn join_units(units: &[RawUnit]) -> String {
    let mut body = String::with_capacity(units.iter().map(RawUnit::len).sum());
    for unit in units {
        body.push_str(&unit.separator);
        body.push_str(&unit.markup);
    }
    body
}

/// Byte ranges of the outermost unit elements
fn unit_spans(content: &str, version: XliffVersion) -> Result<Vec<(usize, usize)>, XliffError> {
    let unit_tag = version.unit_tag();
    let mut reader = Reader::from_str(content);
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut open: Option<(usize, usize)> = None;

    loop {
        let event = reader.read_event().map_err(|e| XliffError::Parse {
            position: reader.buffer_position(),
            message: e.to_string(),
        })?;
        // Reader sits right after the `>` of the tag just read
        let after = reader.buffer_position();

        match event {
            Event::Start(start) => {
                if open.is_none() && is_unit(start.name().as_ref(), unit_tag) {
                    open = Some((tag_start(content, after)?, depth));
                }
                depth += 1;
            }
            Event::Empty(start) => {
                if open.is_none() && is_unit(start.name().as_ref(), unit_tag) {
                    spans.push((tag_start(content, after)?, after));
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if let Some((start, unit_depth)) = open {
                    if unit_depth == depth {
                        spans.push((start, after));
                        open = None;
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(spans)
}

fn is_unit(name: &[u8], unit_tag: &str) -> bool {
    local_name(&String::from_utf8_lossy(name)) == unit_tag
}

/// Offset of the `<` opening the tag that ends right before `after`
fn tag_start(content: &str, after: usize) -> Result<usize, XliffError> {
    content
        .get(..after)
        .and_then(|prefix| prefix.rfind('<'))
        .ok_or_else(|| XliffError::Structure(format!("cannot locate tag ending at byte {}", after)))
}
