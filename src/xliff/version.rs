/*!
 * XLIFF dialect detection.
 *
 * The dialect decides which element names hold translatable segments; every
 * other component asks the detected `XliffVersion` for them.
 */

use std::fmt;

use log::warn;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::errors::XliffError;
use super::tree::local_name;

/// Supported XLIFF dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XliffVersion {
    /// XLIFF 1.2: `trans-unit` elements holding `source` and `target`
    V1_2,
    /// XLIFF 2.0: `unit` elements holding `segment`s with `source` and `target`
    V2_0,
}

impl XliffVersion {
    /// Name of the element holding a source text
    pub const SOURCE_TAG: &'static str = "source";

    /// Name of the element holding a translation
    pub const TARGET_TAG: &'static str = "target";

    /// Detect the dialect from the `version` attribute of the root element
    pub fn detect(content: &str) -> Result<Self, XliffError> {
        let mut reader = Reader::from_str(content.trim_start_matches('\u{feff}'));

        loop {
            let event = reader.read_event().map_err(|e| XliffError::Parse {
                position: reader.buffer_position(),
                message: e.to_string(),
            })?;

            match event {
                Event::Start(root) | Event::Empty(root) => {
                    if local_name(&String::from_utf8_lossy(root.name().as_ref())) != "xliff" {
                        return Err(XliffError::UnsupportedVersion(None));
                    }
                    let version = root
                        .try_get_attribute("version")
                        .map_err(|e| XliffError::Parse {
                            position: reader.buffer_position(),
                            message: e.to_string(),
                        })?
                        .map(|attr| String::from_utf8_lossy(&attr.value).trim().to_string());

                    let version = match version {
                        Some(token) => Self::from_token(&token)?,
                        None => return Err(XliffError::UnsupportedVersion(None)),
                    };

                    if let Ok(Some(xmlns)) = root.try_get_attribute("xmlns") {
                        let xmlns = String::from_utf8_lossy(&xmlns.value).trim().to_string();
                        if xmlns != version.namespace() {
                            warn!("XLIFF {} document declares namespace '{}', expected '{}'", version, xmlns, version.namespace());
                        }
                    }
                    return Ok(version);
                }
                Event::Eof => return Err(XliffError::UnsupportedVersion(None)),
                _ => {}
            }
        }
    }

    /// Map a version token to a dialect
    pub fn from_token(token: &str) -> Result<Self, XliffError> {
        match token {
            "1.2" => Ok(Self::V1_2),
            "2.0" => Ok(Self::V2_0),
            other => Err(XliffError::UnsupportedVersion(Some(other.to_string()))),
        }
    }

    /// The version token as it appears in documents
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1_2 => "1.2",
            Self::V2_0 => "2.0",
        }
    }

    /// Namespace URI of the dialect
    pub fn namespace(&self) -> &'static str {
        match self {
            Self::V1_2 => "urn:oasis:names:tc:xliff:document:1.2",
            Self::V2_0 => "urn:oasis:names:tc:xliff:document:2.0",
        }
    }

    /// Name of the translation-unit element, the granularity of clustering
    pub fn unit_tag(&self) -> &'static str {
        match self {
            Self::V1_2 => "trans-unit",
            Self::V2_0 => "unit",
        }
    }

    /// Name of the element that directly holds `source` and `target`
    pub fn container_tag(&self) -> &'static str {
        match self {
            Self::V1_2 => "trans-unit",
            Self::V2_0 => "segment",
        }
    }
}

impl fmt::Display for XliffVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
