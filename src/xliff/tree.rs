/*!
 * Minimal mixed-content XML tree.
 *
 * Documents are read with quick-xml into a small owned tree that keeps text
 * nodes in their raw (escaped) form, so that everything we do not translate
 * is written back byte for byte. Comments, processing instructions, the XML
 * declaration and doctype are carried as opaque markup.
 */

use std::borrow::Cow;

use quick_xml::escape::{escape, partial_escape, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::errors::XliffError;

/// A node in the document tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Element with attributes and children
    Element(Element),
    /// Character data, kept escaped exactly as it appeared in the input
    Text(String),
    /// Content of a CDATA section
    CData(String),
    /// Comment, processing instruction, declaration or doctype, verbatim
    Markup(String),
}

/// An XML element
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Qualified name, including any namespace prefix
    pub name: String,
    /// Attributes in document order with unescaped values
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order
    pub children: Vec<Node>,
    /// Whether the element was written as `<name/>`
    pub self_closing: bool,
}

impl Element {
    fn from_start(start: &BytesStart, self_closing: bool, position: usize) -> Result<Self, XliffError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();

        for attr in start.attributes() {
            let attr = attr.map_err(|e| XliffError::Parse {
                position,
                message: e.to_string(),
            })?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = match attr.unescape_value() {
                Ok(value) => value.into_owned(),
                Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
            };
            attributes.push((key, value));
        }

        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
            self_closing,
        })
    }

    /// Element name without its namespace prefix
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Look up an attribute value by qualified name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate over child elements, skipping text and markup
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Position of the first child element with the given local name
    pub fn position_of_child(&self, local: &str) -> Option<usize> {
        self.children.iter().position(|node| {
            matches!(node, Node::Element(element) if element.local_name() == local)
        })
    }

    /// First child element with the given local name
    pub fn find_child(&self, local: &str) -> Option<&Element> {
        self.child_elements().find(|element| element.local_name() == local)
    }

    fn has_text_content(&self) -> bool {
        self.children.iter().any(|node| match node {
            Node::Text(raw) => !raw.trim().is_empty(),
            Node::CData(_) => true,
            _ => false,
        })
    }
}

/// A parsed document: prolog, root element and trailing nodes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlDocument {
    /// Top-level nodes in document order
    pub nodes: Vec<Node>,
}

impl XmlDocument {
    /// The root element, if the document has one
    pub fn root(&self) -> Option<&Element> {
        self.nodes.iter().find_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Mutable access to the root element
    pub fn root_mut(&mut self) -> Option<&mut Element> {
        self.nodes.iter_mut().find_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Serialize the document exactly as parsed (modulo attribute quoting)
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            write_compact(&mut out, node);
        }
        out
    }

    /// Serialize the document with two-space indentation of element-only content
    pub fn to_pretty_xml(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            if is_blank(node) {
                continue;
            }
            if !out.is_empty() {
                out.push('\n');
            }
            write_pretty(&mut out, node, 0);
        }
        out.push('\n');
        out
    }
}

/// Strip a namespace prefix from a qualified name
pub fn local_name(name: &str) -> &str {
    match name.rfind(':') {
        Some(index) => &name[index + 1..],
        None => name,
    }
}

/// Decode raw character data, falling back to the raw form for unknown entities
pub fn decode_text(raw: &str) -> Cow<'_, str> {
    match unescape(raw) {
        Ok(text) => text,
        Err(_) => Cow::Borrowed(raw),
    }
}

/// Escape text for use as character data
pub fn encode_text(text: &str) -> Cow<'_, str> {
    partial_escape(text)
}

/// Parse an XML document into a tree
pub fn parse(content: &str) -> Result<XmlDocument, XliffError> {
    let content = content.trim_start_matches('\u{feff}');
    let mut reader = Reader::from_str(content);
    let mut stack: Vec<Element> = Vec::new();
    let mut document = XmlDocument::default();

    loop {
        let event = reader.read_event().map_err(|e| XliffError::Parse {
            position: reader.buffer_position(),
            message: e.to_string(),
        })?;
        let position = reader.buffer_position();

        let node = match event {
            Event::Start(start) => {
                stack.push(Element::from_start(&start, false, position)?);
                continue;
            }
            Event::End(_) => match stack.pop() {
                Some(element) => Node::Element(element),
                None => {
                    return Err(XliffError::Parse {
                        position,
                        message: "unexpected closing tag".to_string(),
                    });
                }
            },
            Event::Empty(start) => Node::Element(Element::from_start(&start, true, position)?),
            Event::Text(text) => Node::Text(String::from_utf8_lossy(&text).into_owned()),
            Event::CData(data) => Node::CData(String::from_utf8_lossy(&data).into_owned()),
            Event::Comment(comment) => {
                Node::Markup(format!("<!--{}-->", String::from_utf8_lossy(&comment)))
            }
            Event::Decl(decl) => Node::Markup(format!("<?{}?>", String::from_utf8_lossy(&decl))),
            Event::PI(pi) => Node::Markup(format!("<?{}?>", String::from_utf8_lossy(&pi))),
            Event::DocType(doctype) => {
                Node::Markup(format!("<!DOCTYPE {}>", String::from_utf8_lossy(&doctype)))
            }
            Event::Eof => break,
        };

        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => document.nodes.push(node),
        }
    }

    if let Some(open) = stack.last() {
        return Err(XliffError::Parse {
            position: content.len(),
            message: format!("unclosed element <{}>", open.name),
        });
    }

    Ok(document)
}

/// Re-serialize an XML text with indentation
pub fn pretty_print(content: &str) -> Result<String, XliffError> {
    Ok(parse(content)?.to_pretty_xml())
}

fn is_blank(node: &Node) -> bool {
    matches!(node, Node::Text(raw) if raw.trim().is_empty())
}

fn write_start_tag(out: &mut String, element: &Element) {
    out.push('<');
    out.push_str(&element.name);
    for (key, value) in &element.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        write_attribute_value(out, value);
        out.push('"');
    }
}

/// Escape an attribute value, keeping whitespace characters that attribute
/// normalization would otherwise turn into spaces
fn write_attribute_value(out: &mut String, value: &str) {
    for c in escape(value).chars() {
        match c {
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            other => out.push(other),
        }
    }
}

fn write_cdata(out: &mut String, data: &str) {
    out.push_str("<![CDATA[");
    out.push_str(&data.replace("]]>", "]]]]><![CDATA[>"));
    out.push_str("]]>");
}

fn write_compact(out: &mut String, node: &Node) {
    match node {
        Node::Element(element) => {
            write_start_tag(out, element);
            if element.self_closing && element.children.is_empty() {
                out.push_str("/>");
                return;
            }
            out.push('>');
            for child in &element.children {
                write_compact(out, child);
            }
            out.push_str("</");
            out.push_str(&element.name);
            out.push('>');
        }
        Node::Text(raw) => out.push_str(raw),
        Node::CData(data) => write_cdata(out, data),
        Node::Markup(raw) => out.push_str(raw),
    }
}

fn write_pretty(out: &mut String, node: &Node, depth: usize) {
    let Node::Element(element) = node else {
        match node {
            Node::Text(raw) => out.push_str(raw.trim()),
            other => write_compact(out, other),
        }
        return;
    };

    // Mixed content is significant, leave it as it was
    if element.has_text_content() || element.child_elements().next().is_none() {
        write_compact(out, node);
        return;
    }

    write_start_tag(out, element);
    out.push('>');
    for child in element.children.iter().filter(|child| !is_blank(child)) {
        out.push('\n');
        push_indent(out, depth + 1);
        write_pretty(out, child, depth + 1);
    }
    out.push('\n');
    push_indent(out, depth);
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}
