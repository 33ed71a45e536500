//! Minimal XML element tree built on `quick-xml`.
//!
//! Feed documents are small enough to hold in memory, and the resolvers need
//! random access (first `title` child, every `item`, attribute lookup), so the
//! event stream is folded into an owned tree once per document.
//!
//! Text and CDATA are kept as distinct node kinds. The content decoder relies
//! on that distinction: CDATA data is never entity-processed, while text nodes
//! hold the result of exactly one XML unescape pass.

use std::borrow::Cow;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

/// SEC-003: Maximum element nesting depth accepted while building the tree.
const MAX_XML_DEPTH: usize = 256;

/// Errors produced while building the tree.
#[derive(Debug, Error)]
pub enum XmlError {
    /// Tokenizer rejected the input (bad syntax, unknown entity, mismatched tags).
    #[error("XML parse error: {0}")]
    Parse(#[from] quick_xml::Error),

    #[error("XML nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),

    #[error("element <{0}> is never closed")]
    Unclosed(String),

    #[error("document has no root element")]
    NoRoot,

    #[error("document has more than one root element")]
    MultipleRoots,

    #[error("invalid UTF-8 in element name or CDATA: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Serializing a subtree back to markup failed.
    #[error("failed to write markup: {0}")]
    Write(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Character data after one XML unescape pass.
    Text(String),
    /// Raw CDATA section content, untouched by entity processing.
    CData(String),
}

/// An element with its qualified name (`content:encoded`, `rdf:RDF`) as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    fn new(name: String, attributes: Vec<(String, String)>) -> Self {
        Self {
            name,
            attributes,
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Child elements, in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |element| element.name == name)
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.name == name)
    }

    /// Concatenated text and CDATA of all descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    pub fn trimmed_text(&self) -> String {
        self.text().trim().to_string()
    }

    /// True when any direct child is a CDATA section.
    pub fn has_cdata(&self) -> bool {
        self.children
            .iter()
            .any(|child| matches!(child, Node::CData(_)))
    }

    /// Serializes the children back to markup.
    ///
    /// Text nodes are written verbatim, without re-escaping. A text node that
    /// held `&lt;b&gt;` in the source therefore comes out as a real `<b>` tag,
    /// and a decoded `&amp;` comes out as a bare `&`.
    pub fn inner_xml(&self) -> Result<String, XmlError> {
        let mut writer = Writer::new(Vec::new());
        for child in &self.children {
            write_node(&mut writer, child)?;
        }
        String::from_utf8(writer.into_inner()).map_err(|e| XmlError::Utf8(e.utf8_error()))
    }
}

fn collect_text(element: &Element, out: &mut String) {
    for child in &element.children {
        match child {
            Node::Text(text) | Node::CData(text) => out.push_str(text),
            Node::Element(element) => collect_text(element, out),
        }
    }
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> std::io::Result<()> {
    match node {
        // Nested CDATA is emitted as its raw data; an HTML consumer would
        // otherwise discard a `<![CDATA[` section as a bogus comment.
        Node::Text(text) | Node::CData(text) => {
            writer.write_event(Event::Text(BytesText::from_escaped(text.as_str())))
        }
        Node::Element(element) => {
            let values: Vec<Cow<'_, str>> = element
                .attributes
                .iter()
                .map(|(_, value)| quote_attribute_value(value))
                .collect();
            let start = BytesStart::new(element.name.as_str()).with_attributes(
                element
                    .attributes
                    .iter()
                    .zip(&values)
                    .map(|((key, _), value)| (key.as_bytes(), value.as_bytes())),
            );

            if element.children.is_empty() {
                return writer.write_event(Event::Empty(start));
            }
            writer.write_event(Event::Start(start))?;
            for child in &element.children {
                write_node(writer, child)?;
            }
            writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))
        }
    }
}

/// Attribute values hold one decoded layer, like text nodes. Only the
/// delimiter quote is escaped so the value stays inside `"..."`.
fn quote_attribute_value(value: &str) -> Cow<'_, str> {
    if value.contains('"') {
        Cow::Owned(value.replace('"', "&quot;"))
    } else {
        Cow::Borrowed(value)
    }
}

/// Parses a complete document into its root element.
///
/// Comments, processing instructions and the DOCTYPE are dropped. Text
/// outside the root element is ignored.
pub fn parse_document(content: &str) -> Result<Element, XmlError> {
    // SEC-002: quick-xml (0.37) never expands <!ENTITY> declarations. Only the
    // five XML builtins and character references are resolved by `unescape()`;
    // anything else is an `EscapeError::UnrecognizedEntity` and the whole
    // document is rejected.
    let mut reader = Reader::from_str(content);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if stack.len() >= MAX_XML_DEPTH {
                    return Err(XmlError::MaxDepthExceeded(MAX_XML_DEPTH));
                }
                stack.push(start_element(&e, &reader)?);
            }
            Event::Empty(e) => {
                let element = start_element(&e, &reader)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                // quick-xml has already checked the end name against the open tag
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element)?;
                }
            }
            Event::Text(e) => {
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Text(e.unescape()?.into_owned()));
                }
            }
            Event::CData(e) => {
                if let Some(parent) = stack.last_mut() {
                    let data = std::str::from_utf8(&e)?;
                    parent.children.push(Node::CData(data.to_string()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(XmlError::Unclosed(open.name.clone()));
    }

    root.ok_or(XmlError::NoRoot)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => return Err(XmlError::MultipleRoots),
    }
    Ok(())
}

fn start_element(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<Element, XmlError> {
    let name = std::str::from_utf8(e.name().as_ref())?.to_string();
    let mut attributes = Vec::new();

    for attr_result in e.attributes() {
        let attr = match attr_result {
            Ok(attr) => attr,
            Err(err) => {
                tracing::debug!(element = %name, error = %err, "Skipping malformed XML attribute");
                continue;
            }
        };
        let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let value = attr.decode_and_unescape_value(reader.decoder())?.into_owned();
        attributes.push((key, value));
    }

    Ok(Element::new(name, attributes))
}
