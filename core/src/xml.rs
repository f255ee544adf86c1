//! XML trees for response decoding and request payloads.
//!
//! `XmlDocument` is the full, mutable document (declaration plus root) handed
//! out for `dom` decoding. `XmlElement` on its own is the read-oriented view
//! handed out for `simple` decoding. Both parse with `quick-xml` and
//! serialize back to text for request bodies.
//!
//! Text nodes are kept as written, whitespace included, so mixed content
//! round-trips. Only whitespace outside the root element is dropped.

use std::fmt;
use std::io::Write;

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::encoding::Decoder;
use quick_xml::{Reader, Writer};

use crate::error::{Error, Result};

/// A parsed XML document: declaration data plus a single root element.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    version: String,
    encoding: Option<String>,
    standalone: Option<bool>,
    root: XmlElement,
}

impl XmlDocument {
    /// Creates an empty document whose root element is named `root_name`.
    pub fn new(root_name: impl Into<String>) -> Self {
        Self::with_root(XmlElement::new(root_name))
    }

    pub fn with_root(root: XmlElement) -> Self {
        Self {
            version: "1.0".to_string(),
            encoding: Some("UTF-8".to_string()),
            standalone: None,
            root,
        }
    }

    /// Parses `input`, rejecting mismatched or unclosed tags, text outside the
    /// root, and documents with zero or several root elements.
    pub fn parse(input: &str) -> Result<Self> {
        parse_document(Reader::from_str(input))
    }

    /// Like `parse`, for raw bytes in the encoding named by the declaration
    /// (UTF-8 when there is none).
    pub fn parse_bytes(input: &[u8]) -> Result<Self> {
        parse_document(Reader::from_reader(input))
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    pub fn standalone(&self) -> Option<bool> {
        self.standalone
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut XmlElement {
        &mut self.root
    }

    pub fn set_root(&mut self, root: XmlElement) {
        self.root = root;
    }

    pub fn into_root(self) -> XmlElement {
        self.root
    }

    /// Serializes the declaration, a newline, and the root element.
    ///
    /// The output is a Rust string, so a declared encoding is written as
    /// `UTF-8` whatever the source document used.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        let standalone = self.standalone.map(|s| if s { "yes" } else { "no" });
        let encoding = self.encoding.as_ref().map(|_| "UTF-8");
        let decl = BytesDecl::new(&self.version, encoding, standalone);
        writer.write_event(Event::Decl(decl)).map_err(write_error)?;
        writer
            .write_event(Event::Text(BytesText::new("\n")))
            .map_err(write_error)?;
        self.root.write_to(&mut writer)?;
        into_string(writer)
    }
}

/// An element with ordered attributes and child nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

/// A child of an `XmlElement`.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    CData(String),
    Comment(String),
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Parses `input` and returns its root element.
    pub fn parse(input: &str) -> Result<Self> {
        XmlDocument::parse(input).map(XmlDocument::into_root)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Sets an attribute, replacing the value in place if it already exists.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(key, _)| key == name)?;
        Some(self.attributes.remove(index).1)
    }

    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    /// First child element named `name`.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.child_elements().find(|element| element.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.children.iter_mut().find_map(|node| match node {
            XmlNode::Element(element) if element.name == name => Some(element),
            _ => None,
        })
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.child_elements().filter(move |element| element.name == name)
    }

    /// Concatenated text and CDATA of the direct children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(text) | XmlNode::CData(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn add_child(&mut self, node: impl Into<XmlNode>) {
        self.children.push(node.into());
    }

    /// Appends `<name>text</name>`.
    pub fn add_child_text(&mut self, name: impl Into<String>, text: impl Into<String>) {
        let mut child = XmlElement::new(name);
        child.add_child(XmlNode::Text(text.into()));
        self.add_child(child);
    }

    /// Replaces every text and CDATA child with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children
            .retain(|node| !matches!(node, XmlNode::Text(_) | XmlNode::CData(_)));
        self.children.push(XmlNode::Text(text.into()));
    }

    pub fn remove_child(&mut self, index: usize) -> Option<XmlNode> {
        (index < self.children.len()).then(|| self.children.remove(index))
    }

    /// Serializes the element without an XML declaration.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        self.write_to(&mut writer)?;
        into_string(writer)
    }

    fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() {
            return writer.write_event(Event::Empty(start)).map_err(write_error);
        }

        writer.write_event(Event::Start(start)).map_err(write_error)?;
        for child in &self.children {
            let event = match child {
                XmlNode::Element(element) => {
                    element.write_to(writer)?;
                    continue;
                }
                XmlNode::Text(text) => Event::Text(BytesText::new(text)),
                XmlNode::CData(data) => Event::CData(BytesCData::new(data.as_str())),
                XmlNode::Comment(comment) => {
                    Event::Comment(BytesText::from_escaped(comment.as_str()))
                }
            };
            writer.write_event(event).map_err(write_error)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(write_error)
    }
}

impl From<XmlElement> for XmlNode {
    fn from(element: XmlElement) -> Self {
        XmlNode::Element(element)
    }
}

impl From<&str> for XmlNode {
    fn from(text: &str) -> Self {
        XmlNode::Text(text.to_string())
    }
}

impl From<String> for XmlNode {
    fn from(text: String) -> Self {
        XmlNode::Text(text)
    }
}

impl fmt::Display for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let xml = self.to_xml().map_err(|_| fmt::Error)?;
        f.write_str(&xml)
    }
}

fn parse_document(mut reader: Reader<&[u8]>) -> Result<XmlDocument> {
    let mut version = "1.0".to_string();
    let mut encoding = None;
    let mut standalone = None;
    let mut root: Option<XmlElement> = None;
    let mut stack: Vec<XmlElement> = Vec::new();

    loop {
        match reader.read_event().map_err(decode_error)? {
            Event::Eof => break,
            Event::Decl(decl) => {
                let value = decl.version().map_err(decode_error)?;
                version = String::from_utf8_lossy(&value).into_owned();
                if let Some(value) = decl.encoding() {
                    let value = value.map_err(decode_error)?;
                    encoding = Some(String::from_utf8_lossy(&value).into_owned());
                }
                if let Some(value) = decl.standalone() {
                    let value = value.map_err(decode_error)?;
                    standalone = Some(&*value == b"yes");
                }
            }
            Event::Start(start) => stack.push(element_from(&start, reader.decoder())?),
            Event::Empty(empty) => {
                let element = element_from(&empty, reader.decoder())?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| decode_error("closing tag without opening tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let content = text.unescape().map_err(decode_error)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Text(content.into_owned())),
                    None if content.trim().is_empty() => {}
                    None => return Err(decode_error("text outside the root element")),
                }
            }
            Event::CData(data) => {
                let content = reader.decoder().decode(&data).map_err(decode_error)?.into_owned();
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::CData(content)),
                    None => return Err(decode_error("CDATA outside the root element")),
                }
            }
            Event::Comment(comment) => {
                if let Some(parent) = stack.last_mut() {
                    let content = reader.decoder().decode(&comment).map_err(decode_error)?;
                    parent.children.push(XmlNode::Comment(content.into_owned()));
                }
            }
            // processing instructions and doctype declarations are dropped
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(decode_error(format!("unclosed element <{}>", open.name)));
    }
    let root = root.ok_or_else(|| decode_error("document has no root element"))?;

    Ok(XmlDocument {
        version,
        encoding,
        standalone,
        root,
    })
}

fn element_from(start: &BytesStart<'_>, decoder: Decoder) -> Result<XmlElement> {
    let qname = start.name();
    let name = decoder.decode(qname.as_ref()).map_err(decode_error)?;
    let mut element = XmlElement::new(name.into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(decode_error)?;
        let key = decoder.decode(attr.key.as_ref()).map_err(decode_error)?.into_owned();
        let value = attr.decode_and_unescape_value(decoder).map_err(decode_error)?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(XmlNode::Element(element));
        return Ok(());
    }
    if root.is_some() {
        return Err(decode_error("multiple root elements"));
    }
    *root = Some(element);
    Ok(())
}

fn into_string(writer: Writer<Vec<u8>>) -> Result<String> {
    String::from_utf8(writer.into_inner()).map_err(|e| Error::Serialization(e.to_string()))
}

fn decode_error(err: impl fmt::Display) -> Error {
    Error::XmlDecode(err.to_string())
}

fn write_error(err: impl fmt::Display) -> Error {
    Error::Serialization(err.to_string())
}
