//! Typed wrapper around a completed HTTP exchange.
//!
//! # Design
//! The decoding strategy is chosen only by the declared `ResourceFormat`,
//! never by sniffing the body. Decoders report three outcomes: `Ok(None)` for
//! empty content, `Err` for malformed content, `Ok(Some(_))` otherwise, so a
//! literal JSON `null` body is distinguishable from an empty one.
//!
//! The body is kept as the bytes received. Nothing is assumed about its
//! encoding until a decoder runs, so binary and non-UTF-8 payloads survive.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::ResourceFormat;
use crate::xml::{XmlDocument, XmlElement};

/// Shape of a decoded JSON body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonMode {
    /// A `serde_json::Value` tree accessed like an object.
    #[default]
    Object,
    /// A key-ordered mapping of the top-level entries.
    Assoc,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsonContent {
    Object(Value),
    /// Object entries in document order, or array items keyed `"0"`, `"1"`, ...
    Assoc(IndexMap<String, Value>),
}

/// Requested XML representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XmlKind {
    /// Full mutable document.
    #[default]
    Dom,
    /// Root element only, for reading.
    Simple,
    /// No parsing: the raw bytes are returned unchanged.
    Raw,
}

impl XmlKind {
    /// `dom` and `simple` (trimmed, any case); every other name means `Raw`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "dom" => Self::Dom,
            "simple" => Self::Simple,
            _ => Self::Raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum XmlContent {
    Dom(XmlDocument),
    Simple(XmlElement),
    Raw(Vec<u8>),
}

/// Optional argument to `Response::content`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentArg {
    Json(JsonMode),
    Xml(XmlKind),
}

/// Result of the format-driven `Response::content` dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Content<'a> {
    Json(Option<JsonContent>),
    Xml(Option<XmlContent>),
    Raw(&'a [u8]),
}

/// A completed response: status, header lines, body and declared format.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    content: Vec<u8>,
    status: u16,
    format: ResourceFormat,
    headers: Vec<String>,
}

impl Response {
    pub fn new(content: impl Into<Vec<u8>>, status: u16, format: ResourceFormat) -> Self {
        Self {
            content: content.into(),
            status,
            format,
            headers: Vec::new(),
        }
    }

    /// Like `new`, with the format given by name (see `ResourceFormat::from_name`).
    pub fn with_format_name(content: impl Into<Vec<u8>>, status: u16, format: &str) -> Self {
        Self::new(content, status, ResourceFormat::from_name(format))
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn status_matches(&self, code: u16) -> bool {
        self.status == code
    }

    pub fn format(&self) -> ResourceFormat {
        self.format
    }

    /// The body as text, or `None` when it is not valid UTF-8.
    pub fn raw(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }

    /// The body exactly as received.
    pub fn raw_bytes(&self) -> &[u8] {
        &self.content
    }

    /// Trimmed, non-empty header lines in received order, status line included.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Value of the first `Name: value` line whose name matches, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }

    /// Replaces the header list with the lines of a raw header block.
    pub fn set_headers_from_string(&mut self, raw: &str) {
        self.headers = raw
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
    }

    pub fn decode_json(&self, mode: JsonMode) -> Result<Option<JsonContent>> {
        if self.is_empty() {
            return Ok(None);
        }
        let value: Value = serde_json::from_slice(&self.content).map_err(|e| {
            tracing::trace!(error = %e, "response body is not valid JSON");
            Error::JsonDecode(e.to_string())
        })?;
        let content = match mode {
            JsonMode::Object => JsonContent::Object(value),
            JsonMode::Assoc => JsonContent::Assoc(into_assoc(value)?),
        };
        Ok(Some(content))
    }

    /// Deserializes the body into `T`; `Ok(None)` for empty content.
    pub fn decode_json_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        if self.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(&self.content)
            .map(Some)
            .map_err(|e| Error::JsonDecode(e.to_string()))
    }

    /// `Raw` returns the bytes unchanged without checking they are XML.
    /// Other kinds honour the encoding named in the XML declaration.
    pub fn decode_xml(&self, kind: XmlKind) -> Result<Option<XmlContent>> {
        if kind == XmlKind::Raw {
            return Ok(Some(XmlContent::Raw(self.content.clone())));
        }
        if self.is_empty() {
            return Ok(None);
        }
        let document = XmlDocument::parse_bytes(&self.content).inspect_err(|e| {
            tracing::trace!(error = %e, "response body is not well-formed XML");
        })?;
        Ok(Some(match kind {
            XmlKind::Simple => XmlContent::Simple(document.into_root()),
            _ => XmlContent::Dom(document),
        }))
    }

    /// Decodes according to the declared format.
    ///
    /// JSON defaults to `JsonMode::Object` and XML to `XmlKind::Dom`; an
    /// argument for the other format is ignored, as is any argument for
    /// `Custom`, which always yields the raw content.
    pub fn content(&self, arg: Option<ContentArg>) -> Result<Content<'_>> {
        match self.format {
            ResourceFormat::Json => {
                let mode = match arg {
                    Some(ContentArg::Json(mode)) => mode,
                    _ => JsonMode::default(),
                };
                self.decode_json(mode).map(Content::Json)
            }
            ResourceFormat::Xml => {
                let kind = match arg {
                    Some(ContentArg::Xml(kind)) => kind,
                    _ => XmlKind::default(),
                };
                self.decode_xml(kind).map(Content::Xml)
            }
            ResourceFormat::Custom => Ok(Content::Raw(&self.content)),
        }
    }

    fn is_empty(&self) -> bool {
        self.content.iter().all(u8::is_ascii_whitespace)
    }
}

fn into_assoc(value: Value) -> Result<IndexMap<String, Value>> {
    match value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        Value::Array(items) => Ok(items
            .into_iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), item))
            .collect()),
        _ => Err(Error::NotAMapping),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn format_name_is_case_insensitive() {
        assert_eq!(Response::with_format_name("", 200, "JSON").format(), ResourceFormat::Json);
        assert_eq!(Response::with_format_name("", 200, " xml\n").format(), ResourceFormat::Xml);
        assert_eq!(Response::with_format_name("", 200, "html").format(), ResourceFormat::Custom);
    }

    #[test]
    fn status_matches_compares_codes() {
        let response = Response::new("", 404, ResourceFormat::Custom);
        assert!(response.status_matches(404));
        assert!(!response.status_matches(200));
        assert_eq!(response.status(), 404);
    }

    #[test]
    fn content_defaults_to_object_json() {
        let response = Response::with_format_name(r#"{"x":1}"#, 200, "JSON");
        let content = response.content(None).unwrap();
        assert_eq!(content, Content::Json(Some(JsonContent::Object(json!({"x": 1})))));
    }

    #[test]
    fn assoc_mode_keeps_key_order() {
        let response = Response::new(r#"{"b":1,"a":2}"#, 200, ResourceFormat::Json);
        let Some(JsonContent::Assoc(map)) = response.decode_json(JsonMode::Assoc).unwrap() else {
            panic!("expected associative content");
        };
        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn assoc_mode_keys_arrays_by_index() {
        let response = Response::new(r#"["x","y"]"#, 200, ResourceFormat::Json);
        let Some(JsonContent::Assoc(map)) = response.decode_json(JsonMode::Assoc).unwrap() else {
            panic!("expected associative content");
        };
        assert_eq!(map["0"], json!("x"));
        assert_eq!(map["1"], json!("y"));
    }

    #[test]
    fn assoc_mode_rejects_scalars() {
        let response = Response::new("42", 200, ResourceFormat::Json);
        assert!(matches!(response.decode_json(JsonMode::Assoc), Err(Error::NotAMapping)));
    }

    #[test]
    fn empty_null_and_malformed_json_are_distinct() {
        let empty = Response::new("  ", 204, ResourceFormat::Json);
        assert_eq!(empty.decode_json(JsonMode::Object).unwrap(), None);

        let null = Response::new("null", 200, ResourceFormat::Json);
        assert_eq!(
            null.decode_json(JsonMode::Object).unwrap(),
            Some(JsonContent::Object(Value::Null))
        );

        let malformed = Response::new("{\"x\":", 200, ResourceFormat::Json);
        assert!(matches!(malformed.decode_json(JsonMode::Object), Err(Error::JsonDecode(_))));
    }

    #[test]
    fn decode_json_as_typed_struct() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct User {
            id: u32,
            name: String,
        }
        let response = Response::new(r#"{"id":5,"name":"x"}"#, 200, ResourceFormat::Json);
        let user: User = response.decode_json_as().unwrap().unwrap();
        assert_eq!(user, User { id: 5, name: "x".to_string() });
    }

    #[test]
    fn xml_content_defaults_to_dom() {
        let body = "<user id=\"5\"><name>x</name></user>";
        let response = Response::new(body, 200, ResourceFormat::Xml);
        let Content::Xml(Some(XmlContent::Dom(doc))) = response.content(None).unwrap() else {
            panic!("expected a DOM document");
        };
        assert_eq!(doc.root().attribute("id"), Some("5"));
    }

    #[test]
    fn xml_simple_returns_root_element() {
        let response = Response::new("<user><name>x</name></user>", 200, ResourceFormat::Xml);
        let content = response.content(Some(ContentArg::Xml(XmlKind::Simple))).unwrap();
        let Content::Xml(Some(XmlContent::Simple(root))) = content else {
            panic!("expected a simple element");
        };
        assert_eq!(root.child("name").unwrap().text(), "x");
    }

    #[test]
    fn unknown_xml_kind_passes_raw_content_through() {
        let response = Response::new("not xml at all", 200, ResourceFormat::Xml);
        let kind = XmlKind::from_name("sax");
        assert_eq!(kind, XmlKind::Raw);
        assert_eq!(
            response.decode_xml(kind).unwrap(),
            Some(XmlContent::Raw(b"not xml at all".to_vec()))
        );
    }

    #[test]
    fn non_utf8_bodies_stay_intact() {
        let latin1 = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><city>Montr\xE9al</city>";
        let response = Response::new(&latin1[..], 200, ResourceFormat::Xml);
        assert_eq!(response.raw_bytes(), latin1);
        assert_eq!(response.raw(), None);
        let Some(XmlContent::Simple(root)) = response.decode_xml(XmlKind::Simple).unwrap() else {
            panic!("expected a simple element");
        };
        assert_eq!(root.text(), "Montr\u{e9}al");

        let json = Response::new(&b"{\"x\":\"\xFF\"}"[..], 200, ResourceFormat::Json);
        assert!(matches!(json.decode_json(JsonMode::Object), Err(Error::JsonDecode(_))));
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let response = Response::new("<a><b></a>", 200, ResourceFormat::Xml);
        assert!(matches!(response.decode_xml(XmlKind::Dom), Err(Error::XmlDecode(_))));
        let empty = Response::new("", 200, ResourceFormat::Xml);
        assert_eq!(empty.decode_xml(XmlKind::Simple).unwrap(), None);
    }

    #[test]
    fn custom_format_ignores_argument() {
        let response = Response::new("{\"x\":1}", 200, ResourceFormat::Custom);
        let content = response.content(Some(ContentArg::Json(JsonMode::Assoc))).unwrap();
        assert_eq!(content, Content::Raw(b"{\"x\":1}"));
    }

    #[test]
    fn mismatched_argument_falls_back_to_format_default() {
        let response = Response::new("[1]", 200, ResourceFormat::Json);
        let content = response.content(Some(ContentArg::Xml(XmlKind::Simple))).unwrap();
        assert_eq!(content, Content::Json(Some(JsonContent::Object(json!([1])))));
    }

    #[test]
    fn headers_from_string_are_trimmed_and_filtered() {
        let mut response = Response::new("", 200, ResourceFormat::Custom);
        response.set_headers_from_string(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\n  X-A:  1 \r\n",
        );
        assert_eq!(
            response.headers(),
            ["HTTP/1.1 200 OK", "Content-Type: text/plain", "X-A:  1"]
        );
        assert_eq!(response.header("content-type"), Some("text/plain"));
        assert_eq!(response.header("x-a"), Some("1"));
        assert_eq!(response.header("missing"), None);
    }
}
