//! Content-negotiation types shared by the client, requests and responses.
//!
//! # Design
//! `ResourceFormat` is a closed set of three strategies. Names coming from
//! outside (header shortcuts, response construction, config files) go through
//! `ResourceFormat::from_name`, which deliberately maps anything unknown to
//! `Custom`; callers that want unknown names rejected use `str::parse`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::xml::{XmlDocument, XmlElement};

/// Declared format of a resource: drives default headers and decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceFormat {
    Json,
    Xml,
    #[default]
    Custom,
}

impl ResourceFormat {
    /// Lenient lookup: trims, ignores case, and falls back to `Custom`.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or(Self::Custom)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Custom => "custom",
        }
    }

    /// Built-in `Accept`/`Content-Type` pair for this format. `Custom` has none.
    pub fn default_headers(self) -> Option<Vec<String>> {
        let mime = match self {
            Self::Json => "application/json",
            Self::Xml => "application/xml",
            Self::Custom => return None,
        };
        Some(vec![format!("Accept:{mime}"), format!("Content-Type:{mime}")])
    }
}

impl FromStr for ResourceFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            "custom" => Ok(Self::Custom),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ResourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How `RestClient` picks the headers of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HeaderSpec {
    /// Built-in headers of the client's default format.
    #[default]
    Default,
    /// Built-in headers of the given format; the request declares that format.
    Format(ResourceFormat),
    /// Headers used verbatim; the request declares the client's default format.
    Explicit(Vec<String>),
}

impl From<ResourceFormat> for HeaderSpec {
    fn from(format: ResourceFormat) -> Self {
        Self::Format(format)
    }
}

/// Treats the string as a format name, see `ResourceFormat::from_name`.
impl From<&str> for HeaderSpec {
    fn from(name: &str) -> Self {
        Self::Format(ResourceFormat::from_name(name))
    }
}

impl From<Vec<String>> for HeaderSpec {
    fn from(headers: Vec<String>) -> Self {
        Self::Explicit(headers)
    }
}

/// Payload attached to a request built by `RestClient`.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestData {
    /// Serialized with `serde_json`.
    Json(Value),
    /// Serialized as a full XML document, declaration included.
    Dom(XmlDocument),
    /// Serialized as a bare XML element.
    Simple(XmlElement),
    /// Sent as-is.
    Text(String),
}

impl RequestData {
    /// Converts any serializable value into a JSON payload.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Renders the payload as the request body.
    pub fn formalize(self) -> Result<String> {
        match self {
            Self::Json(value) => {
                serde_json::to_string(&value).map_err(|e| Error::Serialization(e.to_string()))
            }
            Self::Dom(document) => document.to_xml(),
            Self::Simple(element) => element.to_xml(),
            Self::Text(text) => Ok(text),
        }
    }
}

impl From<Value> for RequestData {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<XmlDocument> for RequestData {
    fn from(document: XmlDocument) -> Self {
        Self::Dom(document)
    }
}

impl From<XmlElement> for RequestData {
    fn from(element: XmlElement) -> Self {
        Self::Simple(element)
    }
}

impl From<String> for RequestData {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for RequestData {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}
