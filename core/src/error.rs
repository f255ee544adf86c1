//! Error types for the REST client core.
//!
//! # Design
//! A non-2xx status is not an error here: a 404 or 500 still produces a
//! normal `Response`. Errors only describe "no response obtained"
//! (`Transport`), a response the core cannot split (`MalformedResponse`),
//! and content that fails to decode. Empty content is not a decode error;
//! decoders report it as `Ok(None)` instead.

use thiserror::Error;

/// Errors returned by request execution, serialization and decoding.
#[derive(Debug, Error)]
pub enum Error {
    /// The transport could not produce a response.
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),

    /// The transport reported a header block longer than the message itself.
    #[error("malformed response: {header_size}-byte header block in a {len}-byte message")]
    MalformedResponse { header_size: usize, len: usize },

    /// The response body is not valid JSON.
    #[error("JSON decode failed: {0}")]
    JsonDecode(String),

    /// The response body is not a well-formed XML document.
    #[error("XML decode failed: {0}")]
    XmlDecode(String),

    /// The request payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// An associative JSON decode was asked for a top-level scalar.
    #[error("JSON document is not an object or array")]
    NotAMapping,

    /// A format name outside `json`, `xml` and `custom`.
    #[error("unknown resource format: {0:?}")]
    UnknownFormat(String),
}

/// Failures raised by a `Transport` before a complete response was obtained.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("invalid HTTP method: {0:?}")]
    InvalidMethod(String),

    /// A header line without a `:` separator, or with an illegal name/value.
    #[error("invalid header: {0:?}")]
    InvalidHeader(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("I/O error: {0}")]
    Io(String),

    /// The response body was larger than the configured limit, in bytes.
    #[error("response body exceeds {0} bytes")]
    BodyTooLarge(u64),

    #[error("{0}")]
    Other(String),
}

/// A specialized `Result` for the REST client core.
pub type Result<T> = std::result::Result<T, Error>;
