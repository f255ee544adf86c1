//! Transport boundary types for the host-does-IO pattern.
//!
//! # Design
//! The core never opens a socket. `Request::execute` describes the call as a
//! `TransportCall` and hands it to a `Transport`, which returns the status
//! code and the raw message (header block followed by body) together with the
//! header block length. Splitting the message stays in the core so every
//! adapter, including test doubles, gets identical header handling.

use crate::error::{Error, Result, TransportError};

/// One outgoing HTTP call, borrowed from a `Request`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportCall<'a> {
    /// Upper-cased method name.
    pub method: &'a str,
    pub url: &'a str,
    /// `Name:Value` lines, possibly empty.
    pub headers: &'a [String],
    pub body: Option<&'a str>,
    /// Value for a single `Cookie` header.
    pub cookie: Option<&'a str>,
}

/// What a transport returns when a response was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Length in bytes of the header block at the start of `message`.
    pub header_size: usize,
    /// Header block immediately followed by the body.
    pub message: Vec<u8>,
}

impl RawResponse {
    /// Builds the raw message from its two parts.
    pub fn new(status: u16, header_block: &str, body: &[u8]) -> Self {
        let mut message = Vec::with_capacity(header_block.len() + body.len());
        message.extend_from_slice(header_block.as_bytes());
        message.extend_from_slice(body);
        Self {
            status,
            header_size: header_block.len(),
            message,
        }
    }

    /// Splits the message into header block and body.
    pub fn split(&self) -> Result<(&[u8], &[u8])> {
        if self.header_size > self.message.len() {
            return Err(Error::MalformedResponse {
                header_size: self.header_size,
                len: self.message.len(),
            });
        }
        Ok(self.message.split_at(self.header_size))
    }
}

/// Performs one blocking HTTP exchange.
///
/// Implementations must not follow redirects unless configured to, and must
/// return non-2xx responses as `Ok`: only "no response obtained" is an error.
pub trait Transport {
    fn send(&self, call: &TransportCall<'_>) -> std::result::Result<RawResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, call: &TransportCall<'_>) -> std::result::Result<RawResponse, TransportError> {
        (**self).send(call)
    }
}

/// Splits a `Name:Value` header line at the first colon, trimming both parts.
pub fn split_header_line(line: &str) -> std::result::Result<(&str, &str), TransportError> {
    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| TransportError::InvalidHeader(line.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(TransportError::InvalidHeader(line.to_string()));
    }
    Ok((name, value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_separates_headers_from_body() {
        let raw = RawResponse::new(200, "HTTP/1.1 200 OK\r\nA: b\r\n\r\n", b"{\"x\":1}");
        let (head, body) = raw.split().unwrap();
        assert_eq!(head, b"HTTP/1.1 200 OK\r\nA: b\r\n\r\n");
        assert_eq!(body, b"{\"x\":1}");
    }

    #[test]
    fn split_rejects_oversized_header_block() {
        let raw = RawResponse {
            status: 200,
            header_size: 10,
            message: b"short".to_vec(),
        };
        let err = raw.split().unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { header_size: 10, len: 5 }));
    }

    #[test]
    fn header_line_splits_on_first_colon() {
        assert_eq!(
            split_header_line("Location: http://a.test:8080/x").unwrap(),
            ("Location", "http://a.test:8080/x")
        );
        assert_eq!(
            split_header_line("Accept:application/json").unwrap(),
            ("Accept", "application/json")
        );
    }

    #[test]
    fn header_line_without_colon_is_invalid() {
        assert!(matches!(
            split_header_line("no separator"),
            Err(TransportError::InvalidHeader(_))
        ));
        assert!(split_header_line(": value").is_err());
    }
}
