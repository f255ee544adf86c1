//! A single HTTP request described as plain data.
//!
//! # Design
//! Setters are typed, so there is no "wrong kind of value" path to ignore.
//! The method is upper-cased on every assignment and cookies are serialized
//! to one `k=v; k=v` string as soon as they are set. Executing borrows the
//! request immutably and produces a fresh `Response`.

use indexmap::IndexMap;

use crate::error::Result;
use crate::http::{Transport, TransportCall};
use crate::response::Response;
use crate::shell::single_quote;
use crate::types::ResourceFormat;

/// Cookie input: a pre-joined string or ordered name/value pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cookies {
    Raw(String),
    Pairs(IndexMap<String, String>),
}

impl Cookies {
    pub fn pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Pairs(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    fn into_header_value(self) -> String {
        match self {
            Self::Raw(raw) => raw,
            Self::Pairs(pairs) => pairs
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

impl From<&str> for Cookies {
    fn from(raw: &str) -> Self {
        Self::Raw(raw.to_string())
    }
}

impl From<String> for Cookies {
    fn from(raw: String) -> Self {
        Self::Raw(raw)
    }
}

impl From<IndexMap<String, String>> for Cookies {
    fn from(pairs: IndexMap<String, String>) -> Self {
        Self::Pairs(pairs)
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Cookies {
    fn from(pairs: [(K, V); N]) -> Self {
        Self::pairs(pairs)
    }
}

/// An unexecuted HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    url: String,
    method: String,
    headers: Option<Vec<String>>,
    body: Option<String>,
    cookies: Option<String>,
    format: ResourceFormat,
}

impl Request {
    pub fn new(url: impl Into<String>, method: &str) -> Self {
        Self {
            url: url.into(),
            method: method.to_uppercase(),
            headers: None,
            body: None,
            cookies: None,
            format: ResourceFormat::default(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn headers(&self) -> Option<&[String]> {
        self.headers.as_deref()
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn cookies(&self) -> Option<&str> {
        self.cookies.as_deref()
    }

    pub fn format(&self) -> ResourceFormat {
        self.format
    }

    /// Replaces the header list; each entry is a `Name:Value` line.
    pub fn set_headers(&mut self, headers: Vec<String>) {
        self.headers = Some(headers);
    }

    pub fn set_content(&mut self, body: impl Into<String>) {
        self.body = Some(body.into());
    }

    pub fn set_method(&mut self, method: &str) {
        self.method = method.to_uppercase();
    }

    pub fn set_cookies(&mut self, cookies: impl Into<Cookies>) {
        self.cookies = Some(cookies.into().into_header_value());
    }

    pub fn set_format(&mut self, format: ResourceFormat) {
        self.format = format;
    }

    /// Sends the request through `transport` and wraps the result with the
    /// declared format. Any HTTP status yields `Ok`.
    pub fn execute<T: Transport + ?Sized>(&self, transport: &T) -> Result<Response> {
        self.execute_as(transport, self.format)
    }

    /// Like `execute`, decoding the response as `format` instead of the
    /// declared one.
    pub fn execute_as<T: Transport + ?Sized>(
        &self,
        transport: &T,
        format: ResourceFormat,
    ) -> Result<Response> {
        let call = TransportCall {
            method: &self.method,
            url: &self.url,
            headers: self.headers.as_deref().unwrap_or_default(),
            body: self.body.as_deref(),
            cookie: self.cookies.as_deref(),
        };
        tracing::debug!(method = %self.method, url = %self.url, %format, "executing request");

        let raw = transport.send(&call).inspect_err(|e| {
            tracing::warn!(method = %self.method, url = %self.url, error = %e, "transport failed");
        })?;
        let (head, body) = raw.split()?;

        let mut response = Response::new(body, raw.status, format);
        response.set_headers_from_string(&String::from_utf8_lossy(head));
        tracing::debug!(
            status = raw.status,
            header_size = raw.header_size,
            body_len = body.len(),
            "request completed"
        );
        Ok(response)
    }

    /// Renders an equivalent `curl` command line for debugging.
    ///
    /// Returns `None` if any value cannot be quoted for a POSIX shell.
    pub fn to_shell_command(&self) -> Option<String> {
        let is_token = self
            .method
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        let method = if is_token {
            self.method.clone()
        } else {
            single_quote(&self.method)?
        };

        let mut command = format!("curl -X {method}");
        if let Some(body) = &self.body {
            command.push_str(&format!(" -d {}", single_quote(body)?));
        }
        command.push_str(&format!(" {}", single_quote(&self.url)?));
        if let Some(cookies) = &self.cookies {
            command.push_str(&format!(" -b {}", single_quote(cookies)?));
        }
        for header in self.headers.iter().flatten() {
            command.push_str(&format!(" -H {}", single_quote(header)?));
        }
        Some(command)
    }
}
