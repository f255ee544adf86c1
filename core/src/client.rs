//! Stateless request builder bound to a base URL and default format.
//!
//! # Design
//! `RestClient` holds only `base_url` and `default_resource` and carries no
//! mutable state between calls. Header resolution is a pure function that
//! returns the headers together with the format they imply, and that pair is
//! threaded straight into the built `Request`, so headers and declared format
//! always agree and one client can be shared across threads. Building never
//! touches the network: the caller executes the returned `Request`.

use crate::config::ClientConfig;
use crate::error::Result;
use crate::request::Request;
use crate::types::{HeaderSpec, RequestData, ResourceFormat};
use crate::uri::Uri;

/// Target of a request, relative to the client's base URL.
#[derive(Debug, Clone, PartialEq)]
pub enum Service {
    Path(String),
    /// Rendered with its query string before being joined to the base URL.
    Uri(Uri),
}

impl Service {
    fn path(&self) -> String {
        match self {
            Self::Path(path) => path.clone(),
            Self::Uri(uri) => uri.render(),
        }
    }
}

impl From<&str> for Service {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<String> for Service {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

impl From<Uri> for Service {
    fn from(uri: Uri) -> Self {
        Self::Uri(uri)
    }
}

impl From<&Uri> for Service {
    fn from(uri: &Uri) -> Self {
        Self::Uri(uri.clone())
    }
}

/// Headers picked for a request and the format the request must declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHeaders {
    pub headers: Option<Vec<String>>,
    pub format: ResourceFormat,
}

/// Synchronous, stateless REST request builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestClient {
    base_url: String,
    default_resource: ResourceFormat,
}

impl RestClient {
    pub fn new(base_url: &str, default_resource: ResourceFormat) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            default_resource,
        }
    }

    /// Like `new`, with the default format given by name; unknown names mean
    /// `Custom`.
    pub fn with_format_name(base_url: &str, default_resource: &str) -> Self {
        Self::new(base_url, ResourceFormat::from_name(default_resource))
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.base_url, config.default_resource)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_resource(&self) -> ResourceFormat {
        self.default_resource
    }

    pub fn resolve_headers(&self, spec: HeaderSpec) -> ResolvedHeaders {
        match spec {
            HeaderSpec::Default => ResolvedHeaders {
                headers: self.default_resource.default_headers(),
                format: self.default_resource,
            },
            HeaderSpec::Format(format) => ResolvedHeaders {
                headers: format.default_headers(),
                format,
            },
            HeaderSpec::Explicit(headers) => ResolvedHeaders {
                headers: Some(headers),
                format: self.default_resource,
            },
        }
    }

    /// Joins the base URL and the service path with exactly one slash.
    pub fn service_url(&self, service: &Service) -> String {
        format!("{}/{}", self.base_url, service.path().trim_start_matches('/'))
    }

    pub fn get(
        &self,
        service: impl Into<Service>,
        headers: impl Into<HeaderSpec>,
        data: Option<RequestData>,
    ) -> Result<Request> {
        self.build_request(service, "GET", headers, data)
    }

    /// Same as `get`.
    pub fn read(
        &self,
        service: impl Into<Service>,
        headers: impl Into<HeaderSpec>,
        data: Option<RequestData>,
    ) -> Result<Request> {
        self.get(service, headers, data)
    }

    pub fn post(
        &self,
        service: impl Into<Service>,
        headers: impl Into<HeaderSpec>,
        data: Option<RequestData>,
    ) -> Result<Request> {
        self.build_request(service, "POST", headers, data)
    }

    /// Same as `post`.
    pub fn create(
        &self,
        service: impl Into<Service>,
        headers: impl Into<HeaderSpec>,
        data: Option<RequestData>,
    ) -> Result<Request> {
        self.post(service, headers, data)
    }

    pub fn put(
        &self,
        service: impl Into<Service>,
        headers: impl Into<HeaderSpec>,
        data: Option<RequestData>,
    ) -> Result<Request> {
        self.build_request(service, "PUT", headers, data)
    }

    /// Same as `put`.
    pub fn update(
        &self,
        service: impl Into<Service>,
        headers: impl Into<HeaderSpec>,
        data: Option<RequestData>,
    ) -> Result<Request> {
        self.put(service, headers, data)
    }

    pub fn delete(
        &self,
        service: impl Into<Service>,
        headers: impl Into<HeaderSpec>,
    ) -> Result<Request> {
        self.build_request(service, "DELETE", headers, None)
    }

    /// Builds an unexecuted request for any method.
    ///
    /// Non-empty resolved headers are attached, `data` is serialized into the
    /// body, and the request declares the format the headers were resolved
    /// for. Fails only if `data` cannot be serialized.
    pub fn build_request(
        &self,
        service: impl Into<Service>,
        method: &str,
        headers: impl Into<HeaderSpec>,
        data: Option<RequestData>,
    ) -> Result<Request> {
        let url = self.service_url(&service.into());
        let mut request = Request::new(url, method);

        let resolved = self.resolve_headers(headers.into());
        if let Some(headers) = resolved.headers.filter(|h| !h.is_empty()) {
            request.set_headers(headers);
        }
        if let Some(data) = data {
            request.set_content(data.formalize()?);
        }
        request.set_format(resolved.format);

        tracing::debug!(
            method = request.method(),
            url = request.url(),
            format = %resolved.format,
            "built request"
        );
        Ok(request)
    }
}
