//! Lightweight REST client core.
//!
//! # Overview
//! Builds `Request` values (URL, method, headers, body, cookies, declared
//! format), hands them to a `Transport` for one blocking round trip, and wraps
//! the result in a `Response` that decodes JSON, XML or raw content according
//! to the declared format.
//!
//! # Design
//! - `RestClient` is stateless: building a request returns the request and
//!   never records anything on the client, so one instance can be shared.
//! - The network lives behind the `Transport` trait (host-does-IO pattern).
//!   `UreqTransport` is provided behind the default `ureq` feature.
//! - Any HTTP status is a normal `Response`; only a missing response is an
//!   error.
//!
//! ```no_run
//! use resty_core::{HeaderSpec, ResourceFormat, RestClient, TransportConfig, UreqTransport};
//!
//! let client = RestClient::new("http://api.test", ResourceFormat::Json);
//! let transport = UreqTransport::new(&TransportConfig::default());
//! let response = client.get("users/5", HeaderSpec::Default, None)?.execute(&transport)?;
//! if response.status_matches(200) {
//!     println!("{:?}", response.content(None)?);
//! }
//! # Ok::<(), resty_core::Error>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod request;
pub mod response;
pub mod shell;
pub mod types;
pub mod uri;
pub mod xml;

#[cfg(feature = "ureq")]
pub mod ureq_transport;

pub use client::{ResolvedHeaders, RestClient, Service};
pub use config::{ClientConfig, TransportConfig};
pub use error::{Error, Result, TransportError};
pub use http::{RawResponse, Transport, TransportCall};
pub use request::{Cookies, Request};
pub use response::{Content, ContentArg, JsonContent, JsonMode, Response, XmlContent, XmlKind};
pub use types::{HeaderSpec, RequestData, ResourceFormat};
pub use uri::{ParamValue, Scalar, Uri};
pub use xml::{XmlDocument, XmlElement, XmlNode};

#[cfg(feature = "ureq")]
pub use ureq_transport::UreqTransport;
