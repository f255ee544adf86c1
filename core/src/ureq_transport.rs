//! Blocking `Transport` backed by a `ureq` agent.
//!
//! The agent never turns 4xx/5xx statuses into errors and, unless the config
//! asks for it, never follows redirects: a 3xx comes back as a normal
//! response. ureq hands back parsed headers, so the raw header block is
//! rebuilt (`HTTP/x.y CODE REASON` line, `Name: value` lines, blank line)
//! before the core splits it. The body is buffered whole unless
//! `TransportConfig::max_body_size` caps it.

use std::io::ErrorKind;

use ureq::http::{self, Method};
use ureq::Agent;

use crate::config::TransportConfig;
use crate::error::TransportError;
use crate::http::{split_header_line, RawResponse, Transport, TransportCall};

#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
    user_agent: Option<String>,
    max_body_size: Option<u64>,
}

impl UreqTransport {
    pub fn new(config: &TransportConfig) -> Self {
        let max_redirects = if config.follow_redirects {
            config.max_redirects
        } else {
            0
        };
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(max_redirects)
            .max_redirects_will_error(false)
            .allow_non_standard_methods(true)
            .timeout_global(config.timeout)
            .build()
            .new_agent();
        Self {
            agent,
            user_agent: config.user_agent.clone(),
            max_body_size: config.max_body_size,
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(&TransportConfig::default())
    }
}

impl Transport for UreqTransport {
    fn send(&self, call: &TransportCall<'_>) -> Result<RawResponse, TransportError> {
        let method = Method::from_bytes(call.method.as_bytes())
            .map_err(|_| TransportError::InvalidMethod(call.method.to_string()))?;

        let mut builder = http::Request::builder().method(method).uri(call.url);
        let mut has_user_agent = false;
        for line in call.headers {
            let (name, value) = split_header_line(line)?;
            has_user_agent |= name.eq_ignore_ascii_case("user-agent");
            builder = builder.header(name, value);
        }
        if let Some(cookie) = call.cookie {
            builder = builder.header("Cookie", cookie);
        }
        if let (Some(user_agent), false) = (&self.user_agent, has_user_agent) {
            builder = builder.header("User-Agent", user_agent.as_str());
        }

        let sent = match call.body {
            Some(body) => builder
                .body(body.to_string())
                .map_err(build_error)
                .map(|request| self.agent.run(request)),
            None => builder
                .body(())
                .map_err(build_error)
                .map(|request| self.agent.run(request)),
        };
        let mut response = sent?.map_err(run_error)?;

        let status = response.status();
        let mut head = format!(
            "{:?} {} {}\r\n",
            response.version(),
            status.as_u16(),
            status.canonical_reason().unwrap_or_default()
        );
        for (name, value) in response.headers() {
            let value = String::from_utf8_lossy(value.as_bytes());
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        head.push_str("\r\n");

        let body = response
            .body_mut()
            .with_config()
            .limit(self.max_body_size.unwrap_or(u64::MAX))
            .read_to_vec()
            .map_err(run_error)?;
        Ok(RawResponse::new(status.as_u16(), &head, &body))
    }
}

fn build_error(err: http::Error) -> TransportError {
    if err.get_ref().is::<http::uri::InvalidUri>() {
        TransportError::InvalidUrl(err.to_string())
    } else {
        TransportError::InvalidHeader(err.to_string())
    }
}

fn run_error(err: ureq::Error) -> TransportError {
    match &err {
        ureq::Error::Timeout(_) => TransportError::Timeout,
        ureq::Error::BadUri(uri) => TransportError::InvalidUrl(uri.clone()),
        ureq::Error::BodyExceedsLimit(limit) => TransportError::BodyTooLarge(*limit),
        ureq::Error::Io(io) => match io.kind() {
            ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected => TransportError::Connection(io.to_string()),
            ErrorKind::TimedOut => TransportError::Timeout,
            _ => TransportError::Io(io.to_string()),
        },
        _ => TransportError::Other(err.to_string()),
    }
}
