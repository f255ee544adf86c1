//! Client and transport settings.
//!
//! Both structs deserialize with serde so they can be embedded in an
//! application's own configuration file. Missing transport fields take the
//! defaults below: redirects are not followed, requests time out after
//! 30 seconds, response bodies are buffered whatever their size, and TLS
//! certificates are always verified.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::ResourceFormat;

/// Settings for `RestClient::from_config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(default)]
    pub default_resource: ResourceFormat,
}

/// Settings for the bundled transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub follow_redirects: bool,
    /// Upper bound on redirects; only used when `follow_redirects` is set.
    pub max_redirects: u32,
    /// Whole-exchange timeout. `None` waits indefinitely.
    #[serde(rename = "timeout_secs", with = "opt_secs")]
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
    /// Largest response body, in bytes, that will be buffered. `None` means
    /// no limit.
    pub max_body_size: Option<u64>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            follow_redirects: false,
            max_redirects: 10,
            timeout: Some(Duration::from_secs(30)),
            user_agent: None,
            max_body_size: None,
        }
    }
}

mod opt_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&duration.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
    }
}
