use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use url::Url;

/// The path of the Warp10 ingestion API, relative to the configured host.
const UPDATE_PATH: &str = "/api/v0/update";

/// An error raised for invalid publisher configuration.
///
/// Configuration is validated once when the publisher is created. A
/// configuration failure is an unrecoverable setup condition, never a
/// per-publish error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The ingress host is missing or empty.
    #[error("ingress host must not be empty")]
    EmptyHost,

    /// The ingress host does not parse as an absolute URL.
    #[error("invalid ingress host '{host}'")]
    InvalidHost {
        /// The rejected host value.
        host: String,
        /// The underlying URL parse error.
        #[source]
        source: url::ParseError,
    },

    /// The ingress host uses a scheme other than `http` or `https`.
    #[error("ingress host '{0}' must use http or https")]
    UnsupportedScheme(String),

    /// The write token is missing or empty.
    #[error("write token must not be empty")]
    EmptyToken,

    /// The HTTP client could not be initialized.
    #[error("failed to initialize HTTP client")]
    Client(#[from] reqwest::Error),
}

/// Configuration of the Warp10 publisher.
///
/// Both settings are required and carry no defaults. The configuration
/// implements `serde` traits, so it can be declared through the host
/// framework's configuration surface or loaded from a configuration file:
///
/// ```
/// use warp10_publisher::Warp10Config;
///
/// let config: Warp10Config = serde_json::from_str(r#"{
///     "host": "http://warp10.example.org",
///     "token": "WRITE_TOKEN"
/// }"#).unwrap();
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct Warp10Config {
    /// The base URL of the Warp10 ingress endpoint.
    pub host: String,

    /// The Warp10 write token, sent with every update request.
    ///
    /// The token is an opaque string. Legacy policies declared this setting
    /// as an integer; such values are accepted during deserialization and
    /// converted to their decimal string form.
    #[serde(deserialize_with = "deserialize_token")]
    pub token: String,
}

impl Warp10Config {
    /// Creates a configuration from the given host and token.
    pub fn new(host: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            token: token.into(),
        }
    }

    /// Validates the configuration and returns the full update URL.
    pub(crate) fn update_url(&self) -> Result<Url, ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.token.is_empty() {
            return Err(ConfigError::EmptyToken);
        }

        let host = self.host.trim_end_matches('/');
        let url = Url::parse(&format!("{host}{UPDATE_PATH}")).map_err(|source| {
            ConfigError::InvalidHost {
                host: self.host.clone(),
                source,
            }
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(ConfigError::UnsupportedScheme(self.host.clone())),
        }
    }
}

/// Deserializes the write token from either a string or an integer.
fn deserialize_token<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct TokenVisitor;

    impl Visitor<'_> for TokenVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a string or integer write token")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v.to_owned())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(TokenVisitor)
}
