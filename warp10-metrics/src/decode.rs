use std::fmt;

use crate::Metric;

/// The encoding of a metric batch, negotiated with the collection framework.
///
/// Exactly two encodings are supported. Both decode to the same sequence of
/// [`Metric`]s; they only differ in their wire representation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContentType {
    /// JSON, declared as `application/json`.
    Json,
    /// Self-describing MessagePack (map encoding), declared as
    /// `application/msgpack`.
    MsgPack,
}

impl ContentType {
    /// Parses a content type string into a known encoding.
    ///
    /// Returns `None` for anything other than the two supported encodings.
    pub fn parse(content_type: &str) -> Option<Self> {
        match content_type {
            "application/json" => Some(Self::Json),
            "application/msgpack" => Some(Self::MsgPack),
            _ => None,
        }
    }

    /// Returns the canonical content type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::MsgPack => "application/msgpack",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error returned when a metric batch cannot be decoded.
///
/// Decoding failures are fatal for the batch: no partial sequence of metrics
/// is ever produced. The error carries the offending content type and the
/// payload length for diagnosis, but never echoes raw payload bytes.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The batch was declared with a content type this crate does not
    /// support.
    #[error("unknown content type '{0}'")]
    UnknownContentType(String),

    /// The batch was declared as JSON but does not decode as one.
    #[error("malformed application/json batch of {len} bytes")]
    Json {
        /// The length of the rejected payload in bytes.
        len: usize,
        /// The underlying codec error.
        #[source]
        source: serde_json::Error,
    },

    /// The batch was declared as MessagePack but does not decode as one.
    #[error("malformed application/msgpack batch of {len} bytes")]
    MsgPack {
        /// The length of the rejected payload in bytes.
        len: usize,
        /// The underlying codec error.
        #[source]
        source: rmp_serde::decode::Error,
    },
}

/// Decodes a raw metric batch into its contained metrics.
///
/// The order of the returned metrics matches the order in which they appear
/// in the batch. A batch that fails to decode yields no metrics at all.
///
/// # Example
///
/// ```
/// use warp10_metrics::{ContentType, decode_batch};
///
/// let metrics = decode_batch(ContentType::Json.as_str(), b"[]").unwrap();
/// assert!(metrics.is_empty());
/// ```
pub fn decode_batch(content_type: &str, content: &[u8]) -> Result<Vec<Metric>, DecodeError> {
    match ContentType::parse(content_type) {
        Some(ContentType::Json) => {
            serde_json::from_slice(content).map_err(|source| DecodeError::Json {
                len: content.len(),
                source,
            })
        }
        Some(ContentType::MsgPack) => {
            rmp_serde::from_slice(content).map_err(|source| DecodeError::MsgPack {
                len: content.len(),
                source,
            })
        }
        None => Err(DecodeError::UnknownContentType(content_type.to_owned())),
    }
}
