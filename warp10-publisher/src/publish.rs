use std::fmt::Write;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use url::Url;

use warp10_metrics::{DecodeError, GtsPoint, decode_batch};

use crate::config::{ConfigError, Warp10Config};

/// The header carrying the Warp10 write token.
const TOKEN_HEADER: &str = "X-Warp10-Token";

/// An error returned when publishing a metric batch fails.
///
/// Every variant is terminal for its batch: nothing is retried, no partial
/// batch is ever sent, and no distinction is made between retryable and
/// permanent failures.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The raw batch could not be decoded. No HTTP request was attempted.
    #[error("failed to decode metric batch")]
    Decode(#[from] DecodeError),

    /// The update request could not be sent.
    #[error("failed to send update request")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered the update request with a non-200 status.
    #[error("update request rejected with status {0}")]
    Status(StatusCode),
}

/// Publishes metric batches to a Warp10 ingestion endpoint.
///
/// The publisher is created once from a validated [`Warp10Config`] and holds
/// no mutable state; the underlying HTTP client is reused across calls and
/// every call is independently safe to run concurrently with another.
///
/// Each [`publish`](Self::publish) call is fully synchronous: decode,
/// convert, serialize, and a single blocking HTTP request happen in order,
/// with no internal parallelism and no timeout beyond the HTTP client's
/// defaults.
#[derive(Debug)]
pub struct Warp10Publisher {
    endpoint: Url,
    token: String,
    client: Client,
}

impl Warp10Publisher {
    /// Creates a publisher from the given configuration.
    ///
    /// Validates the configuration and initializes the HTTP client. Errors
    /// here are setup failures; a successfully created publisher does not
    /// fail on configuration at publish time.
    pub fn new(config: &Warp10Config) -> Result<Self, ConfigError> {
        let endpoint = config.update_url()?;
        let client = Client::builder().build()?;

        Ok(Self {
            endpoint,
            token: config.token.clone(),
            client,
        })
    }

    /// Publishes one raw metric batch.
    ///
    /// The batch is decoded according to `content_type`, every metric is
    /// converted into one GTS line, and the lines are concatenated in batch
    /// order into the body of a single POST to the endpoint's update API. An
    /// empty batch still issues one request with an empty body.
    ///
    /// Success is an HTTP 200 answer. Any other status, a transport failure,
    /// or a decode failure is returned as an error; a decode failure short
    /// circuits before any request is made. The response body is never
    /// inspected.
    pub fn publish(&self, content_type: &str, content: &[u8]) -> Result<(), PublishError> {
        let metrics = decode_batch(content_type, content)?;

        let mut body = String::new();
        for metric in &metrics {
            let point = GtsPoint::from_metric(metric);
            let _ = writeln!(body, "{point}");
        }

        tracing::debug!(
            records = metrics.len(),
            endpoint = %self.endpoint,
            "publishing metric batch"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(TOKEN_HEADER, &self.token)
            .body(body)
            .send()?;

        // Dropping the response without reading the body releases the
        // connection on every exit path.
        let status = response.status();
        if status != StatusCode::OK {
            return Err(PublishError::Status(status));
        }

        Ok(())
    }
}
