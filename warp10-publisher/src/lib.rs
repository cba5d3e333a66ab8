//! Publishes metric batches to a Warp10 ingestion endpoint.
//!
//! This crate covers the transport side of the Warp10 publisher. The host
//! collection framework hands over one raw batch per call together with its
//! negotiated content type; the batch is decoded, every metric converted into
//! one GTS line, and the concatenated lines sent as a single authenticated
//! HTTP POST to the endpoint's `/api/v0/update` API.
//!
//! # Usage
//!
//! Configuration is validated once at setup. Each [`Warp10Publisher`] is
//! stateless across calls, so separate publish calls are independently safe
//! to run concurrently.
//!
//! ```no_run
//! use warp10_publisher::{Warp10Config, Warp10Publisher};
//!
//! let config = Warp10Config::new("http://warp10.example.org", "WRITE_TOKEN");
//! let publisher = Warp10Publisher::new(&config)?;
//!
//! publisher.publish("application/json", b"[]")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Failure Model
//!
//! Every failure is terminal for its batch and returned as an error value;
//! nothing is retried or buffered. The host framework alone decides whether
//! to invoke the publisher again.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod config;
mod publish;

pub use config::*;
pub use publish::*;
