//! Metric data model and Warp10 GTS conversion.
//!
//! This crate covers the protocol side of the Warp10 publisher: the decoded
//! representation of a metric batch as handed over by the collection
//! framework, the decoding of such batches from their two wire encodings, and
//! the conversion of every metric into a [Geo Time Series] point in Warp10's
//! textual input format.
//!
//! # Batches
//!
//! A batch arrives as raw bytes together with the content type negotiated
//! with the collection framework. [`decode_batch`] recognizes two encodings,
//! JSON and MessagePack, and yields the contained [`Metric`]s in batch order:
//!
//! ```
//! use warp10_metrics::{ContentType, decode_batch};
//!
//! let batch = br#"[{
//!     "namespace": ["intel", "psutil", "load", {"name": "cpu", "value": "0"}],
//!     "tags": {"plugin_running_on": "host-1"},
//!     "timestamp": "2021-03-16T10:10:40Z",
//!     "value": "0.25"
//! }]"#;
//!
//! let metrics = decode_batch(ContentType::Json.as_str(), batch).unwrap();
//! assert_eq!(metrics.len(), 1);
//! ```
//!
//! # Conversion
//!
//! [`GtsPoint::from_metric`] flattens the namespace into a dotted class name,
//! promotes dynamic namespace segments into labels, and synthesizes a `host`
//! label from the framework's [`PLUGIN_RUNNING_ON_TAG`]. The resulting point
//! renders as one line of the [GTS input format] through its `Display`
//! implementation.
//!
//! [Geo Time Series]: https://www.warp10.io/content/03_Documentation/03_Interacting_with_Warp_10/03_Ingesting_data/02_GTS_input_format
//! [GTS input format]: https://www.warp10.io/content/03_Documentation/03_Interacting_with_Warp_10/03_Ingesting_data/02_GTS_input_format

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod decode;
mod gts;
mod metric;

pub use decode::*;
pub use gts::*;
pub use metric::*;
