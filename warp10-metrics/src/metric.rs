use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Well-known tag key naming the host a plugin instance runs on.
///
/// The collection framework attaches this tag to every metric before it
/// reaches a publisher. During conversion its value is promoted into the
/// `host` label of the resulting GTS point; the tag itself is kept as a
/// regular label.
pub const PLUGIN_RUNNING_ON_TAG: &str = "plugin_running_on";

/// One element of a metric's hierarchical namespace.
///
/// Namespaces mix fixed path segments with *dynamic* segments: wildcard
/// elements that are bound to a concrete value at collection time. Dynamic
/// segments do not contribute to the flattened class name; they are promoted
/// to labels instead.
///
/// # Serialized Representation
///
/// A fixed segment is a bare string, a dynamic segment an object carrying
/// `name` and `value`. This holds for both batch encodings:
///
/// ```json
/// ["intel", "psutil", {"name": "cpu", "value": "0"}, "load1"]
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum NamespaceElement {
    /// A fixed path segment.
    Fixed(String),
    /// A wildcard segment bound to a concrete value at collection time.
    Dynamic {
        /// The name of the wildcard element, used as label key.
        name: String,
        /// The concrete value bound at collection time, used as label value.
        value: String,
    },
}

impl NamespaceElement {
    /// Creates a fixed path segment.
    pub fn fixed(segment: impl Into<String>) -> Self {
        Self::Fixed(segment.into())
    }

    /// Creates a dynamic segment bound to the given value.
    pub fn dynamic(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Dynamic {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns `true` if this is a dynamic segment.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic { .. })
    }
}

/// A single decoded metric sample.
///
/// Metrics are produced by the collection framework's decoding and consumed
/// read-only by this crate. The sample value is kept as opaque text: source
/// values may be numeric or string, but once decoded they are only ever
/// serialized again.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Metric {
    /// The hierarchical path of the metric. Non-empty by invariant.
    pub namespace: Vec<NamespaceElement>,
    /// Tags adding dimensions to the metric. Keys are unique.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    /// The instant the sample was taken, with at least second resolution.
    pub timestamp: DateTime<Utc>,
    /// The sample value as opaque text.
    pub value: String,
}

impl Metric {
    /// Returns the value of the specified tag if it exists.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn test_parse_metric_json() {
        let json = r#"{
            "namespace": ["intel", "psutil", {"name": "cpu", "value": "0"}, "load1"],
            "tags": {"unit": "percent"},
            "timestamp": "2021-03-16T10:10:40Z",
            "value": "0.25"
        }"#;

        let metric: Metric = serde_json::from_str(json).unwrap();
        insta::assert_debug_snapshot!(metric, @r###"
        Metric {
            namespace: [
                Fixed(
                    "intel",
                ),
                Fixed(
                    "psutil",
                ),
                Dynamic {
                    name: "cpu",
                    value: "0",
                },
                Fixed(
                    "load1",
                ),
            ],
            tags: {
                "unit": "percent",
            },
            timestamp: 2021-03-16T10:10:40Z,
            value: "0.25",
        }
        "###);
    }

    #[test]
    fn test_parse_metric_without_tags() {
        let json = r#"{
            "namespace": ["swap", "io", "in"],
            "timestamp": "2021-03-16T10:10:40Z",
            "value": "17"
        }"#;

        let metric: Metric = serde_json::from_str(json).unwrap();
        assert_eq!(metric.tags, BTreeMap::new());
        assert_eq!(metric.tag(PLUGIN_RUNNING_ON_TAG), None);
    }

    #[test]
    fn test_namespace_element_roundtrip_msgpack() {
        let namespace = vec![
            NamespaceElement::fixed("intel"),
            NamespaceElement::dynamic("device", "sda"),
        ];

        let bytes = rmp_serde::to_vec_named(&namespace).unwrap();
        let decoded: Vec<NamespaceElement> = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(decoded, namespace);
    }
}
