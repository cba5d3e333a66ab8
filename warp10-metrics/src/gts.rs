use std::collections::BTreeMap;
use std::fmt;

use crate::{Metric, NamespaceElement, PLUGIN_RUNNING_ON_TAG};

/// The label under which the originating host is recorded.
const HOST_LABEL: &str = "host";

/// One point of a Geo Time Series in Warp10's input format.
///
/// Every [`Metric`] converts into exactly one point. Points are ephemeral:
/// they are created during conversion, rendered into the outgoing payload,
/// and discarded.
///
/// # Rendered Format
///
/// ```text
/// TS/LAT:LON/ELEV CLASSNAME{LABELS} VALUE
/// ```
///
/// The timestamp is in microseconds since the Unix epoch. The geographic
/// fields stay empty since there is no geolocation source; Warp10 accepts
/// them as blank. Labels render as comma-joined `key=value` pairs without a
/// trailing comma. Label order is not part of the contract.
#[derive(Clone, Debug, PartialEq)]
pub struct GtsPoint {
    /// Time of the reading in microseconds since the Unix epoch.
    pub timestamp: i64,
    /// Latitude of the reading. Always empty in this system.
    pub lat: String,
    /// Longitude of the reading. Always empty in this system.
    pub long: String,
    /// Elevation of the reading in millimeters. Always empty in this system.
    pub elev: String,
    /// The class name: the metric's fixed namespace segments joined with `.`.
    pub class_name: String,
    /// Labels of the series. Keys are unique, later writes win.
    pub labels: BTreeMap<String, String>,
    /// The value of the reading as opaque text.
    pub value: String,
}

impl GtsPoint {
    /// Converts a metric into its GTS point.
    ///
    /// Labels are the union of the metric's tags, a `host` label synthesized
    /// from [`PLUGIN_RUNNING_ON_TAG`] (empty if the tag is absent), and one
    /// label per dynamic namespace segment. Labels written later overwrite
    /// identically-named earlier ones, so the synthesized labels take
    /// precedence over original tags.
    ///
    /// Dynamic segments are excluded from the class name. The namespace is
    /// consumed in a single filtering pass, so any number of dynamic segments
    /// at any positions leaves the remaining fixed segments intact.
    pub fn from_metric(metric: &Metric) -> Self {
        let mut labels = metric.tags.clone();
        labels.insert(
            HOST_LABEL.to_owned(),
            metric
                .tag(PLUGIN_RUNNING_ON_TAG)
                .unwrap_or_default()
                .to_owned(),
        );

        let mut class_name = String::new();
        for element in &metric.namespace {
            match element {
                NamespaceElement::Fixed(segment) => {
                    if !class_name.is_empty() {
                        class_name.push('.');
                    }
                    class_name.push_str(segment);
                }
                NamespaceElement::Dynamic { name, value } => {
                    labels.insert(name.clone(), value.clone());
                }
            }
        }

        Self {
            timestamp: metric.timestamp.timestamp_micros(),
            lat: String::new(),
            long: String::new(),
            elev: String::new(),
            class_name,
            labels,
            value: metric.value.clone(),
        }
    }
}

impl fmt::Display for GtsPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}:{}/{} {}{{",
            self.timestamp, self.lat, self.long, self.elev, self.class_name
        )?;

        let mut labels = self.labels.iter();
        if let Some((key, value)) = labels.next() {
            write!(f, "{key}={value}")?;
            for (key, value) in labels {
                write!(f, ",{key}={value}")?;
            }
        }

        write!(f, "}} {}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::DateTime;
    use similar_asserts::assert_eq;

    use super::*;

    fn metric(namespace: Vec<NamespaceElement>, tags: &[(&str, &str)]) -> Metric {
        Metric {
            namespace,
            tags: tags
                .iter()
                .map(|&(k, v)| (k.to_owned(), v.to_owned()))
                .collect(),
            timestamp: DateTime::from_timestamp(1615889440, 0).unwrap(),
            value: "42".to_owned(),
        }
    }

    /// Extracts the rendered label pairs as a set, since their order is not
    /// part of the contract.
    fn rendered_labels(line: &str) -> BTreeSet<String> {
        let start = line.find('{').unwrap();
        let end = line.rfind('}').unwrap();
        let section = &line[start + 1..end];
        assert!(!section.ends_with(','));
        section.split(',').map(str::to_owned).collect()
    }

    #[test]
    fn test_convert_static_namespace() {
        let metric = metric(
            vec![
                NamespaceElement::fixed("intel"),
                NamespaceElement::fixed("psutil"),
                NamespaceElement::fixed("load1"),
            ],
            &[("plugin_running_on", "host-1")],
        );

        let point = GtsPoint::from_metric(&metric);
        insta::assert_debug_snapshot!(point, @r###"
        GtsPoint {
            timestamp: 1615889440000000,
            lat: "",
            long: "",
            elev: "",
            class_name: "intel.psutil.load1",
            labels: {
                "host": "host-1",
                "plugin_running_on": "host-1",
            },
            value: "42",
        }
        "###);
    }

    #[test]
    fn test_labels_roundtrip() {
        let metric = metric(
            vec![NamespaceElement::fixed("load1")],
            &[("a", "1"), ("b", "2"), ("plugin_running_on", "host-1")],
        );

        let line = GtsPoint::from_metric(&metric).to_string();
        let expected: BTreeSet<String> = ["a=1", "b=2", "host=host-1", "plugin_running_on=host-1"]
            .into_iter()
            .map(str::to_owned)
            .collect();
        assert_eq!(rendered_labels(&line), expected);
    }

    #[test]
    fn test_dynamic_segment_promotion() {
        let metric = metric(
            vec![
                NamespaceElement::fixed("x"),
                NamespaceElement::dynamic("shard", "3"),
                NamespaceElement::fixed("y"),
            ],
            &[],
        );

        let point = GtsPoint::from_metric(&metric);
        assert_eq!(point.class_name, "x.y");
        assert_eq!(point.labels["shard"], "3");
    }

    // Regression test for removal of several dynamic segments: each one must
    // be excised at its original position, no matter how many precede it.
    #[test]
    fn test_multiple_dynamic_segments() {
        let metric = metric(
            vec![
                NamespaceElement::dynamic("n1", "v1"),
                NamespaceElement::fixed("a"),
                NamespaceElement::dynamic("n2", "v2"),
                NamespaceElement::fixed("b"),
            ],
            &[],
        );

        let point = GtsPoint::from_metric(&metric);
        assert_eq!(point.class_name, "a.b");
        assert_eq!(point.labels["n1"], "v1");
        assert_eq!(point.labels["n2"], "v2");
    }

    #[test]
    fn test_missing_running_on_tag() {
        let metric = metric(vec![NamespaceElement::fixed("load1")], &[("host", "set")]);

        // The synthesized host label overwrites a pre-existing `host` tag,
        // even when the running-on tag is absent.
        let point = GtsPoint::from_metric(&metric);
        assert_eq!(point.labels["host"], "");
    }

    #[test]
    fn test_dynamic_segment_overrides_tag() {
        let metric = metric(
            vec![
                NamespaceElement::fixed("disk"),
                NamespaceElement::dynamic("device", "sda"),
            ],
            &[("device", "from-tag")],
        );

        let point = GtsPoint::from_metric(&metric);
        assert_eq!(point.labels["device"], "sda");
    }

    #[test]
    fn test_display_format() {
        let metric = metric(
            vec![
                NamespaceElement::fixed("intel"),
                NamespaceElement::fixed("load1"),
            ],
            &[("plugin_running_on", "host-1")],
        );

        let line = GtsPoint::from_metric(&metric).to_string();
        assert_eq!(
            line,
            "1615889440000000/:/ intel.load1{host=host-1,plugin_running_on=host-1} 42"
        );
    }

    #[test]
    fn test_display_no_labels() {
        let point = GtsPoint {
            timestamp: 1,
            lat: String::new(),
            long: String::new(),
            elev: String::new(),
            class_name: "a.b".to_owned(),
            labels: BTreeMap::new(),
            value: "0".to_owned(),
        };

        assert_eq!(point.to_string(), "1/:/ a.b{} 0");
    }

    #[test]
    fn test_empty_namespace() {
        // Unspecified by the framework contract; conversion stays total and
        // leaves rejection to the ingestion endpoint.
        let metric = metric(vec![], &[]);
        let point = GtsPoint::from_metric(&metric);
        assert_eq!(point.class_name, "");
    }
}
