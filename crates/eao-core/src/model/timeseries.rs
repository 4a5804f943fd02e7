use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Named numeric series (prices, cost curves, ...) aligned to a timegrid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    #[serde(default)]
    pub series: BTreeMap<String, Vec<f64>>,
}

impl TimeSeries {
    pub fn new(series: BTreeMap<String, Vec<f64>>) -> Self {
        Self { series }
    }

    pub fn get(&self, tag: &str) -> Option<&[f64]> {
        self.series.get(tag).map(Vec::as_slice)
    }
}

/// Shapes a client may send time series data in. Variants are tried in
/// declaration order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TimeSeriesPayload {
    /// An encoded `TimeSeries` document.
    Encoded(String),
    /// A bare map from series name to numeric values.
    Raw(BTreeMap<String, Vec<f64>>),
    /// A `TimeSeries` document sent inline as a JSON object.
    Inline(Value),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_shapes_are_tried_in_order() {
        let encoded: TimeSeriesPayload = serde_json::from_value(json!("{\"__class__\":\"TimeSeries\"}")).unwrap();
        assert!(matches!(encoded, TimeSeriesPayload::Encoded(_)));

        let raw: TimeSeriesPayload = serde_json::from_value(json!({"p": [1, 2.5]})).unwrap();
        assert_eq!(
            raw,
            TimeSeriesPayload::Raw(BTreeMap::from([("p".to_string(), vec![1.0, 2.5])]))
        );

        let inline: TimeSeriesPayload =
            serde_json::from_value(json!({"__class__": "TimeSeries", "series": {}})).unwrap();
        assert!(matches!(inline, TimeSeriesPayload::Inline(_)));
    }

    #[test]
    fn non_numeric_values_fall_through_to_inline() {
        let payload: TimeSeriesPayload = serde_json::from_value(json!({"p": ["x"]})).unwrap();
        assert!(matches!(payload, TimeSeriesPayload::Inline(_)));
    }
}
