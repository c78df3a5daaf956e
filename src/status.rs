//! Device-reported status documents.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The `result` object of a `getPilot` reply.
///
/// The schema is device-defined, so the document is kept as an ordered JSON
/// object and round-tripped untouched. A few convenience accessors read the
/// commonly present keys.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct StatusPayload(Map<String, Value>);

impl StatusPayload {
    pub fn new(fields: Map<String, Value>) -> Self {
        StatusPayload(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// Whether the light reports itself as on.
    pub fn state(&self) -> Option<bool> {
        self.get("state").and_then(Value::as_bool)
    }

    pub fn dimming(&self) -> Option<u64> {
        self.get("dimming").and_then(Value::as_u64)
    }

    pub fn temp(&self) -> Option<u64> {
        self.get("temp").and_then(Value::as_u64)
    }

    pub fn mac(&self) -> Option<&str> {
        self.get("mac").and_then(Value::as_str)
    }

    /// The RGB channels, when all three are present.
    pub fn rgb(&self) -> Option<(u64, u64, u64)> {
        let channel = |k: &str| self.get(k).and_then(Value::as_u64);
        Some((channel("r")?, channel("g")?, channel("b")?))
    }
}

impl From<StatusPayload> for Value {
    fn from(status: StatusPayload) -> Self {
        Value::Object(status.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trip_preserves_unknown_keys_and_order() {
        let raw = json!({"mac": "a8bb50aabbcc", "rssi": -60, "state": true, "r": 1, "g": 2, "b": 3});
        let status: StatusPayload = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(status.state(), Some(true));
        assert_eq!(status.rgb(), Some((1, 2, 3)));
        assert_eq!(status.mac(), Some("a8bb50aabbcc"));

        let keys: Vec<&str> = status.fields().keys().map(String::as_str).collect();
        assert_eq!(keys, ["mac", "rssi", "state", "r", "g", "b"]);
        assert_eq!(Value::from(status), raw);
    }

    #[test]
    fn test_missing_channels() {
        let status: StatusPayload = serde_json::from_value(json!({"temp": 2700})).unwrap();
        assert_eq!(status.rgb(), None);
        assert_eq!(status.temp(), Some(2700));
        assert_eq!(status.state(), None);
    }
}
