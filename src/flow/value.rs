//! Field value types for flow records.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Possible field value types (maps to JSON types).
///
/// Variant order matters for deserialization: integers are tried before
/// floats so that `443` stays an `Int`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Null/missing value
    Null,
    /// Boolean value
    Bool(bool),
    /// Signed 64-bit integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Ordered sequence of values (observation lists, byte distributions)
    List(Vec<FieldValue>),
    /// Nested record
    Object(FlowRecord),
}

impl FieldValue {
    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Try to get as i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as f64. Integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as a sequence.
    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Try to get as a nested record.
    pub fn as_record(&self) -> Option<&FlowRecord> {
        match self {
            FieldValue::Object(record) => Some(record),
            _ => None,
        }
    }

    /// Name of this value's type as reported by the schema dump.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::String(_) => "string",
            FieldValue::Int(_) => "int",
            FieldValue::Float(_) => "float",
            FieldValue::List(_) => "list",
            FieldValue::Object(_) => "object",
            FieldValue::Null | FieldValue::Bool(_) => "unknown",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Bool(v) => write!(f, "{v}"),
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::String(s) => write!(f, "{s}"),
            FieldValue::List(_) | FieldValue::Object(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                write!(f, "{json}")
            }
        }
    }
}

/// A single flow: field name to value, in document order.
///
/// No schema is fixed; every lookup may come back empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowRecord {
    fields: Vec<(String, FieldValue)>,
}

impl FlowRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a top-level field.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Check whether a top-level field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert or replace a field, returning the previous value. A replaced
    /// field keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        let name = name.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((name, value));
                None
            }
        }
    }

    /// Iterate fields in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for FlowRecord {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        let mut record = FlowRecord::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

impl Serialize for FlowRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FlowRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = FlowRecord;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FlowRecord, A::Error> {
                // Duplicate keys: the last value wins.
                let mut record = FlowRecord::new();
                while let Some((name, value)) = access.next_entry::<String, FieldValue>()? {
                    record.insert(name, value);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_keeps_integers_and_order() {
        let record: FlowRecord =
            serde_json::from_str(r#"{"sa": "10.0.0.1", "dp": 443, "ipt": 1.5, "bd": [1, 2]}"#)
                .unwrap();

        let names: Vec<&str> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["sa", "dp", "ipt", "bd"]);
        assert_eq!(record.get("dp"), Some(&FieldValue::Int(443)));
        assert_eq!(record.get("ipt"), Some(&FieldValue::Float(1.5)));
        assert_eq!(record.get("sa").and_then(|v| v.as_str()), Some("10.0.0.1"));
        assert_eq!(record.get("bd").and_then(|v| v.as_list()).map(|l| l.len()), Some(2));
    }

    #[test]
    fn test_nested_record() {
        let record: FlowRecord =
            serde_json::from_str(r#"{"tls": {"scs": "c02f", "ok": true}, "x": null}"#).unwrap();

        let tls = record.get("tls").and_then(|v| v.as_record()).unwrap();
        assert_eq!(tls.get("scs").and_then(|v| v.as_str()), Some("c02f"));
        assert_eq!(tls.get("ok"), Some(&FieldValue::Bool(true)));
        assert!(record.get("x").unwrap().is_null());
        assert!(record.get("missing").is_none());
    }

    #[test]
    fn test_type_names() {
        assert_eq!(FieldValue::String("a".into()).type_name(), "string");
        assert_eq!(FieldValue::Int(1).type_name(), "int");
        assert_eq!(FieldValue::Float(1.0).type_name(), "float");
        assert_eq!(FieldValue::List(vec![]).type_name(), "list");
        assert_eq!(FieldValue::Object(FlowRecord::new()).type_name(), "object");
        assert_eq!(FieldValue::Bool(false).type_name(), "unknown");
        assert_eq!(FieldValue::Null.type_name(), "unknown");
    }

    #[test]
    fn test_serialize_round_trips_through_json() {
        let text = r#"{"dp":80,"non_norm_stats":[{"b":10,"dir":">","ipt":0}]}"#;
        let record: FlowRecord = serde_json::from_str(text).unwrap();
        assert_eq!(serde_json::to_string(&record).unwrap(), text);
    }

    #[test]
    fn test_duplicate_key_keeps_last_value_in_first_position() {
        let record: FlowRecord = serde_json::from_str(r#"{"dp": 1, "sp": 2, "dp": 3}"#).unwrap();
        let fields: Vec<(&str, &FieldValue)> = record.iter().collect();
        assert_eq!(
            fields,
            vec![("dp", &FieldValue::Int(3)), ("sp", &FieldValue::Int(2))]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(FieldValue::Int(6).to_string(), "6");
        assert_eq!(FieldValue::String("a b".into()).to_string(), "a b");
        assert_eq!(
            FieldValue::List(vec![FieldValue::Int(1), FieldValue::Int(2)]).to_string(),
            "[1,2]"
        );
    }
}
