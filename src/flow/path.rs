//! Dotted field paths and their resolution against a record.

use std::fmt;
use std::str::FromStr;

use super::{FieldValue, FlowRecord};
use crate::error::QueryError;

/// A one- or two-segment field path (`dp`, `tls.scs`, `non_norm_stats.ipt`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    outer: String,
    inner: Option<String>,
}

/// Outcome of resolving a path against a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolved<'a> {
    /// The path led to a single value.
    Value(&'a FieldValue),
    /// The outer field is a sequence; the inner segment applies to each
    /// element and is left to the caller.
    PerElement(&'a [FieldValue]),
}

impl FieldPath {
    /// Build a path from its segments.
    pub fn new(outer: impl Into<String>, inner: Option<String>) -> Self {
        Self {
            outer: outer.into(),
            inner,
        }
    }

    /// Parse `name` or `name.name`. Empty segments and extra dots are rejected.
    pub fn parse(path: &str) -> Result<Self, QueryError> {
        let unsupported = || QueryError::UnsupportedPath {
            path: path.to_string(),
        };

        let (outer, inner) = match path.split_once('.') {
            Some((outer, inner)) => {
                if inner.is_empty() || inner.contains('.') {
                    return Err(unsupported());
                }
                (outer, Some(inner.to_string()))
            }
            None => (path, None),
        };

        if outer.is_empty() {
            return Err(unsupported());
        }

        Ok(Self::new(outer, inner))
    }

    /// The top-level field name.
    pub fn outer(&self) -> &str {
        &self.outer
    }

    /// The nested field name, if any.
    pub fn inner(&self) -> Option<&str> {
        self.inner.as_deref()
    }

    /// The name of the field finally selected (inner if present).
    pub fn leaf(&self) -> &str {
        self.inner.as_deref().unwrap_or(&self.outer)
    }

    /// Look up the top-level field only.
    pub fn resolve_outer<'a>(&self, record: &'a FlowRecord) -> Option<&'a FieldValue> {
        record.get(&self.outer)
    }

    /// Apply the inner segment to an already resolved value.
    ///
    /// Without an inner segment the value itself is returned. With one, the
    /// value must be a nested record containing that field.
    pub fn select_inner<'a>(&self, value: &'a FieldValue) -> Option<&'a FieldValue> {
        match &self.inner {
            None => Some(value),
            Some(inner) => value.as_record()?.get(inner),
        }
    }

    /// Resolve the path against a record. Absence is `None`, never an error.
    pub fn resolve<'a>(&self, record: &'a FlowRecord) -> Option<Resolved<'a>> {
        let outer = self.resolve_outer(record)?;
        match (&self.inner, outer) {
            (None, value) => Some(Resolved::Value(value)),
            (Some(_), FieldValue::List(items)) => Some(Resolved::PerElement(items)),
            (Some(inner), FieldValue::Object(nested)) => nested.get(inner).map(Resolved::Value),
            (Some(_), _) => None,
        }
    }
}

impl FromStr for FieldPath {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(inner) => write!(f, "{}.{}", self.outer, inner),
            None => write!(f, "{}", self.outer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> FlowRecord {
        serde_json::from_str(
            r#"{
                "dp": 443,
                "tls": {"scs": "c02f"},
                "non_norm_stats": [{"b": 10, "dir": ">", "ipt": 0}, {"b": 20, "dir": "<", "ipt": 3}]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_paths() {
        let p = FieldPath::parse("dp").unwrap();
        assert_eq!(p.outer(), "dp");
        assert_eq!(p.inner(), None);
        assert_eq!(p.leaf(), "dp");

        let p: FieldPath = "non_norm_stats.ipt".parse().unwrap();
        assert_eq!(p.outer(), "non_norm_stats");
        assert_eq!(p.inner(), Some("ipt"));
        assert_eq!(p.leaf(), "ipt");
        assert_eq!(p.to_string(), "non_norm_stats.ipt");
    }

    #[test]
    fn test_parse_rejects_bad_paths() {
        for bad in ["", ".b", "a.", "a.b.c"] {
            assert_eq!(
                FieldPath::parse(bad),
                Err(QueryError::UnsupportedPath {
                    path: bad.to_string()
                }),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_resolve_single_segment() {
        let r = record();
        let p = FieldPath::parse("dp").unwrap();
        assert_eq!(p.resolve(&r), Some(Resolved::Value(&FieldValue::Int(443))));
        assert_eq!(FieldPath::parse("sp").unwrap().resolve(&r), None);
    }

    #[test]
    fn test_resolve_nested_record() {
        let r = record();
        let p = FieldPath::parse("tls.scs").unwrap();
        assert_eq!(
            p.resolve(&r),
            Some(Resolved::Value(&FieldValue::String("c02f".into())))
        );
        assert_eq!(FieldPath::parse("tls.missing").unwrap().resolve(&r), None);
    }

    #[test]
    fn test_resolve_sequence_defers_to_caller() {
        let r = record();
        let p = FieldPath::parse("non_norm_stats.b").unwrap();
        match p.resolve(&r) {
            Some(Resolved::PerElement(items)) => {
                let bytes: Vec<_> = items
                    .iter()
                    .filter_map(|e| p.select_inner(e))
                    .filter_map(|v| v.as_i64())
                    .collect();
                assert_eq!(bytes, vec![10, 20]);
            }
            other => panic!("expected PerElement, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_inner_on_scalar_is_absent() {
        let r = record();
        assert_eq!(FieldPath::parse("dp.x").unwrap().resolve(&r), None);
    }
}
