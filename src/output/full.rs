//! Full flow listing.

use std::io::{self, Write};

use tracing::debug;

use super::{write_pretty, FlowSink};
use crate::flow::{FieldValue, FlowRecord, OBSERVATIONS_FIELD};

/// Flow fields rendered by the listing, in output order.
pub const FLOW_FIELDS: [&str; 15] = [
    "sa",
    "da",
    "pr",
    "sp",
    "dp",
    "ob",
    "op",
    "ib",
    "ip",
    "ts",
    "te",
    "ottl",
    "ittl",
    OBSERVATIONS_FIELD,
    "bd",
];

/// Fields kept for each observation list element.
const OBSERVATION_FIELDS: [&str; 3] = ["b", "dir", "ipt"];

/// Writes matched flows as one JSON document:
/// `{ "metadata": ..., "appflows": [ { "flow": {...} }, ... ] }`.
#[derive(Debug, Default)]
pub struct FullPrint {
    flows_written: u64,
    metadata_written: bool,
}

impl FullPrint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flows_written(&self) -> u64 {
        self.flows_written
    }

    fn open_flows<W: Write>(out: &mut W) -> io::Result<()> {
        writeln!(out, "\"appflows\": [")
    }
}

/// Project a flow onto the known fields, in canonical order.
fn render_flow(flow: &FlowRecord) -> FlowRecord {
    FLOW_FIELDS
        .iter()
        .filter_map(|name| {
            let value = flow.get(name)?;
            let value = match value {
                FieldValue::List(items) if *name == OBSERVATIONS_FIELD => {
                    FieldValue::List(items.iter().map(render_observation).collect())
                }
                other => other.clone(),
            };
            Some((name.to_string(), value))
        })
        .collect()
}

fn render_observation(element: &FieldValue) -> FieldValue {
    match element {
        FieldValue::Object(record) => FieldValue::Object(
            OBSERVATION_FIELDS
                .iter()
                .filter_map(|name| Some((name.to_string(), record.get(name)?.clone())))
                .collect(),
        ),
        other => other.clone(),
    }
}

impl FlowSink for FullPrint {
    fn name(&self) -> &'static str {
        "full"
    }

    fn begin<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{{")
    }

    fn metadata<W: Write>(&mut self, metadata: &FieldValue, out: &mut W) -> io::Result<()> {
        if self.metadata_written || self.flows_written > 0 {
            debug!("dropping metadata that arrived after flows were written");
            return Ok(());
        }
        write!(out, "\"metadata\": ")?;
        write_pretty(out, metadata)?;
        writeln!(out, ",")?;
        self.metadata_written = true;
        Ok(())
    }

    fn observe<W: Write>(&mut self, flow: &FlowRecord, out: &mut W) -> io::Result<()> {
        if self.flows_written == 0 {
            Self::open_flows(out)?;
        } else {
            writeln!(out, ",")?;
        }

        let mut wrapper = FlowRecord::new();
        wrapper.insert("flow", FieldValue::Object(render_flow(flow)));
        write_pretty(out, &wrapper)?;

        self.flows_written += 1;
        Ok(())
    }

    fn end<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if self.flows_written == 0 {
            Self::open_flows(out)?;
        } else {
            writeln!(out)?;
        }
        writeln!(out, "]")?;
        writeln!(out, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::run_sink;
    use super::*;

    const FLOW_443: &str = r#"{
        "sa": "10.0.0.1", "da": "10.0.0.2", "pr": 6, "sp": 51000, "dp": 443,
        "ob": 517, "op": 3, "ib": 1500, "ip": 2, "ts": 1.5, "te": 2.5,
        "ottl": 64, "ittl": 57, "extra": "dropped",
        "non_norm_stats": [{"b": 517, "dir": ">", "ipt": 0, "x": 1}],
        "bd": [1, 2, 3]
    }"#;

    #[test]
    fn test_render_flow_orders_and_projects() {
        let flow: FlowRecord = serde_json::from_str(FLOW_443).unwrap();
        let rendered = render_flow(&flow);
        let names: Vec<&str> = rendered.iter().map(|(k, _)| k).collect();
        assert_eq!(names, FLOW_FIELDS.to_vec());

        let first = &rendered.get(OBSERVATIONS_FIELD).unwrap().as_list().unwrap()[0];
        let keys: Vec<&str> = first.as_record().unwrap().iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "dir", "ipt"]);
    }

    #[test]
    fn test_render_flow_skips_missing_fields() {
        let flow: FlowRecord = serde_json::from_str(r#"{"dp": 80, "sa": "a"}"#).unwrap();
        let rendered = render_flow(&flow);
        let names: Vec<&str> = rendered.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["sa", "dp"]);
    }

    #[test]
    fn test_output_is_valid_json() {
        let mut sink = FullPrint::new();
        let text = run_sink(&mut sink, &[FLOW_443, r#"{"dp": 80}"#]);
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();

        let flows = doc["appflows"].as_array().unwrap();
        assert_eq!(flows.len(), 2);
        assert_eq!(flows[0]["flow"]["dp"], 443);
        assert_eq!(flows[0]["flow"]["bd"], serde_json::json!([1, 2, 3]));
        assert!(flows[0]["flow"].get("extra").is_none());
        assert_eq!(flows[1]["flow"]["dp"], 80);
        assert_eq!(sink.flows_written(), 2);
    }

    #[test]
    fn test_empty_listing() {
        let text = run_sink(&mut FullPrint::new(), &[]);
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["appflows"], serde_json::json!([]));
    }

    #[test]
    fn test_metadata_written_once_before_flows() {
        let meta: FieldValue = serde_json::from_str(r#"{"version": "1.0"}"#).unwrap();
        let flow: FlowRecord = serde_json::from_str(r#"{"dp": 80}"#).unwrap();

        let mut sink = FullPrint::new();
        let mut out = Vec::new();
        sink.begin(&mut out).unwrap();
        sink.metadata(&meta, &mut out).unwrap();
        sink.observe(&flow, &mut out).unwrap();
        sink.metadata(&meta, &mut out).unwrap();
        sink.observe(&flow, &mut out).unwrap();
        sink.end(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("\"metadata\"").count(), 1);
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["metadata"]["version"], "1.0");
        assert_eq!(doc["appflows"].as_array().unwrap().len(), 2);
    }
}
