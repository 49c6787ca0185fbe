//! Schema dump of a flow record.

use std::io::{self, Write};

use super::FlowSink;
use crate::flow::{FieldValue, FlowRecord};

/// Prints `flow.<path>\t<type>` for every field of the first matched flow.
///
/// Nested records are listed one tab deeper; lists are reported but not
/// descended into.
#[derive(Debug, Default)]
pub struct SchemaDump {
    done: bool,
}

impl SchemaDump {
    pub fn new() -> Self {
        Self::default()
    }
}

fn write_fields<W: Write>(
    out: &mut W,
    record: &FlowRecord,
    prefix: &str,
    depth: usize,
) -> io::Result<()> {
    let indent = "\t".repeat(depth);
    for (name, value) in record.iter() {
        let path = format!("{prefix}{name}");
        writeln!(out, "{indent}flow.{path}\t{}", value.type_name())?;
        if let FieldValue::Object(nested) = value {
            write_fields(out, nested, &format!("{path}."), depth + 1)?;
        }
    }
    Ok(())
}

impl FlowSink for SchemaDump {
    fn name(&self) -> &'static str {
        "schema"
    }

    fn begin<W: Write>(&mut self, _out: &mut W) -> io::Result<()> {
        Ok(())
    }

    fn observe<W: Write>(&mut self, flow: &FlowRecord, out: &mut W) -> io::Result<()> {
        if self.done {
            return Ok(());
        }
        self.done = true;
        write_fields(out, flow, "", 0)
    }

    fn end<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        writeln!(out)
    }
}
