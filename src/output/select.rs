//! Selected-field listing.

use std::io::{self, Write};

use super::{write_compact, FlowSink};
use crate::flow::{FieldPath, FieldValue, FlowRecord, Resolved};

/// Writes the values of one field path as
/// `{ "<outer>": [ { "<leaf>": value }, ... ] }`.
///
/// A two-segment path over a sequence is flattened: one entry per element
/// that carries the inner field.
#[derive(Debug)]
pub struct FieldSelect {
    path: FieldPath,
    written: u64,
}

impl FieldSelect {
    pub fn new(path: FieldPath) -> Self {
        Self { path, written: 0 }
    }

    pub fn values_written(&self) -> u64 {
        self.written
    }

    fn emit<W: Write>(&mut self, value: &FieldValue, out: &mut W) -> io::Result<()> {
        if self.written > 0 {
            writeln!(out, ",")?;
        }
        write!(out, "\t{{ ")?;
        write_compact(out, self.path.leaf())?;
        write!(out, ": ")?;
        write_compact(out, value)?;
        write!(out, " }}")?;
        self.written += 1;
        Ok(())
    }
}

impl FlowSink for FieldSelect {
    fn name(&self) -> &'static str {
        "select"
    }

    fn begin<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{{")?;
        write_compact(out, self.path.outer())?;
        writeln!(out, ": [")
    }

    fn observe<W: Write>(&mut self, flow: &FlowRecord, out: &mut W) -> io::Result<()> {
        match self.path.resolve(flow) {
            None => Ok(()),
            Some(Resolved::Value(value)) => self.emit(value, out),
            Some(Resolved::PerElement(items)) => {
                for item in items {
                    if let Some(value) = self.path.select_inner(item) {
                        self.emit(value, out)?;
                    }
                }
                Ok(())
            }
        }
    }

    fn end<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if self.written > 0 {
            writeln!(out)?;
        }
        writeln!(out, "   ]")?;
        writeln!(out, "}}")
    }
}
