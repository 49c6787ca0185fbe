//! Output strategies for matched flows.
//!
//! Every strategy follows the same lifecycle, driven once per run by the
//! pipeline: `begin`, then `metadata`/`observe` for each input document in
//! order, then `end`. The concrete strategy is chosen up front from an
//! `OutputMode` and dispatched through the `Sink` enum.

mod full;
mod schema;
mod select;
mod stats;

pub use full::{FullPrint, FLOW_FIELDS};
pub use schema::SchemaDump;
pub use select::FieldSelect;
pub use stats::{FlowStats, StatsOptions};

use std::io::{self, Write};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::flow::{FieldPath, FieldValue, FlowRecord};

/// Consumer of the matched flow stream.
pub trait FlowSink {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Called once before any input is read.
    fn begin<W: Write>(&mut self, out: &mut W) -> io::Result<()>;

    /// Called with a document's metadata, before that document's flows.
    fn metadata<W: Write>(&mut self, _metadata: &FieldValue, _out: &mut W) -> io::Result<()> {
        Ok(())
    }

    /// Called for every flow that passed the filter, in input order.
    fn observe<W: Write>(&mut self, flow: &FlowRecord, out: &mut W) -> io::Result<()>;

    /// Called once after the last input.
    fn end<W: Write>(&mut self, out: &mut W) -> io::Result<()>;
}

/// Which strategy a run uses.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputMode {
    /// Pretty-printed flows under an `appflows` key (default)
    Full,
    /// Selected field values only
    Select(FieldPath),
    /// Aggregate statistics
    Stats(StatsOptions),
    /// Field names and types of the first matched flow
    Schema,
}

/// Enum of all output strategies.
pub enum Sink {
    FullPrint(FullPrint),
    FieldSelect(FieldSelect),
    Stats(FlowStats),
    Schema(SchemaDump),
}

/// Macro to delegate FlowSink trait methods to inner types.
macro_rules! delegate_sink {
    ($self:expr, $method:ident $(, $arg:expr)*) => {
        match $self {
            Sink::FullPrint(s) => s.$method($($arg),*),
            Sink::FieldSelect(s) => s.$method($($arg),*),
            Sink::Stats(s) => s.$method($($arg),*),
            Sink::Schema(s) => s.$method($($arg),*),
        }
    };
}

impl Sink {
    /// Build a fresh strategy for one run.
    pub fn new(mode: OutputMode) -> Self {
        match mode {
            OutputMode::Full => Sink::FullPrint(FullPrint::new()),
            OutputMode::Select(path) => Sink::FieldSelect(FieldSelect::new(path)),
            OutputMode::Stats(options) => Sink::Stats(FlowStats::new(options)),
            OutputMode::Schema => Sink::Schema(SchemaDump::new()),
        }
    }
}

impl FlowSink for Sink {
    #[inline]
    fn name(&self) -> &'static str {
        delegate_sink!(self, name)
    }

    #[inline]
    fn begin<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        delegate_sink!(self, begin, out)
    }

    #[inline]
    fn metadata<W: Write>(&mut self, metadata: &FieldValue, out: &mut W) -> io::Result<()> {
        delegate_sink!(self, metadata, metadata, out)
    }

    #[inline]
    fn observe<W: Write>(&mut self, flow: &FlowRecord, out: &mut W) -> io::Result<()> {
        delegate_sink!(self, observe, flow, out)
    }

    #[inline]
    fn end<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        delegate_sink!(self, end, out)
    }
}

/// Write a value as indented JSON, without a trailing newline.
pub(crate) fn write_pretty<W: Write, T: Serialize + ?Sized>(
    out: &mut W,
    value: &T,
) -> io::Result<()> {
    let formatter = PrettyFormatter::with_indent(b"   ");
    let mut ser = serde_json::Serializer::with_formatter(&mut *out, formatter);
    value.serialize(&mut ser).map_err(io::Error::from)
}

/// Write a value as compact JSON.
pub(crate) fn write_compact<W: Write, T: Serialize + ?Sized>(
    out: &mut W,
    value: &T,
) -> io::Result<()> {
    serde_json::to_writer(&mut *out, value).map_err(io::Error::from)
}
