//! Aggregate statistics over matched flows.

use std::collections::BTreeMap;
use std::io::{self, Write};

use comfy_table::{Cell, Table};

use super::FlowSink;
use crate::flow::{FlowRecord, Observation};
use crate::stats::RunningStats;

/// Extra sections printed after the totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsOptions {
    /// Per-destination-port breakdown table
    pub per_port: bool,
    /// Histogram of message byte counts
    pub lengths: bool,
    /// Histogram of inter-arrival times
    pub times: bool,
}

/// Accumulates message statistics per destination port and in total.
///
/// Only the totals are reported unless `StatsOptions` asks for more.
#[derive(Debug, Default)]
pub struct FlowStats {
    options: StatsOptions,
    by_port: BTreeMap<i64, RunningStats>,
    total: RunningStats,
}

impl FlowStats {
    pub fn new(options: StatsOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn total(&self) -> &RunningStats {
        &self.total
    }

    pub fn port(&self, dp: i64) -> Option<&RunningStats> {
        self.by_port.get(&dp)
    }

    fn write_port_table<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut table = Table::new();
        table.set_header(vec![
            Cell::new("dp"),
            Cell::new("flows"),
            Cell::new("messages"),
            Cell::new("bytes"),
            Cell::new("avg size"),
            Cell::new("std dev"),
        ]);

        for (dp, stats) in &self.by_port {
            let summary = stats.summarize();
            let (mean, std_dev) = summary
                .message_size
                .map(|s| (format!("{:.2}", s.mean), format!("{:.2}", s.std_dev)))
                .unwrap_or_default();
            table.add_row(vec![
                Cell::new(dp),
                Cell::new(summary.flows),
                Cell::new(summary.messages),
                Cell::new(summary.bytes),
                Cell::new(mean),
                Cell::new(std_dev),
            ]);
        }

        writeln!(out, "flow stats per destination port")?;
        writeln!(out, "{table}")
    }
}

impl FlowSink for FlowStats {
    fn name(&self) -> &'static str {
        "stats"
    }

    fn begin<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        writeln!(out)
    }

    fn observe<W: Write>(&mut self, flow: &FlowRecord, _out: &mut W) -> io::Result<()> {
        // A flow without a destination port still counts towards the totals.
        let mut bucket = flow
            .get("dp")
            .and_then(|v| v.as_i64())
            .map(|dp| self.by_port.entry(dp).or_default());

        self.total.add_flow();
        if let Some(bucket) = bucket.as_mut() {
            bucket.add_flow();
        }

        for obs in Observation::from_flow(flow) {
            self.total.observe(obs.bytes, obs.direction, obs.ipt);
            if let Some(bucket) = bucket.as_mut() {
                bucket.observe(obs.bytes, obs.direction, obs.ipt);
            }
        }
        Ok(())
    }

    fn end<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        writeln!(out, "total flow stats")?;
        write!(out, "{}", self.total.summarize())?;

        if self.options.per_port {
            writeln!(out)?;
            self.write_port_table(out)?;
        }
        if self.options.lengths {
            writeln!(out)?;
            writeln!(out, "message lengths")?;
            for (len, count) in self.total.lengths() {
                writeln!(out, "{count}\t{len}")?;
            }
        }
        if self.options.times {
            writeln!(out)?;
            writeln!(out, "inter-arrival times")?;
            for (ipt, count) in self.total.times() {
                writeln!(out, "{count}\t{ipt}")?;
            }
        }
        Ok(())
    }
}
