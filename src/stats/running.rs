//! Online message-size statistics.

use std::collections::BTreeMap;
use std::fmt;

use crate::flow::Direction;

/// Count, sum and sum of squares over one subset of messages.
///
/// `sum` saturates at `u128::MAX`. `sum_sq` is `f64` because squares of
/// large byte counts overflow every integer width.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Moments {
    pub count: u64,
    pub sum: u128,
    pub sum_sq: f64,
}

impl Moments {
    fn add(&mut self, x: u64) {
        self.count += 1;
        self.sum = self.sum.saturating_add(u128::from(x));
        self.sum_sq += (x as f64) * (x as f64);
    }

    /// Mean and sample standard deviation, defined once there are at least
    /// two values.
    ///
    /// Uses `(Σx² − (Σx)²/n) / (n − 1)`; a variance that comes out slightly
    /// negative through cancellation is clamped to zero.
    pub fn size_stats(&self) -> Option<SizeStats> {
        if self.count < 2 {
            return None;
        }
        let n = self.count as f64;
        let sum = self.sum as f64;
        let mean = sum / n;
        let variance = ((self.sum_sq - sum * sum / n) / (n - 1.0)).max(0.0);
        Some(SizeStats {
            mean,
            variance,
            std_dev: variance.sqrt(),
        })
    }
}

/// Mean and spread of message sizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeStats {
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
}

/// Averages over flows, defined once at least one flow was seen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerFlow {
    pub messages: f64,
    pub bytes: f64,
    pub outbound_messages: f64,
    pub inbound_messages: f64,
}

/// Derived view of a `RunningStats`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSummary {
    pub flows: u64,
    pub messages: u64,
    pub bytes: u128,
    pub outbound_messages: u64,
    pub outbound_bytes: u128,
    pub inbound_messages: u64,
    pub inbound_bytes: u128,
    pub per_flow: Option<PerFlow>,
    pub message_size: Option<SizeStats>,
    pub inbound_message_size: Option<SizeStats>,
    pub outbound_message_size: Option<SizeStats>,
}

/// Incremental aggregates over a stream of observations.
///
/// Nothing is buffered: each observation updates scalar sums and two
/// frequency histograms (by byte count and by inter-arrival time).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunningStats {
    flows: u64,
    total: Moments,
    outbound: Moments,
    inbound: Moments,
    lengths: BTreeMap<u64, u64>,
    // Keyed by f64 bits; non-negative floats order the same as their bits.
    times: BTreeMap<u64, u64>,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more flow towards the per-flow averages.
    pub fn add_flow(&mut self) {
        self.flows += 1;
    }

    /// Record one message.
    pub fn observe(&mut self, bytes: u64, direction: Direction, ipt: f64) {
        self.total.add(bytes);
        match direction {
            Direction::Outbound => self.outbound.add(bytes),
            Direction::Inbound => self.inbound.add(bytes),
        }

        *self.lengths.entry(bytes).or_insert(0) += 1;

        // -0.0 folds into 0.0
        let ipt = if ipt == 0.0 { 0.0 } else { ipt };
        *self.times.entry(ipt.to_bits()).or_insert(0) += 1;
    }

    pub fn flows(&self) -> u64 {
        self.flows
    }

    pub fn total(&self) -> Moments {
        self.total
    }

    pub fn outbound(&self) -> Moments {
        self.outbound
    }

    pub fn inbound(&self) -> Moments {
        self.inbound
    }

    /// `(byte count, occurrences)` in ascending byte-count order.
    pub fn lengths(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.lengths.iter().map(|(len, n)| (*len, *n))
    }

    /// `(inter-arrival time, occurrences)` in ascending time order.
    pub fn times(&self) -> impl Iterator<Item = (f64, u64)> + '_ {
        self.times.iter().map(|(bits, n)| (f64::from_bits(*bits), *n))
    }

    /// Compute the derived statistics for the current state.
    pub fn summarize(&self) -> StatsSummary {
        let per_flow = (self.flows > 0).then(|| {
            let flows = self.flows as f64;
            PerFlow {
                messages: self.total.count as f64 / flows,
                bytes: self.total.sum as f64 / flows,
                outbound_messages: self.outbound.count as f64 / flows,
                inbound_messages: self.inbound.count as f64 / flows,
            }
        });

        StatsSummary {
            flows: self.flows,
            messages: self.total.count,
            bytes: self.total.sum,
            outbound_messages: self.outbound.count,
            outbound_bytes: self.outbound.sum,
            inbound_messages: self.inbound.count,
            inbound_bytes: self.inbound.sum,
            per_flow,
            message_size: self.total.size_stats(),
            inbound_message_size: self.inbound.size_stats(),
            outbound_message_size: self.outbound.size_stats(),
        }
    }
}

impl fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "flows:      {:>5}", self.flows)?;
        writeln!(f, "messages:   {:>5}", self.messages)?;
        writeln!(f, "bytes:      {:>5}", self.bytes)?;
        writeln!(f, "> messages: {:>5}", self.outbound_messages)?;
        writeln!(f, "> bytes:    {:>5}", self.outbound_bytes)?;
        writeln!(f, "< messages: {:>5}", self.inbound_messages)?;
        writeln!(f, "< bytes:    {:>5}", self.inbound_bytes)?;

        if let Some(per_flow) = &self.per_flow {
            writeln!(f, "messages per flow:    {:>5?}", per_flow.messages)?;
            writeln!(f, "bytes per flow:       {:>5?}", per_flow.bytes)?;
            writeln!(f, "outbound messages per flow: {:>5?}", per_flow.outbound_messages)?;
            writeln!(f, "inbound messages per flow:  {:>5?}", per_flow.inbound_messages)?;
        }
        if let Some(size) = &self.message_size {
            writeln!(f, "average message size: {:>5?}", size.mean)?;
            writeln!(f, "std dev message size: {:>5?}", size.std_dev)?;
        }
        if let Some(size) = &self.inbound_message_size {
            writeln!(f, "average inbound message size: {:>5?}", size.mean)?;
            writeln!(f, "std dev inbound message size: {:>5?}", size.std_dev)?;
        }
        if let Some(size) = &self.outbound_message_size {
            writeln!(f, "average outbound message size: {:>5?}", size.mean)?;
            writeln!(f, "std dev outbound message size: {:>5?}", size.std_dev)?;
        }
        Ok(())
    }
}
