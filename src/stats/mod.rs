//! Incremental flow statistics.

mod running;

pub use running::{Moments, PerFlow, RunningStats, SizeStats, StatsSummary};
