//! Per-message observations drawn from a flow's `non_norm_stats` list.

use super::{FieldValue, FlowRecord};

/// Name of the per-message observation list in a flow record.
pub const OBSERVATIONS_FIELD: &str = "non_norm_stats";

/// Direction of a message relative to the flow initiator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Tagged `>`
    Outbound,
    /// Any other tag, conventionally `<`
    Inbound,
}

impl Direction {
    /// Map a direction tag to a direction. Only `>` is outbound.
    pub fn from_tag(tag: &str) -> Self {
        if tag == ">" {
            Direction::Outbound
        } else {
            Direction::Inbound
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Direction::Outbound => ">",
            Direction::Inbound => "<",
        }
    }
}

/// One message: byte count, direction and inter-arrival time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub bytes: u64,
    pub direction: Direction,
    pub ipt: f64,
}

impl Observation {
    /// Read an observation from one list element.
    ///
    /// Returns `None` when the element is not a record, lacks any of
    /// `b`/`dir`/`ipt`, or carries a negative time. Byte counts must be
    /// non-negative whole numbers; `10.0` counts as `10`.
    pub fn from_value(value: &FieldValue) -> Option<Self> {
        let element = value.as_record()?;
        let bytes = byte_count(element.get("b")?)?;
        let direction = Direction::from_tag(element.get("dir")?.as_str()?);
        let ipt = element.get("ipt")?.as_f64()?;
        if ipt < 0.0 {
            return None;
        }
        Some(Self {
            bytes,
            direction,
            ipt,
        })
    }

    /// All well-formed observations of a flow, in order.
    pub fn from_flow(flow: &FlowRecord) -> impl Iterator<Item = Observation> + '_ {
        flow.get(OBSERVATIONS_FIELD)
            .and_then(FieldValue::as_list)
            .unwrap_or_default()
            .iter()
            .filter_map(Observation::from_value)
    }
}

fn byte_count(value: &FieldValue) -> Option<u64> {
    match value {
        FieldValue::Int(v) => u64::try_from(*v).ok(),
        FieldValue::Float(v) if *v >= 0.0 && v.fract() == 0.0 && *v < u64::MAX as f64 => {
            Some(*v as u64)
        }
        _ => None,
    }
}
