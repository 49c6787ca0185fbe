//! Flow record data model.
//!
//! This module provides:
//! - `FieldValue` / `FlowRecord`, the schema-less value model for flows
//! - `FieldPath`, one- or two-segment field access with absence as a result
//! - `Observation`, the per-message view used by the statistics strategy

mod observation;
mod path;
mod value;

pub use observation::{Direction, Observation, OBSERVATIONS_FIELD};
pub use path::{FieldPath, Resolved};
pub use value::{FieldValue, FlowRecord};
