//! Metric jobs of a consensus target. Each one is its own collector with its
//! own cadence.

mod general;
mod spec;
mod sync;

pub use general::{General, BLOCK_IDENTIFIERS, NAME_GENERAL};
pub use spec::{observe_spec, SPEC_GAUGES};
pub use sync::{SyncStatusJob, NAME_SYNC};
