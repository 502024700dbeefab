//! Polls Ethereum execution and consensus nodes and exposes their sync
//! state, version and chain constants as gauges.

pub mod capability;
pub mod config;
pub mod consensus;
pub mod disk;
pub mod error;
pub mod execution;
pub mod exporter;
pub mod metrics;
pub mod scheduler;
pub mod server;
pub mod sink;
pub mod sync_status;
pub mod target;
pub mod types;
mod utils;

#[cfg(test)]
mod testing;

pub use capability::{Capability, CapabilitySet, NodeClient};
pub use config::Config;
pub use consensus::{BeaconNode, BeaconRpc};
pub use error::{InitializationError, QueryError};
pub use execution::{ExecutionNode, ExecutionRpc};
pub use exporter::Exporter;
pub use scheduler::{Collector, Scheduler};
pub use server::{cancel_on_shutdown_signal, MetricsServer};
pub use sink::{FanoutSink, MemorySink, MetricsSink, RecorderSink, TargetMetrics};
