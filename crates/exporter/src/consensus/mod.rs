//! Consensus (beacon) node collectors.

mod client;
pub mod jobs;
mod node;
pub mod state;

pub use client::BeaconRpc;
pub use node::BeaconNode;

use crate::capability::NodeClient;
use crate::sink::{MetricsSink, TargetMetrics};
use crate::target::{Target, TargetKind};
use jobs::{General, SyncStatusJob};
use std::sync::Arc;
use std::time::Duration;

/// Every collector of one consensus target, sharing a single client.
pub struct ConsensusCollectors {
    pub node: BeaconNode,
    pub general: General,
    pub sync: SyncStatusJob,
}

impl ConsensusCollectors {
    pub fn new(
        name: &str,
        url: &str,
        client: Arc<dyn NodeClient>,
        sink: Arc<dyn MetricsSink>,
        namespace: &str,
        polling_interval: Duration,
    ) -> Self {
        let target = Target::new(TargetKind::Consensus, name, url);
        let metrics = TargetMetrics::for_target(sink, namespace, &target);

        Self {
            node: BeaconNode::new(target, client.clone(), metrics.clone()),
            general: General::new(name, client.clone(), metrics.clone()),
            sync: SyncStatusJob::new(name, client, metrics, polling_interval),
        }
    }
}
