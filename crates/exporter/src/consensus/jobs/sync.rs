use crate::capability::{kind, probe, Capability, NodeClient};
use crate::error::{log_query_error, QueryError};
use crate::scheduler::Collector;
use crate::sink::TargetMetrics;
use crate::sync_status::ConsensusSyncStatus;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub const NAME_SYNC: &str = "sync";

/// Head slot and sync distance of the beacon node.
pub struct SyncStatusJob {
    name: String,
    node: String,
    client: Arc<dyn NodeClient>,
    metrics: TargetMetrics,
    interval: Duration,
}

impl SyncStatusJob {
    pub fn new(
        node: &str,
        client: Arc<dyn NodeClient>,
        metrics: TargetMetrics,
        interval: Duration,
    ) -> Self {
        Self {
            name: format!("{}-{}", node, NAME_SYNC),
            node: node.to_string(),
            client,
            metrics,
            interval,
        }
    }

    pub async fn sync_status(&self) -> Result<ConsensusSyncStatus, QueryError> {
        let provider = probe::<kind::BeaconSync>(self.client.as_ref())?;
        let syncing = provider
            .beacon_syncing()
            .await
            .map_err(|e| QueryError::transient(Capability::SyncStatus, e))?;

        let status = ConsensusSyncStatus::from(syncing);
        status.observe(&self.metrics);

        Ok(status)
    }
}

#[async_trait]
impl Collector for SyncStatusJob {
    fn name(&self) -> &str {
        &self.name
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn tick(&mut self) {
        if let Err(err) = self.sync_status().await {
            log_query_error(&self.node, "sync status", &err);
        }
    }
}
