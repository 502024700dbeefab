use crate::capability::{kind, probe, Capability, NodeClient};
use crate::error::{log_query_error, QueryError};
use crate::scheduler::Collector;
use crate::sink::TargetMetrics;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub const NAME_GENERAL: &str = "general";

/// Named blocks whose slot is tracked in `slot_number{identifier}`.
pub const BLOCK_IDENTIFIERS: [&str; 3] = ["head", "genesis", "finalized"];

/// Node version and the slots of the named beacon blocks. Needs neither spec
/// nor genesis, so it runs regardless of the state lifecycle.
pub struct General {
    name: String,
    node: String,
    client: Arc<dyn NodeClient>,
    metrics: TargetMetrics,
    interval: Duration,
}

impl General {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(15);

    pub fn new(node: &str, client: Arc<dyn NodeClient>, metrics: TargetMetrics) -> Self {
        Self {
            name: format!("{}-{}", node, NAME_GENERAL),
            node: node.to_string(),
            client,
            metrics,
            interval: Self::DEFAULT_INTERVAL,
        }
    }

    pub async fn node_version(&self) -> Result<String, QueryError> {
        let provider = probe::<kind::NodeVersion>(self.client.as_ref())?;
        let version = provider
            .node_version()
            .await
            .map_err(|e| QueryError::transient(Capability::NodeVersion, e))?;

        self.metrics
            .set_labeled("node_version", &[("version", &version)], 1.0);

        Ok(version)
    }

    pub async fn beacon_slot(&self, identifier: &str) -> Result<u64, QueryError> {
        let provider = probe::<kind::BeaconBlockHeaders>(self.client.as_ref())?;
        let header = provider
            .beacon_block_header(identifier)
            .await
            .map_err(|e| QueryError::transient(Capability::BeaconBlockHeaders, e))?;

        self.metrics
            .set_labeled("slot_number", &[("identifier", identifier)], header.slot as f64);

        Ok(header.slot)
    }
}

#[async_trait]
impl Collector for General {
    fn name(&self) -> &str {
        &self.name
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn tick(&mut self) {
        if let Err(err) = self.node_version().await {
            log_query_error(&self.node, "node version", &err);
        }

        for identifier in BLOCK_IDENTIFIERS {
            if let Err(err) = self.beacon_slot(identifier).await {
                log_query_error(&self.node, &format!("beacon slot: {}", identifier), &err);
            }
        }
    }
}
