//! Execution node collector.

mod client;

pub use client::ExecutionRpc;

use crate::capability::{kind, probe, Capability, CapabilitySet, NodeClient};
use crate::error::{log_query_error, QueryError};
use crate::scheduler::Collector;
use crate::sink::{MetricsSink, TargetMetrics};
use crate::sync_status::ExecutionSyncStatus;
use crate::target::{Target, TargetKind};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub struct ExecutionNode {
    target: Target,
    client: Option<Arc<dyn NodeClient>>,
    metrics: TargetMetrics,
    interval: Duration,
}

impl ExecutionNode {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        sink: Arc<dyn MetricsSink>,
        namespace: &str,
        interval: Duration,
    ) -> Self {
        let target = Target::new(TargetKind::Execution, name, url);
        let metrics = TargetMetrics::for_target(sink, namespace, &target);

        Self {
            target,
            client: None,
            metrics,
            interval,
        }
    }

    /// Use an already connected client instead of dialing the target URL.
    pub fn with_client(mut self, client: Arc<dyn NodeClient>) -> Self {
        self.set_client(client);
        self
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    fn set_client(&mut self, client: Arc<dyn NodeClient>) {
        tracing::info!(
            node = %self.target.name,
            capabilities = %CapabilitySet::detect(client.as_ref()),
            "Connected to execution node"
        );
        self.client = Some(client);
        self.target.mark_bootstrapped();
    }

    pub async fn bootstrap(&mut self) -> eyre::Result<()> {
        // a request never outlives one polling period
        let client = ExecutionRpc::connect(&self.target.url, self.interval).await?;
        self.set_client(Arc::new(client));
        Ok(())
    }

    pub async fn node_version(&self, client: &dyn NodeClient) -> Result<String, QueryError> {
        let provider = probe::<kind::NodeVersion>(client)?;
        let version = provider
            .node_version()
            .await
            .map_err(|e| QueryError::transient(Capability::NodeVersion, e))?;

        self.metrics
            .set_labeled("node_version", &[("version", &version)], 1.0);

        Ok(version)
    }

    pub async fn sync_status(&self, client: &dyn NodeClient) -> Result<ExecutionSyncStatus, QueryError> {
        let provider = probe::<kind::SyncProgress>(client)?;
        let progress = provider
            .sync_progress()
            .await
            .map_err(|e| QueryError::transient(Capability::SyncStatus, e))?;

        let status = ExecutionSyncStatus::from_progress(progress);
        status.observe(&self.metrics);

        Ok(status)
    }

    pub async fn network_id(&self, client: &dyn NodeClient) -> Result<u64, QueryError> {
        let provider = probe::<kind::NetworkId>(client)?;
        let id = provider
            .network_id()
            .await
            .map_err(|e| QueryError::transient(Capability::NetworkId, e))?;

        self.metrics.set("network_id", id as f64);

        Ok(id)
    }
}

#[async_trait]
impl Collector for ExecutionNode {
    fn name(&self) -> &str {
        &self.target.name
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn tick(&mut self) {
        if !self.target.is_bootstrapped() {
            if let Err(err) = self.bootstrap().await {
                tracing::error!(node = %self.target.name, "Failed to bootstrap execution node: {:#}", err);
                return;
            }
        }

        let Some(client) = self.client.clone() else {
            return;
        };
        let name = self.target.name.as_str();

        if let Err(err) = self.node_version(client.as_ref()).await {
            log_query_error(name, "node version", &err);
        }

        if let Err(err) = self.sync_status(client.as_ref()).await {
            log_query_error(name, "sync status", &err);
        }

        if let Err(err) = self.network_id(client.as_ref()).await {
            log_query_error(name, "network id", &err);
        }
    }
}
