use crate::config::Config;
use crate::consensus::{BeaconRpc, ConsensusCollectors};
use crate::disk::DiskUsage;
use crate::execution::ExecutionNode;
use crate::scheduler::Scheduler;
use crate::sink::MetricsSink;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Builds the collectors of every enabled target and runs them.
pub struct Exporter {
    config: Config,
    sink: Arc<dyn MetricsSink>,
}

impl Exporter {
    pub fn new(config: Config, sink: Arc<dyn MetricsSink>) -> Self {
        Self { config, sink }
    }

    fn namespace(&self, subsystem: &str) -> String {
        if self.config.namespace.is_empty() {
            subsystem.to_string()
        } else {
            format!("{}_{}", self.config.namespace, subsystem)
        }
    }

    /// Schedule one loop per collector on `token`. Node requests time out
    /// after one polling interval.
    pub fn schedule(&self, token: CancellationToken) -> eyre::Result<Scheduler> {
        let mut scheduler = Scheduler::new(token);
        let polling_interval = self.config.polling_interval();

        let execution = &self.config.execution;
        if execution.enabled {
            tracing::info!(node = %execution.name, url = %execution.url, "Monitoring execution node");
            scheduler.spawn(ExecutionNode::new(
                execution.name.clone(),
                execution.url.clone(),
                self.sink.clone(),
                &self.namespace("exe"),
                polling_interval,
            ));
        }

        let consensus = &self.config.consensus;
        if consensus.enabled {
            tracing::info!(node = %consensus.name, url = %consensus.url, "Monitoring consensus node");
            let client = Arc::new(BeaconRpc::new(consensus.url.clone(), polling_interval)?);
            let collectors = ConsensusCollectors::new(
                &consensus.name,
                &consensus.url,
                client,
                self.sink.clone(),
                &self.namespace("con"),
                polling_interval,
            );
            scheduler.spawn(collectors.node);
            scheduler.spawn(collectors.general);
            scheduler.spawn(collectors.sync);
        }

        let disk = &self.config.disk_usage;
        if disk.enabled {
            tracing::info!(directories = ?disk.directories, "Monitoring disk usage");
            scheduler.spawn(DiskUsage::new(
                disk.directories.clone(),
                self.sink.clone(),
                &self.namespace("disk"),
                polling_interval,
            ));
        }

        Ok(scheduler)
    }

    /// Run until `token` is cancelled and every loop has exited.
    pub async fn start(self, token: CancellationToken) -> eyre::Result<()> {
        self.config.validate()?;

        let scheduler = self.schedule(token)?;
        if scheduler.is_empty() {
            tracing::warn!("No targets enabled, nothing to do");
        }
        scheduler.join().await;

        tracing::info!("Exporter stopped");
        Ok(())
    }
}
