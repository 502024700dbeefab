use crate::capability::{NetworkIdProvider, NodeClient, NodeVersionProvider, SyncProgressProvider};
use crate::types::SyncProgress;
use alloy_provider::{Provider, ProviderBuilder, RootProvider};
use alloy_rpc_types_eth::SyncStatus;
use alloy_transport::BoxTransport;
use async_trait::async_trait;
use eyre::WrapErr;
use std::future::IntoFuture;
use std::time::Duration;

/// Execution layer JSON-RPC client (Geth, Nethermind, Besu, Erigon, Reth).
pub struct ExecutionRpc {
    provider: RootProvider<BoxTransport>,
    timeout: Duration,
}

impl ExecutionRpc {
    /// Calls that take longer than `timeout` fail instead of holding up the
    /// collector.
    pub async fn connect(rpc_url: &str, timeout: Duration) -> eyre::Result<Self> {
        let provider: RootProvider<BoxTransport> =
            tokio::time::timeout(timeout, ProviderBuilder::new().on_builtin(rpc_url))
                .await
                .map_err(|_| eyre::eyre!("Timed out connecting to {}", rpc_url))?
                .wrap_err_with(|| format!("Failed to create provider for {}", rpc_url))?;

        Ok(Self { provider, timeout })
    }

    async fn call<T, E>(&self, method: &str, request: impl IntoFuture<Output = Result<T, E>>) -> eyre::Result<T>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let response = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| eyre::eyre!("{} timed out after {:?}", method, self.timeout))?;
        Ok(response?)
    }
}

#[async_trait]
impl NodeVersionProvider for ExecutionRpc {
    async fn node_version(&self) -> eyre::Result<String> {
        self.call("web3_clientVersion", self.provider.get_client_version())
            .await
    }
}

#[async_trait]
impl SyncProgressProvider for ExecutionRpc {
    async fn sync_progress(&self) -> eyre::Result<Option<SyncProgress>> {
        match self.call("eth_syncing", self.provider.syncing()).await? {
            SyncStatus::Info(info) => Ok(Some(SyncProgress {
                current_block: info.current_block.saturating_to::<u64>(),
                highest_block: info.highest_block.saturating_to::<u64>(),
                starting_block: info.starting_block.saturating_to::<u64>(),
            })),
            // `eth_syncing` answers `false` once the node has caught up
            SyncStatus::None => Ok(None),
        }
    }
}

#[async_trait]
impl NetworkIdProvider for ExecutionRpc {
    async fn network_id(&self) -> eyre::Result<u64> {
        self.call("net_version", self.provider.get_net_version())
            .await
    }
}

impl NodeClient for ExecutionRpc {
    fn node_version_provider(&self) -> Option<&(dyn NodeVersionProvider + 'static)> {
        Some(self)
    }

    fn sync_progress_provider(&self) -> Option<&(dyn SyncProgressProvider + 'static)> {
        Some(self)
    }

    fn network_id_provider(&self) -> Option<&(dyn NetworkIdProvider + 'static)> {
        Some(self)
    }
}
