use crate::capability::{
    BeaconBlockHeadersProvider, BeaconSyncProvider, GenesisProvider, NodeClient,
    NodeVersionProvider, SpecProvider,
};
use crate::types::{BeaconBlockHeader, BeaconSyncing, Genesis};
use crate::utils::deserialize_string_to_u64;
use async_trait::async_trait;
use eyre::WrapErr;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Consensus layer client speaking the standard Beacon API.
pub struct BeaconRpc {
    api_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct ApiResult<T> {
    data: T,
}

#[derive(Deserialize)]
struct VersionData {
    version: String,
}

#[derive(Deserialize)]
struct SyncingData {
    #[serde(deserialize_with = "deserialize_string_to_u64")]
    head_slot: u64,
    #[serde(deserialize_with = "deserialize_string_to_u64")]
    sync_distance: u64,
    // missing on clients predating the field
    is_syncing: Option<bool>,
}

#[derive(Deserialize)]
struct GenesisData {
    #[serde(deserialize_with = "deserialize_string_to_u64")]
    genesis_time: u64,
    genesis_validators_root: String,
    genesis_fork_version: String,
}

#[derive(Deserialize)]
struct HeaderData {
    root: String,
    header: SignedHeader,
}

#[derive(Deserialize)]
struct SignedHeader {
    message: HeaderMessage,
}

#[derive(Deserialize)]
struct HeaderMessage {
    #[serde(deserialize_with = "deserialize_string_to_u64")]
    slot: u64,
}

impl BeaconRpc {
    /// Every request, body included, is abandoned after `timeout`.
    pub fn new(api_url: String, timeout: Duration) -> eyre::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .wrap_err("Failed to build beacon API client")?;

        Ok(Self { api_url, client })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url.trim_end_matches('/'), path)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> eyre::Result<T> {
        let url = self.endpoint(path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .wrap_err_with(|| format!("GET {}", url))?
            .error_for_status()?;
        let result: ApiResult<T> = response
            .json()
            .await
            .wrap_err_with(|| format!("Invalid response from {}", url))?;
        Ok(result.data)
    }
}

#[async_trait]
impl NodeVersionProvider for BeaconRpc {
    async fn node_version(&self) -> eyre::Result<String> {
        let data: VersionData = self.get("eth/v1/node/version").await?;
        Ok(data.version)
    }
}

#[async_trait]
impl BeaconSyncProvider for BeaconRpc {
    async fn beacon_syncing(&self) -> eyre::Result<BeaconSyncing> {
        let data: SyncingData = self.get("eth/v1/node/syncing").await?;
        Ok(BeaconSyncing {
            head_slot: data.head_slot,
            sync_distance: data.sync_distance,
            is_syncing: data.is_syncing.unwrap_or(data.sync_distance > 0),
        })
    }
}

#[async_trait]
impl SpecProvider for BeaconRpc {
    async fn spec(&self) -> eyre::Result<HashMap<String, String>> {
        let data: HashMap<String, serde_json::Value> = self.get("eth/v1/config/spec").await?;
        Ok(stringify_spec(data))
    }
}

#[async_trait]
impl GenesisProvider for BeaconRpc {
    async fn genesis(&self) -> eyre::Result<Genesis> {
        let data: GenesisData = self.get("eth/v1/beacon/genesis").await?;
        Ok(Genesis {
            genesis_time: data.genesis_time,
            genesis_validators_root: data.genesis_validators_root,
            genesis_fork_version: data.genesis_fork_version,
        })
    }
}

#[async_trait]
impl BeaconBlockHeadersProvider for BeaconRpc {
    async fn beacon_block_header(&self, block_id: &str) -> eyre::Result<BeaconBlockHeader> {
        let data: HeaderData = self
            .get(&format!("eth/v1/beacon/headers/{}", block_id))
            .await?;
        Ok(BeaconBlockHeader {
            root: data.root,
            slot: data.header.message.slot,
        })
    }
}

impl NodeClient for BeaconRpc {
    fn node_version_provider(&self) -> Option<&(dyn NodeVersionProvider + 'static)> {
        Some(self)
    }

    fn beacon_sync_provider(&self) -> Option<&(dyn BeaconSyncProvider + 'static)> {
        Some(self)
    }

    fn spec_provider(&self) -> Option<&(dyn SpecProvider + 'static)> {
        Some(self)
    }

    fn genesis_provider(&self) -> Option<&(dyn GenesisProvider + 'static)> {
        Some(self)
    }

    fn beacon_block_headers_provider(&self) -> Option<&(dyn BeaconBlockHeadersProvider + 'static)> {
        Some(self)
    }
}

/// Spec values are strings on every client, but some nest lists or numbers.
fn stringify_spec(data: HashMap<String, serde_json::Value>) -> HashMap<String, String> {
    data.into_iter()
        .map(|(key, value)| {
            let value = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client =
            BeaconRpc::new("http://localhost:5052/".to_string(), Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.endpoint("eth/v1/node/version"),
            "http://localhost:5052/eth/v1/node/version"
        );
    }

    #[test]
    fn test_decode_header_response() {
        let body = r#"{
            "execution_optimistic": false,
            "data": {
                "root": "0xcf8e0d4e9587369b2301d0790347320302cc0943d5a1884560367e8208d920f2",
                "canonical": true,
                "header": {
                    "message": {
                        "slot": "4636672",
                        "proposer_index": "1",
                        "parent_root": "0x00",
                        "state_root": "0x00",
                        "body_root": "0x00"
                    },
                    "signature": "0x00"
                }
            }
        }"#;

        let result: ApiResult<HeaderData> = serde_json::from_str(body).unwrap();
        assert_eq!(result.data.header.message.slot, 4636672);
    }

    #[test]
    fn test_decode_syncing_response() {
        let body = r#"{"data": {"head_slot": "100", "sync_distance": "5", "is_optimistic": false}}"#;

        let result: ApiResult<SyncingData> = serde_json::from_str(body).unwrap();
        assert_eq!(result.data.head_slot, 100);
        assert_eq!(result.data.sync_distance, 5);
        assert_eq!(result.data.is_syncing, None);
    }

    #[test]
    fn test_decode_genesis_response() {
        let body = r#"{"data": {
            "genesis_time": "1606824023",
            "genesis_validators_root": "0x4b363db94e286120d76eb905340fdd4e54bfe9f06bf33ff6cf5ad27f511bfe95",
            "genesis_fork_version": "0x00000000"
        }}"#;

        let result: ApiResult<GenesisData> = serde_json::from_str(body).unwrap();
        assert_eq!(result.data.genesis_time, 1606824023);
        assert_eq!(result.data.genesis_fork_version, "0x00000000");
    }

    #[test]
    fn test_spec_values_are_stringified() {
        let data: HashMap<String, serde_json::Value> = serde_json::from_str(
            r#"{"SECONDS_PER_SLOT": "12", "SLOTS_PER_EPOCH": 32, "CONFIG_NAME": "mainnet"}"#,
        )
        .unwrap();

        let spec = stringify_spec(data);
        assert_eq!(spec["SECONDS_PER_SLOT"], "12");
        assert_eq!(spec["SLOTS_PER_EPOCH"], "32");
        assert_eq!(spec["CONFIG_NAME"], "mainnet");
    }

    #[tokio::test]
    async fn test_silent_node_times_out() -> eyre::Result<()> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        // accepts connections but never writes a response
        let silent = tokio::spawn(async move {
            let mut sockets = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                sockets.push(socket);
            }
        });

        let client = BeaconRpc::new(format!("http://{}", addr), Duration::from_millis(200))?;
        let result = tokio::time::timeout(Duration::from_secs(5), client.node_version()).await?;
        assert!(result.is_err());

        silent.abort();
        Ok(())
    }
}
