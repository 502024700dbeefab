//! Scriptable node client used by the unit tests.

use crate::capability::*;
use crate::types::{BeaconBlockHeader, BeaconSyncing, Genesis, SyncProgress};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

type Answer<T> = Option<Result<T, String>>;

fn answer<T: Clone>(value: &Answer<T>) -> eyre::Result<T> {
    match value {
        Some(Ok(value)) => Ok(value.clone()),
        Some(Err(err)) => Err(eyre::eyre!("{}", err)),
        None => Err(eyre::eyre!("called a capability that was never configured")),
    }
}

/// Every capability starts unsupported; the `with_*` builders enable them.
#[derive(Default)]
pub struct MockClient {
    version: Answer<String>,
    sync_progress: Answer<Option<SyncProgress>>,
    beacon_syncing: Answer<BeaconSyncing>,
    network_id: Answer<u64>,
    spec: Answer<HashMap<String, String>>,
    genesis: Answer<Genesis>,
    genesis_failures: AtomicUsize,
    headers: Option<HashMap<String, Result<u64, String>>>,
    pub spec_calls: AtomicUsize,
    pub genesis_calls: AtomicUsize,
    pub header_calls: AtomicUsize,
}

impl MockClient {
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(Ok(version.to_string()));
        self
    }

    pub fn with_sync_progress(mut self, progress: Option<SyncProgress>) -> Self {
        self.sync_progress = Some(Ok(progress));
        self
    }

    pub fn with_failing_sync_progress(mut self, err: &str) -> Self {
        self.sync_progress = Some(Err(err.to_string()));
        self
    }

    pub fn with_beacon_syncing(mut self, head_slot: u64, sync_distance: u64) -> Self {
        self.beacon_syncing = Some(Ok(BeaconSyncing {
            head_slot,
            sync_distance,
            is_syncing: sync_distance > 0,
        }));
        self
    }

    pub fn with_network_id(mut self, id: u64) -> Self {
        self.network_id = Some(Ok(id));
        self
    }

    pub fn with_spec(mut self, spec: HashMap<String, String>) -> Self {
        self.spec = Some(Ok(spec));
        self
    }

    pub fn with_failing_spec(mut self, err: &str) -> Self {
        self.spec = Some(Err(err.to_string()));
        self
    }

    pub fn with_genesis(mut self, genesis: Genesis) -> Self {
        self.genesis = Some(Ok(genesis));
        self
    }

    pub fn with_failing_genesis(mut self, err: &str) -> Self {
        self.genesis = Some(Err(err.to_string()));
        self
    }

    /// Genesis fails `times` calls before the configured answer is returned.
    pub fn with_genesis_failures(self, times: usize) -> Self {
        self.genesis_failures.store(times, Ordering::SeqCst);
        self
    }

    pub fn with_header(mut self, block_id: &str, slot: Result<u64, &str>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(block_id.to_string(), slot.map_err(|e| e.to_string()));
        self
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

pub fn sample_spec() -> HashMap<String, String> {
    [
        ("CONFIG_NAME", "mainnet"),
        ("PRESET_BASE", "mainnet"),
        ("SECONDS_PER_SLOT", "12"),
        ("SLOTS_PER_EPOCH", "32"),
        ("MAX_EFFECTIVE_BALANCE", "32000000000"),
        ("DEPOSIT_CHAIN_ID", "1"),
        ("DEPOSIT_NETWORK_ID", "1"),
        ("GENESIS_FORK_VERSION", "0x00000000"),
        (
            "TERMINAL_TOTAL_DIFFICULTY",
            "58750000000000000000000",
        ),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

pub fn sample_genesis() -> Genesis {
    Genesis {
        genesis_time: 1606824023,
        genesis_validators_root:
            "0x4b363db94e286120d76eb905340fdd4e54bfe9f06bf33ff6cf5ad27f511bfe95".to_string(),
        genesis_fork_version: "0x00000000".to_string(),
    }
}

#[async_trait]
impl NodeVersionProvider for MockClient {
    async fn node_version(&self) -> eyre::Result<String> {
        answer(&self.version)
    }
}

#[async_trait]
impl SyncProgressProvider for MockClient {
    async fn sync_progress(&self) -> eyre::Result<Option<SyncProgress>> {
        answer(&self.sync_progress)
    }
}

#[async_trait]
impl BeaconSyncProvider for MockClient {
    async fn beacon_syncing(&self) -> eyre::Result<BeaconSyncing> {
        answer(&self.beacon_syncing)
    }
}

#[async_trait]
impl NetworkIdProvider for MockClient {
    async fn network_id(&self) -> eyre::Result<u64> {
        answer(&self.network_id)
    }
}

#[async_trait]
impl SpecProvider for MockClient {
    async fn spec(&self) -> eyre::Result<HashMap<String, String>> {
        self.spec_calls.fetch_add(1, Ordering::SeqCst);
        answer(&self.spec)
    }
}

#[async_trait]
impl GenesisProvider for MockClient {
    async fn genesis(&self) -> eyre::Result<Genesis> {
        self.genesis_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.genesis_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.genesis_failures.store(remaining - 1, Ordering::SeqCst);
            eyre::bail!("genesis not available yet");
        }
        answer(&self.genesis)
    }
}

#[async_trait]
impl BeaconBlockHeadersProvider for MockClient {
    async fn beacon_block_header(&self, block_id: &str) -> eyre::Result<BeaconBlockHeader> {
        self.header_calls.fetch_add(1, Ordering::SeqCst);
        let headers = self.headers.as_ref();
        match headers.and_then(|h| h.get(block_id)) {
            Some(Ok(slot)) => Ok(BeaconBlockHeader {
                root: format!("0x{:064x}", slot),
                slot: *slot,
            }),
            Some(Err(err)) => Err(eyre::eyre!("{}", err)),
            None => Err(eyre::eyre!("block {} not found", block_id)),
        }
    }
}

impl NodeClient for MockClient {
    fn node_version_provider(&self) -> Option<&(dyn NodeVersionProvider + 'static)> {
        if self.version.is_some() {
            Some(self)
        } else {
            None
        }
    }

    fn sync_progress_provider(&self) -> Option<&(dyn SyncProgressProvider + 'static)> {
        if self.sync_progress.is_some() {
            Some(self)
        } else {
            None
        }
    }

    fn beacon_sync_provider(&self) -> Option<&(dyn BeaconSyncProvider + 'static)> {
        if self.beacon_syncing.is_some() {
            Some(self)
        } else {
            None
        }
    }

    fn network_id_provider(&self) -> Option<&(dyn NetworkIdProvider + 'static)> {
        if self.network_id.is_some() {
            Some(self)
        } else {
            None
        }
    }

    fn spec_provider(&self) -> Option<&(dyn SpecProvider + 'static)> {
        if self.spec.is_some() {
            Some(self)
        } else {
            None
        }
    }

    fn genesis_provider(&self) -> Option<&(dyn GenesisProvider + 'static)> {
        if self.genesis.is_some() {
            Some(self)
        } else {
            None
        }
    }

    fn beacon_block_headers_provider(&self) -> Option<&(dyn BeaconBlockHeadersProvider + 'static)> {
        if self.headers.is_some() {
            Some(self)
        } else {
            None
        }
    }
}
