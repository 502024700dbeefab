//! Optional node query operations and runtime detection of which ones a
//! client handle exposes.
//!
//! Every optional operation is its own small trait. A [`NodeClient`] hands out
//! each of them through an accessor that returns `None` unless the concrete
//! client implements it, so support is fixed when the client is built and
//! asking for it again is just a method call. [`probe`] turns a missing
//! accessor into [`QueryError::Unsupported`] instead of a hard failure.

use crate::error::QueryError;
use crate::types::{BeaconBlockHeader, BeaconSyncing, Genesis, SyncProgress};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    NodeVersion,
    SyncStatus,
    NetworkId,
    Spec,
    Genesis,
    BeaconBlockHeaders,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::NodeVersion,
        Capability::SyncStatus,
        Capability::NetworkId,
        Capability::Spec,
        Capability::Genesis,
        Capability::BeaconBlockHeaders,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::NodeVersion => "node version",
            Capability::SyncStatus => "sync status",
            Capability::NetworkId => "network id",
            Capability::Spec => "spec",
            Capability::Genesis => "genesis",
            Capability::BeaconBlockHeaders => "beacon block headers",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait NodeVersionProvider: Send + Sync {
    async fn node_version(&self) -> eyre::Result<String>;
}

/// Execution sync progress. `Ok(None)` means the node reported no progress
/// object: it is not syncing.
#[async_trait]
pub trait SyncProgressProvider: Send + Sync {
    async fn sync_progress(&self) -> eyre::Result<Option<SyncProgress>>;
}

#[async_trait]
pub trait BeaconSyncProvider: Send + Sync {
    async fn beacon_syncing(&self) -> eyre::Result<BeaconSyncing>;
}

#[async_trait]
pub trait NetworkIdProvider: Send + Sync {
    async fn network_id(&self) -> eyre::Result<u64>;
}

#[async_trait]
pub trait SpecProvider: Send + Sync {
    async fn spec(&self) -> eyre::Result<HashMap<String, String>>;
}

#[async_trait]
pub trait GenesisProvider: Send + Sync {
    async fn genesis(&self) -> eyre::Result<Genesis>;
}

#[async_trait]
pub trait BeaconBlockHeadersProvider: Send + Sync {
    /// `block_id` is a named identifier ("head", "genesis", "finalized"), a
    /// slot number or a block root.
    async fn beacon_block_header(&self, block_id: &str) -> eyre::Result<BeaconBlockHeader>;
}

/// A connection to a node. Implementors override the accessor of every
/// operation they support, usually with `Some(self)`.
pub trait NodeClient: Send + Sync {
    fn node_version_provider(&self) -> Option<&(dyn NodeVersionProvider + 'static)> {
        None
    }

    fn sync_progress_provider(&self) -> Option<&(dyn SyncProgressProvider + 'static)> {
        None
    }

    fn beacon_sync_provider(&self) -> Option<&(dyn BeaconSyncProvider + 'static)> {
        None
    }

    fn network_id_provider(&self) -> Option<&(dyn NetworkIdProvider + 'static)> {
        None
    }

    fn spec_provider(&self) -> Option<&(dyn SpecProvider + 'static)> {
        None
    }

    fn genesis_provider(&self) -> Option<&(dyn GenesisProvider + 'static)> {
        None
    }

    fn beacon_block_headers_provider(&self) -> Option<&(dyn BeaconBlockHeadersProvider + 'static)> {
        None
    }
}

/// Type-level name of a capability, used to select its provider trait.
pub trait CapabilityKind {
    type Provider: ?Sized;
    const CAPABILITY: Capability;

    fn select(client: &dyn NodeClient) -> Option<&Self::Provider>;
}

pub mod kind {
    use super::*;

    macro_rules! capability_kind {
        ($name:ident, $provider:ident, $capability:ident, $accessor:ident) => {
            pub struct $name;

            impl CapabilityKind for $name {
                type Provider = dyn $provider;
                const CAPABILITY: Capability = Capability::$capability;

                fn select(client: &dyn NodeClient) -> Option<&Self::Provider> {
                    client.$accessor()
                }
            }
        };
    }

    capability_kind!(NodeVersion, NodeVersionProvider, NodeVersion, node_version_provider);
    capability_kind!(SyncProgress, SyncProgressProvider, SyncStatus, sync_progress_provider);
    capability_kind!(BeaconSync, BeaconSyncProvider, SyncStatus, beacon_sync_provider);
    capability_kind!(NetworkId, NetworkIdProvider, NetworkId, network_id_provider);
    capability_kind!(Spec, SpecProvider, Spec, spec_provider);
    capability_kind!(Genesis, GenesisProvider, Genesis, genesis_provider);
    capability_kind!(
        BeaconBlockHeaders,
        BeaconBlockHeadersProvider,
        BeaconBlockHeaders,
        beacon_block_headers_provider
    );
}

/// Select the provider of capability `K`, or report it as unsupported.
pub fn probe<K: CapabilityKind>(client: &dyn NodeClient) -> Result<&K::Provider, QueryError> {
    K::select(client).ok_or(QueryError::Unsupported(K::CAPABILITY))
}

pub fn supports(client: &dyn NodeClient, capability: Capability) -> bool {
    match capability {
        Capability::NodeVersion => client.node_version_provider().is_some(),
        Capability::SyncStatus => {
            client.sync_progress_provider().is_some() || client.beacon_sync_provider().is_some()
        }
        Capability::NetworkId => client.network_id_provider().is_some(),
        Capability::Spec => client.spec_provider().is_some(),
        Capability::Genesis => client.genesis_provider().is_some(),
        Capability::BeaconBlockHeaders => client.beacon_block_headers_provider().is_some(),
    }
}

/// The capabilities a client connection exposes. Invariant for the lifetime
/// of the connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    pub fn detect(client: &dyn NodeClient) -> Self {
        Self(
            Capability::ALL
                .into_iter()
                .filter(|capability| supports(client, *capability))
                .collect(),
        )
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|c| c.as_str()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}
