//! Raw values returned by node queries, before any normalization.

use serde::{Deserialize, Serialize};

/// Block counters reported by an execution node that is still syncing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncProgress {
    pub current_block: u64,
    pub highest_block: u64,
    pub starting_block: u64,
}

/// Sync view of a beacon node (`/eth/v1/node/syncing`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconSyncing {
    pub head_slot: u64,
    pub sync_distance: u64,
    pub is_syncing: bool,
}

/// Origin parameters of the consensus chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genesis {
    /// Unix timestamp in seconds.
    pub genesis_time: u64,
    pub genesis_validators_root: String,
    pub genesis_fork_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconBlockHeader {
    pub root: String,
    pub slot: u64,
}
