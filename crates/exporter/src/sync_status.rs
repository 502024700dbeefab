//! Normalized sync snapshots and the percentage-complete calculation.
//!
//! A snapshot is rebuilt from scratch on every successful tick and written
//! straight to the sink; nothing is kept between ticks.

use crate::sink::TargetMetrics;
use crate::types::{BeaconSyncing, SyncProgress};

/// `(current - starting) / (highest - starting) * 100`, clamped into
/// `[0, 100]`. A node whose highest height equals its starting height has
/// nothing left to sync and is at 100%.
pub fn percentage(current: u64, starting: u64, highest: u64) -> f64 {
    if highest == starting {
        return 100.0;
    }

    let done = current as f64 - starting as f64;
    let total = highest as f64 - starting as f64;
    (done / total * 100.0).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecutionSyncStatus {
    pub is_syncing: bool,
    pub current_block: u64,
    pub highest_block: u64,
    pub starting_block: u64,
}

impl ExecutionSyncStatus {
    /// Build from the node's answer. An absent progress object with no error
    /// is the node saying it is fully caught up: not syncing, counters unset.
    pub fn from_progress(progress: Option<SyncProgress>) -> Self {
        match progress {
            None => Self::default(),
            Some(progress) => Self {
                is_syncing: true,
                current_block: progress.current_block,
                highest_block: progress.highest_block,
                starting_block: progress.starting_block,
            },
        }
    }

    pub fn percent(&self) -> f64 {
        if !self.is_syncing {
            return 100.0;
        }
        percentage(self.current_block, self.starting_block, self.highest_block)
    }

    pub fn observe(&self, metrics: &TargetMetrics) {
        metrics.set_flag("sync_is_syncing", self.is_syncing);
        metrics.set("sync_current_block", self.current_block as f64);
        metrics.set("sync_highest_block", self.highest_block as f64);
        metrics.set("sync_starting_block", self.starting_block as f64);
        metrics.set("sync_percentage", self.percent());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConsensusSyncStatus {
    pub is_syncing: bool,
    pub head_slot: u64,
    pub sync_distance: u64,
}

impl ConsensusSyncStatus {
    pub fn estimated_highest_slot(&self) -> u64 {
        self.head_slot.saturating_add(self.sync_distance)
    }

    pub fn percent(&self) -> f64 {
        percentage(self.head_slot, 0, self.estimated_highest_slot())
    }

    pub fn observe(&self, metrics: &TargetMetrics) {
        metrics.set_flag("sync_is_syncing", self.is_syncing);
        metrics.set("sync_head_slot", self.head_slot as f64);
        metrics.set(
            "sync_estimated_highest_slot",
            self.estimated_highest_slot() as f64,
        );
        metrics.set("sync_distance", self.sync_distance as f64);
        metrics.set("sync_percentage", self.percent());
    }
}

impl From<BeaconSyncing> for ConsensusSyncStatus {
    fn from(syncing: BeaconSyncing) -> Self {
        Self {
            is_syncing: syncing.is_syncing,
            head_slot: syncing.head_slot,
            sync_distance: syncing.sync_distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{Labels, MemorySink};
    use std::sync::Arc;

    #[test]
    fn test_percentage_without_range_is_complete() {
        for height in [0, 1, 17_000_000] {
            assert_eq!(percentage(0, height, height), 100.0);
            assert_eq!(percentage(height, height, height), 100.0);
        }
    }

    #[test]
    fn test_percentage_at_start_is_zero() {
        assert_eq!(percentage(0, 0, 100), 0.0);
        assert_eq!(percentage(500, 500, 1000), 0.0);
    }

    #[test]
    fn test_percentage_is_clamped() {
        assert_eq!(percentage(150, 0, 100), 100.0);
        assert_eq!(percentage(10, 50, 100), 0.0);
        assert_eq!(percentage(75, 50, 100), 50.0);
    }

    #[test]
    fn test_halfway_sync() {
        let status = ExecutionSyncStatus::from_progress(Some(SyncProgress {
            current_block: 50,
            highest_block: 100,
            starting_block: 0,
        }));

        assert!(status.is_syncing);
        assert_eq!(status.percent(), 50.0);
    }

    #[test]
    fn test_no_progress_means_not_syncing() {
        let status = ExecutionSyncStatus::from_progress(None);

        assert!(!status.is_syncing);
        assert_eq!(status.current_block, 0);
        assert_eq!(status.highest_block, 0);
        assert_eq!(status.percent(), 100.0);
    }

    #[test]
    fn test_consensus_percentage_from_slots() {
        let status = ConsensusSyncStatus::from(BeaconSyncing {
            head_slot: 300,
            sync_distance: 100,
            is_syncing: true,
        });

        assert_eq!(status.estimated_highest_slot(), 400);
        assert_eq!(status.percent(), 75.0);

        let synced = ConsensusSyncStatus {
            is_syncing: false,
            head_slot: 400,
            sync_distance: 0,
        };
        assert_eq!(synced.percent(), 100.0);
    }

    #[test]
    fn test_observe_writes_five_gauges() {
        let sink = Arc::new(MemorySink::new());
        let metrics = TargetMetrics::new(sink.clone(), "eth_exe", Labels::new());

        ExecutionSyncStatus {
            is_syncing: true,
            current_block: 50,
            highest_block: 100,
            starting_block: 0,
        }
        .observe(&metrics);

        assert_eq!(sink.len(), 5);
        assert_eq!(sink.get("eth_exe_sync_is_syncing", &[]), Some(1.0));
        assert_eq!(sink.get("eth_exe_sync_current_block", &[]), Some(50.0));
        assert_eq!(sink.get("eth_exe_sync_highest_block", &[]), Some(100.0));
        assert_eq!(sink.get("eth_exe_sync_starting_block", &[]), Some(0.0));
        assert_eq!(sink.get("eth_exe_sync_percentage", &[]), Some(50.0));
    }
}
