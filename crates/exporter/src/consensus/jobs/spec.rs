use crate::consensus::state::Spec;
use crate::sink::TargetMetrics;

/// Numeric spec parameters exported as one gauge each, named after the
/// lowercased key.
pub const SPEC_GAUGES: &[&str] = &[
    "SAFE_SLOTS_TO_UPDATE_JUSTIFIED",
    "DEPOSIT_CHAIN_ID",
    "MAX_VALIDATORS_PER_COMMITTEE",
    "SECONDS_PER_ETH1_BLOCK",
    "BASE_REWARD_FACTOR",
    "EPOCHS_PER_SYNC_COMMITTEE_PERIOD",
    "EFFECTIVE_BALANCE_INCREMENT",
    "MAX_ATTESTATIONS",
    "MIN_SYNC_COMMITTEE_PARTICIPANTS",
    "GENESIS_DELAY",
    "SECONDS_PER_SLOT",
    "MAX_EFFECTIVE_BALANCE",
    "TERMINAL_TOTAL_DIFFICULTY",
    "MAX_DEPOSITS",
    "MIN_GENESIS_ACTIVE_VALIDATOR_COUNT",
    "TARGET_COMMITTEE_SIZE",
    "SYNC_COMMITTEE_SIZE",
    "ETH1_FOLLOW_DISTANCE",
    "TERMINAL_BLOCK_HASH_ACTIVATION_EPOCH",
    "MIN_DEPOSIT_AMOUNT",
    "SLOTS_PER_EPOCH",
];

/// Publish the spec-derived gauges. Parameters the node does not report, or
/// reports in a non-numeric form, are skipped.
pub fn observe_spec(spec: &Spec, metrics: &TargetMetrics) {
    for key in SPEC_GAUGES {
        if let Some(value) = spec.get_f64(key) {
            metrics.set(&key.to_lowercase(), value);
        }
    }

    if let Some(name) = spec.config_name() {
        metrics.set_labeled("config_name", &[("name", name)], 1.0);
    }

    if let Some(preset) = spec.preset_base() {
        metrics.set_labeled("preset_base", &[("preset", preset)], 1.0);
    }

    if let Some(network_id) = spec.get_u64("DEPOSIT_NETWORK_ID") {
        metrics.set("network_id", network_id as f64);
    }
}
