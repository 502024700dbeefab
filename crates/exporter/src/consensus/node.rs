use crate::capability::{CapabilitySet, NodeClient};
use crate::consensus::jobs::observe_spec;
use crate::consensus::state::{BeaconState, StateContainer};
use crate::error::InitializationError;
use crate::scheduler::Collector;
use crate::sink::TargetMetrics;
use crate::target::Target;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Represents an Ethereum beacon node. Brings up the spec/genesis state and,
/// once it is ready, tracks the wall-clock slot derived from it.
pub struct BeaconNode {
    target: Target,
    client: Arc<dyn NodeClient>,
    state: BeaconState,
    metrics: TargetMetrics,
    interval: Duration,
}

impl BeaconNode {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

    pub fn new(mut target: Target, client: Arc<dyn NodeClient>, metrics: TargetMetrics) -> Self {
        target.mark_bootstrapped();

        tracing::info!(
            node = %target.name,
            capabilities = %CapabilitySet::detect(client.as_ref()),
            "Connected to beacon node"
        );

        Self {
            target,
            client,
            state: BeaconState::new(),
            metrics,
            interval: Self::DEFAULT_INTERVAL,
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn state(&self) -> &BeaconState {
        &self.state
    }

    pub async fn initialize_state(&mut self) -> Result<(), InitializationError> {
        tracing::info!(node = %self.target.name, "Initializing beacon state");

        let container = self.state.initialize(self.client.as_ref()).await?;

        observe_spec(container.spec(), &self.metrics);
        self.metrics
            .set("genesis_time", container.genesis().genesis_time as f64);

        tracing::info!(
            node = %self.target.name,
            config = container.spec().config_name().unwrap_or("unknown"),
            genesis_time = container.genesis().genesis_time,
            "Beacon state initialized"
        );

        Ok(())
    }

    fn observe_wallclock(container: &StateContainer, metrics: &TargetMetrics, now: SystemTime) {
        if let Some(slot) = container.slot_at(now) {
            metrics.set("wallclock_slot", slot as f64);
        }
        if let Some(epoch) = container.epoch_at(now) {
            metrics.set("wallclock_epoch", epoch as f64);
        }
    }
}

#[async_trait]
impl Collector for BeaconNode {
    fn name(&self) -> &str {
        &self.target.name
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn tick(&mut self) {
        if !self.state.is_ready() {
            if let Err(err) = self.initialize_state().await {
                tracing::error!(node = %self.target.name, "Failed to initialize state: {}", err);
                return;
            }
        }

        if let Some(container) = self.state.container() {
            Self::observe_wallclock(container, &self.metrics, SystemTime::now());
        }
    }
}
