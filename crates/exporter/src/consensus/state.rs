//! Consensus chain constants and the initialization lifecycle that gates
//! steady-state polling.

use crate::capability::{kind, probe, Capability, NodeClient};
use crate::error::{InitializationError, QueryError};
use crate::types::Genesis;
use std::collections::{BTreeMap, HashMap};
use std::time::{SystemTime, UNIX_EPOCH};

/// Chain configuration constants as reported by `/eth/v1/config/spec`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Spec {
    values: BTreeMap<String, String>,
}

impl Spec {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key)?.parse().ok()
    }

    /// Decimal integer value as a float. Integers that overflow u64
    /// (TERMINAL_TOTAL_DIFFICULTY) are approximated; hex, fractions and
    /// float spellings such as `inf` are rejected.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        let value = self.get(key)?;
        if let Ok(integer) = value.parse::<u64>() {
            return Some(integer as f64);
        }
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        value.parse().ok()
    }

    pub fn seconds_per_slot(&self) -> Option<u64> {
        self.get_u64("SECONDS_PER_SLOT").filter(|s| *s > 0)
    }

    pub fn slots_per_epoch(&self) -> Option<u64> {
        self.get_u64("SLOTS_PER_EPOCH").filter(|s| *s > 0)
    }

    pub fn config_name(&self) -> Option<&str> {
        self.get("CONFIG_NAME")
    }

    pub fn preset_base(&self) -> Option<&str> {
        self.get("PRESET_BASE")
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Spec and genesis of one consensus target, fetched together.
#[derive(Debug, Clone)]
pub struct StateContainer {
    spec: Spec,
    genesis: Genesis,
}

impl StateContainer {
    pub fn new(spec: Spec, genesis: Genesis) -> Self {
        Self { spec, genesis }
    }

    /// Fetch the spec, then the genesis. Nothing is kept if either fails.
    pub async fn fetch(client: &dyn NodeClient) -> Result<Self, InitializationError> {
        let spec = fetch_spec(client)
            .await
            .map_err(InitializationError::Spec)?;
        let genesis = fetch_genesis(client)
            .await
            .map_err(InitializationError::Genesis)?;

        Ok(Self::new(spec, genesis))
    }

    pub fn spec(&self) -> &Spec {
        &self.spec
    }

    pub fn genesis(&self) -> &Genesis {
        &self.genesis
    }

    /// Wall-clock slot at `now`; zero before genesis. `None` when the spec has
    /// no usable slot duration.
    pub fn slot_at(&self, now: SystemTime) -> Option<u64> {
        let seconds_per_slot = self.spec.seconds_per_slot()?;
        let now = now.duration_since(UNIX_EPOCH).ok()?.as_secs();
        Some(now.saturating_sub(self.genesis.genesis_time) / seconds_per_slot)
    }

    pub fn epoch_at(&self, now: SystemTime) -> Option<u64> {
        Some(self.slot_at(now)? / self.spec.slots_per_epoch()?)
    }
}

async fn fetch_spec(client: &dyn NodeClient) -> Result<Spec, QueryError> {
    let provider = probe::<kind::Spec>(client)?;
    let values = provider
        .spec()
        .await
        .map_err(|e| QueryError::transient(Capability::Spec, e))?;
    Ok(Spec::new(values))
}

async fn fetch_genesis(client: &dyn NodeClient) -> Result<Genesis, QueryError> {
    let provider = probe::<kind::Genesis>(client)?;
    provider
        .genesis()
        .await
        .map_err(|e| QueryError::transient(Capability::Genesis, e))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Initializing,
    Ready,
}

/// Owns the optional [`StateContainer`] of a consensus target.
///
/// `Uninitialized -> Initializing -> Ready`. A failed attempt drops back to
/// `Uninitialized`; `Ready` is terminal. Initialization takes `&mut self`, so
/// at most one attempt per target runs at a time.
#[derive(Debug)]
pub struct BeaconState {
    lifecycle: Lifecycle,
    container: Option<StateContainer>,
}

impl Default for BeaconState {
    fn default() -> Self {
        Self::new()
    }
}

impl BeaconState {
    pub fn new() -> Self {
        Self {
            lifecycle: Lifecycle::Uninitialized,
            container: None,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_ready(&self) -> bool {
        self.lifecycle == Lifecycle::Ready
    }

    /// Build the container if it does not exist yet. Once ready, further
    /// calls return the existing container without touching the node.
    pub async fn initialize(
        &mut self,
        client: &dyn NodeClient,
    ) -> Result<&StateContainer, InitializationError> {
        let container = match self.container.take() {
            Some(container) => container,
            None => {
                // an attempt abandoned mid-flight left us in Initializing;
                // start over just the same
                self.lifecycle = Lifecycle::Initializing;
                match StateContainer::fetch(client).await {
                    Ok(container) => container,
                    Err(err) => {
                        self.lifecycle = Lifecycle::Uninitialized;
                        return Err(err);
                    }
                }
            }
        };

        self.lifecycle = Lifecycle::Ready;
        Ok(&*self.container.insert(container))
    }

    pub fn container(&self) -> Option<&StateContainer> {
        self.container.as_ref()
    }

    pub fn spec(&self) -> Option<&Spec> {
        self.container.as_ref().map(StateContainer::spec)
    }

    pub fn genesis(&self) -> Option<&Genesis> {
        self.container.as_ref().map(StateContainer::genesis)
    }
}
