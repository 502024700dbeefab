/// Which layer of the node a target exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Execution,
    Consensus,
}

impl TargetKind {
    /// Value of the `ethereum_role` label.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Execution => "execution",
            TargetKind::Consensus => "consensus",
        }
    }
}

/// A monitored node endpoint.
#[derive(Debug, Clone)]
pub struct Target {
    pub kind: TargetKind,
    pub name: String,
    pub url: String,
    bootstrapped: bool,
}

impl Target {
    pub fn new(kind: TargetKind, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            url: url.into(),
            bootstrapped: false,
        }
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped
    }

    pub(crate) fn mark_bootstrapped(&mut self) {
        self.bootstrapped = true;
    }
}
