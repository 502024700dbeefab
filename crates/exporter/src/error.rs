use crate::capability::Capability;
use thiserror::Error;

/// Failure of a single optional node query.
///
/// Both variants mean "skip this query until the next tick"; they only differ
/// in how they are reported.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The client handle does not expose the operation at all.
    #[error("client does not support {0}")]
    Unsupported(Capability),
    /// The operation exists but the call failed (network, RPC, decoding).
    #[error("{capability} query failed: {error}")]
    Transient {
        capability: Capability,
        error: eyre::Report,
    },
}

impl QueryError {
    pub fn transient(capability: Capability, error: impl Into<eyre::Report>) -> Self {
        Self::Transient {
            capability,
            error: error.into(),
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }

    pub fn capability(&self) -> Capability {
        match self {
            Self::Unsupported(capability) => *capability,
            Self::Transient { capability, .. } => *capability,
        }
    }
}

/// Failure while building the consensus state container. The container is
/// left absent and the next tick starts over.
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("failed to fetch spec: {0}")]
    Spec(#[source] QueryError),
    #[error("failed to fetch genesis: {0}")]
    Genesis(#[source] QueryError),
}

/// Report a failed query of `node` without interrupting the rest of the tick.
pub fn log_query_error(node: &str, what: &str, err: &QueryError) {
    if err.is_unsupported() {
        tracing::debug!(node = %node, query = %what, "{}", err);
    } else {
        tracing::error!(node = %node, query = %what, "Failed to get {}: {}", what, err);
    }
}
