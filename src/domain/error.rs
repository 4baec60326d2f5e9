//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::NodeId;

/// Domain errors represent violations of tree invariants.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("node not found: {0}")]
    NotFound(NodeId),

    #[error("cycle detected in bookmark tree at folder: {0}")]
    CycleDetected(NodeId),

    #[error("folder {id} is nested deeper than {max_depth} levels")]
    DepthExceeded { id: NodeId, max_depth: usize },

    #[error("invalid node {id}: {reason}")]
    InvalidNode { id: NodeId, reason: String },

    #[error("unsupported locale '{locale}': {reason}")]
    InvalidLocale { locale: String, reason: String },
}
