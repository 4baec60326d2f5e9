//! Error conversion helpers for host store calls
//!
//! Provides extension traits for cleaner error handling with node context.

use std::io;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{DomainError, NodeId};

/// Extension trait for converting host `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add node context to a failed host call.
    ///
    /// # Example
    /// ```ignore
    /// store.move_node(&id, 3)
    ///     .with_node_context("move", &id)?;
    /// ```
    fn with_node_context(self, action: &str, id: &NodeId) -> ApplicationResult<T>;

    /// Like `with_node_context`, but an unknown id becomes `DomainError::NotFound`.
    fn or_not_found(self, action: &str, id: &NodeId) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_node_context(self, action: &str, id: &NodeId) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::HostOperationFailed {
            context: format!("{}: {}", action, id),
            source: Box::new(e),
        })
    }

    fn or_not_found(self, action: &str, id: &NodeId) -> ApplicationResult<T> {
        match self {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(DomainError::NotFound(id.clone()).into())
            }
            other => other.with_node_context(action, id),
        }
    }
}
