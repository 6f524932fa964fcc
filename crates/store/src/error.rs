use std::time::Duration;

use thiserror::Error;

/// Failures surfaced by a [`TicketStore`](crate::TicketStore).
///
/// Every variant aborts the operation that produced it. None of them is ever
/// translated into a "no result" answer: a failed duplicate query must block
/// the submission rather than let it through.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    /// The backend could not be reached or reported an internal failure.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The operation did not complete within the configured deadline.
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    /// A record addressed by id does not exist.
    #[error("ticket not found: {0}")]
    NotFound(String),

    /// The query parameters were rejected before reaching the backend.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The change feed was closed by the store.
    #[error("change feed closed")]
    Closed,
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        StoreError::Unavailable(msg.into())
    }

    /// Whether re-invoking the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::Unavailable(_) | StoreError::Timeout(_) | StoreError::Closed
        )
    }
}
