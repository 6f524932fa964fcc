//! Change feed wire types.
//!
//! A subscription delivers one [`FeedBatch::Snapshot`] holding the current
//! window (newest first, at most `limit` records), then a
//! [`FeedBatch::Changes`] batch per store mutation that touched the window.
use intake::TicketRecord;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Default upper bound on records in a feed window.
pub const DEFAULT_FEED_LIMIT: usize = 100;

/// Receiving half of a change feed subscription.
pub type FeedReceiver = mpsc::UnboundedReceiver<FeedBatch>;

/// Live query parameters: the newest `limit` tickets by `submitted_at`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedQuery {
    pub limit: usize,
}

impl FeedQuery {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_FEED_LIMIT,
        }
    }
}

/// What happened to a record inside the feed window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
    /// Any kind this build does not recognize. Consumers skip it.
    #[serde(other)]
    Unknown,
}

/// One record-level delta.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedChange {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    #[serde(rename = "doc")]
    pub record: TicketRecord,
}

impl FeedChange {
    pub fn added(record: TicketRecord) -> Self {
        Self {
            kind: ChangeKind::Added,
            record,
        }
    }

    pub fn modified(record: TicketRecord) -> Self {
        Self {
            kind: ChangeKind::Modified,
            record,
        }
    }

    pub fn removed(record: TicketRecord) -> Self {
        Self {
            kind: ChangeKind::Removed,
            record,
        }
    }
}

/// A unit of delivery. Consumers apply a whole batch before reacting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "batch", content = "items", rename_all = "snake_case")]
pub enum FeedBatch {
    /// Full window contents, newest first.
    Snapshot(Vec<TicketRecord>),
    /// Deltas produced by one store mutation.
    Changes(Vec<FeedChange>),
}

impl FeedBatch {
    pub fn len(&self) -> usize {
        match self {
            FeedBatch::Snapshot(records) => records.len(),
            FeedBatch::Changes(changes) => changes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
