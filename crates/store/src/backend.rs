use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use intake::{NewTicket, TicketRecord};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::feed::{FeedQuery, FeedReceiver, DEFAULT_FEED_LIMIT};
use crate::memory::InMemoryStore;

/// Capabilities the intake core needs from the external ticket store.
///
/// Implementations wrap whatever document database actually holds the
/// collection. The core never looks behind this trait, so tests and demos can
/// substitute [`InMemoryStore`] or a purpose-built fake.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Name of the collection the store writes to and queries.
    fn collection(&self) -> &str;

    /// Create a ticket. The store assigns the id.
    async fn insert(&self, ticket: NewTicket) -> Result<TicketRecord, StoreError>;

    /// Equality query on `parsed_data.reference_code` AND `parsed_data.teller`.
    async fn find_by_reference(
        &self,
        reference_code: &str,
        teller: &str,
    ) -> Result<Vec<TicketRecord>, StoreError>;

    /// Open a live query: newest `query.limit` tickets by `submitted_at`.
    ///
    /// The first batch on the returned receiver is a snapshot.
    async fn subscribe(&self, query: FeedQuery) -> Result<FeedReceiver, StoreError>;
}

/// Store settings shared by the duplicate guard and the reconciler.
///
/// ```yaml
/// store:
///   collection: "tickets"
///   query_timeout_ms: 5000
///   feed_limit: 100
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    #[serde(default = "StoreConfig::default_collection")]
    pub collection: String,

    /// Deadline for one-shot queries and writes.
    #[serde(default = "StoreConfig::default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    /// Window size requested from the change feed.
    #[serde(default = "StoreConfig::default_feed_limit")]
    pub feed_limit: usize,
}

impl StoreConfig {
    pub(crate) fn default_collection() -> String {
        "tickets".to_string()
    }

    pub(crate) fn default_query_timeout_ms() -> u64 {
        5_000
    }

    pub(crate) fn default_feed_limit() -> usize {
        DEFAULT_FEED_LIMIT
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn feed_query(&self) -> FeedQuery {
        FeedQuery::new(self.feed_limit)
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.collection.trim().is_empty() {
            return Err(StoreError::InvalidQuery(
                "collection must not be empty".into(),
            ));
        }
        if self.query_timeout_ms == 0 {
            return Err(StoreError::InvalidQuery(
                "query_timeout_ms must be greater than zero".into(),
            ));
        }
        if self.feed_limit == 0 {
            return Err(StoreError::InvalidQuery(
                "feed_limit must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Build the in-process reference store for this configuration.
    pub fn build_in_memory(&self) -> Arc<dyn TicketStore> {
        Arc::new(InMemoryStore::with_collection(self.collection.clone()))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            collection: Self::default_collection(),
            query_timeout_ms: Self::default_query_timeout_ms(),
            feed_limit: Self::default_feed_limit(),
        }
    }
}
