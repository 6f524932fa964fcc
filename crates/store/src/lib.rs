//! # Ticket Store
//!
//! This crate describes what the intake core needs from the document store
//! that holds tickets, without caring which database that is. The persistence
//! layer is treated as three capabilities behind one trait:
//!
//! - **Write**: [`TicketStore::insert`] creates a ticket and assigns its id.
//! - **Query**: [`TicketStore::find_by_reference`] runs the two-field equality
//!   filter the duplicate guard relies on.
//! - **Subscribe**: [`TicketStore::subscribe`] opens an ordered (newest first),
//!   bounded live query that delivers a snapshot followed by
//!   added / modified / removed deltas ([`FeedBatch`]).
//!
//! [`InMemoryStore`] is the in-process reference implementation used by tests
//! and the demo binary. It honours the same ordering and window contract a
//! real backend would.
//!
//! ## Example
//!
//! ```
//! use store::{FeedBatch, FeedQuery, InMemoryStore, TicketStore};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let store = InMemoryStore::new();
//! let mut feed = store.subscribe(FeedQuery::default()).await.unwrap();
//! assert!(matches!(feed.recv().await, Some(FeedBatch::Snapshot(records)) if records.is_empty()));
//! # });
//! ```

mod backend;
mod error;
mod feed;
mod memory;

pub use backend::{StoreConfig, TicketStore};
pub use error::StoreError;
pub use feed::{ChangeKind, FeedBatch, FeedChange, FeedQuery, FeedReceiver, DEFAULT_FEED_LIMIT};
pub use memory::InMemoryStore;
