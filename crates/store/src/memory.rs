use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use intake::{NewTicket, TicketRecord};
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::backend::TicketStore;
use crate::error::StoreError;
use crate::feed::{FeedBatch, FeedChange, FeedQuery, FeedReceiver};

/// In-process ticket store with a windowed change feed.
///
/// Every subscriber tracks the window it was last told about. After each
/// mutation the new window is diffed against it and the difference goes out
/// as one [`FeedBatch::Changes`]: records that fell out of the window are
/// `removed`, records that entered it are `added`, and the mutated record is
/// `modified` when it stayed inside.
///
/// [`update`](InMemoryStore::update) and [`remove`](InMemoryStore::remove)
/// stand in for the reviewer workflow that edits and deletes tickets outside
/// the intake core.
pub struct InMemoryStore {
    collection: String,
    state: RwLock<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    tickets: HashMap<String, TicketRecord>,
    subscribers: Vec<Subscriber>,
}

struct Subscriber {
    limit: usize,
    window: Vec<TicketRecord>,
    tx: mpsc::UnboundedSender<FeedBatch>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_collection("tickets")
    }

    pub fn with_collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            state: RwLock::new(MemoryState::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.read().map(|state| state.tickets.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of live feed subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.read()
            .map(|state| state.subscribers.iter().filter(|s| !s.tx.is_closed()).count())
            .unwrap_or(0)
    }

    pub fn get(&self, id: &str) -> Result<Option<TicketRecord>, StoreError> {
        Ok(self.read()?.tickets.get(id).cloned())
    }

    /// Replace an existing ticket wholesale.
    pub fn update(&self, record: TicketRecord) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if !state.tickets.contains_key(&record.id) {
            return Err(StoreError::NotFound(record.id));
        }
        let id = record.id.clone();
        state.tickets.insert(id.clone(), record);
        state.publish(&id);
        Ok(())
    }

    /// Delete a ticket, returning what was stored.
    pub fn remove(&self, id: &str) -> Result<TicketRecord, StoreError> {
        let mut state = self.write()?;
        let removed = state
            .tickets
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        state.publish(id);
        Ok(removed)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::unavailable("poisoned lock"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::unavailable("poisoned lock"))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TicketStore for InMemoryStore {
    fn collection(&self) -> &str {
        &self.collection
    }

    async fn insert(&self, ticket: NewTicket) -> Result<TicketRecord, StoreError> {
        let record = ticket.into_record(Uuid::new_v4().to_string());
        let mut state = self.write()?;
        state.tickets.insert(record.id.clone(), record.clone());
        state.publish(&record.id);
        debug!(collection = %self.collection, id = %record.id, "ticket_inserted");
        Ok(record)
    }

    async fn find_by_reference(
        &self,
        reference_code: &str,
        teller: &str,
    ) -> Result<Vec<TicketRecord>, StoreError> {
        let state = self.read()?;
        let mut matches: Vec<TicketRecord> = state
            .tickets
            .values()
            .filter(|t| {
                t.reference_code() == Some(reference_code) && t.teller() == Some(teller)
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| newest_first(a, b));
        Ok(matches)
    }

    async fn subscribe(&self, query: FeedQuery) -> Result<FeedReceiver, StoreError> {
        if query.limit == 0 {
            return Err(StoreError::InvalidQuery(
                "feed limit must be greater than zero".into(),
            ));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.write()?;
        let window: Vec<TicketRecord> = state
            .ordered()
            .into_iter()
            .take(query.limit)
            .cloned()
            .collect();
        tx.send(FeedBatch::Snapshot(window.clone()))
            .map_err(|_| StoreError::Closed)?;
        state.subscribers.push(Subscriber {
            limit: query.limit,
            window,
            tx,
        });
        info!(
            collection = %self.collection,
            limit = query.limit,
            subscribers = state.subscribers.len(),
            "feed_subscribed"
        );
        Ok(rx)
    }
}

impl MemoryState {
    fn ordered(&self) -> Vec<&TicketRecord> {
        ordered(&self.tickets)
    }

    /// Push the window diff caused by a mutation of `touched` to every subscriber.
    fn publish(&mut self, touched: &str) {
        let MemoryState {
            tickets,
            subscribers,
        } = self;
        let ordered = ordered(tickets);

        for sub in subscribers.iter_mut() {
            let window: Vec<TicketRecord> =
                ordered.iter().take(sub.limit).map(|r| (*r).clone()).collect();
            let changes = window_diff(&sub.window, &window, touched);
            sub.window = window;
            if !changes.is_empty() {
                // A send error means the receiver is gone; pruned below.
                let _ = sub.tx.send(FeedBatch::Changes(changes));
            }
        }

        let before = subscribers.len();
        subscribers.retain(|sub| !sub.tx.is_closed());
        if subscribers.len() < before {
            debug!(dropped = before - subscribers.len(), "feed_subscribers_pruned");
        }
    }
}

fn ordered(tickets: &HashMap<String, TicketRecord>) -> Vec<&TicketRecord> {
    let mut all: Vec<&TicketRecord> = tickets.values().collect();
    all.sort_by(|a, b| newest_first(a, b));
    all
}

fn newest_first(a: &TicketRecord, b: &TicketRecord) -> std::cmp::Ordering {
    b.submitted_at
        .cmp(&a.submitted_at)
        .then_with(|| b.id.cmp(&a.id))
}

fn window_diff(old: &[TicketRecord], new: &[TicketRecord], touched: &str) -> Vec<FeedChange> {
    let new_ids: HashSet<&str> = new.iter().map(|r| r.id.as_str()).collect();
    let old_by_id: HashMap<&str, &TicketRecord> =
        old.iter().map(|r| (r.id.as_str(), r)).collect();

    let mut changes: Vec<FeedChange> = old
        .iter()
        .filter(|r| !new_ids.contains(r.id.as_str()))
        .map(|r| FeedChange::removed(r.clone()))
        .collect();

    for record in new {
        match old_by_id.get(record.id.as_str()) {
            None => changes.push(FeedChange::added(record.clone())),
            Some(prev) if record.id == touched && *prev != record => {
                changes.push(FeedChange::modified(record.clone()))
            }
            Some(_) => {}
        }
    }
    changes
}
