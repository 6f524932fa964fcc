//! Change-feed reconciliation state machine.
//!
//! ```text
//!  Unsubscribed ──start()──► Loading ──Snapshot──► Live ──stop()──► Unsubscribed
//!                               │                   │ ▲
//!                       Changes │ (ignored,         │ │ Changes: added / modified / removed
//!                               ▼  logged)          └─┘ Snapshot: resync
//! ```
//!
//! The machine is synchronous and owns its [`ViewState`]; the async task in
//! [`subscription`](crate::subscription) only moves batches from the store
//! into [`Reconciler::apply`].
use intake::TicketRecord;
use store::{ChangeKind, FeedBatch, FeedChange};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::FeedConfig;
use crate::view::ViewState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilerState {
    Unsubscribed,
    Loading,
    Live,
}

/// Feed input that breaks the ordering, bound, or vocabulary contract.
///
/// These are logged and skipped; one bad event never halts the live view.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FeedViolation {
    #[error("unrecognized change kind for ticket {id}")]
    UnknownChangeKind { id: String },

    #[error("{changes} change(s) delivered before the initial snapshot")]
    ChangesBeforeSnapshot { changes: usize },

    #[error("view holds {len} tickets, feed capacity is {capacity}")]
    OverCapacity { len: usize, capacity: usize },
}

fn report(violation: &FeedViolation) {
    warn!(violation = %violation, "feed_protocol_violation");
}

/// Applies feed batches to an owned [`ViewState`].
#[derive(Debug)]
pub struct Reconciler {
    state: ReconcilerState,
    view: ViewState,
    config: FeedConfig,
}

impl Reconciler {
    pub fn new(config: FeedConfig) -> Self {
        Self {
            state: ReconcilerState::Unsubscribed,
            view: ViewState::new(),
            config,
        }
    }

    pub fn state(&self) -> ReconcilerState {
        self.state
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Begin a subscription with an empty view, awaiting the first snapshot.
    pub fn start(&mut self) {
        self.view = ViewState::new();
        self.state = ReconcilerState::Loading;
    }

    /// End the subscription. The view keeps its last contents.
    pub fn stop(&mut self) {
        self.state = ReconcilerState::Unsubscribed;
    }

    /// Apply one batch. Returns the view when it should be emitted, which
    /// happens at most once per batch.
    pub fn apply(&mut self, batch: FeedBatch) -> Option<&ViewState> {
        match (self.state, batch) {
            (ReconcilerState::Unsubscribed, batch) => {
                debug!(items = batch.len(), "feed_batch_discarded");
                None
            }
            (ReconcilerState::Loading, FeedBatch::Snapshot(tickets)) => {
                self.load(tickets);
                self.state = ReconcilerState::Live;
                info!(tickets = self.view.len(), "feed_initial_load");
                Some(&self.view)
            }
            (ReconcilerState::Live, FeedBatch::Snapshot(tickets)) => {
                self.load(tickets);
                info!(tickets = self.view.len(), "feed_resync");
                Some(&self.view)
            }
            (ReconcilerState::Loading, FeedBatch::Changes(changes)) => {
                report(&FeedViolation::ChangesBeforeSnapshot {
                    changes: changes.len(),
                });
                None
            }
            (ReconcilerState::Live, FeedBatch::Changes(changes)) => {
                let total = changes.len();
                let mut applied = 0usize;
                for change in changes {
                    if self.apply_change(change) {
                        applied += 1;
                    }
                }
                debug!(total, applied, tickets = self.view.len(), "feed_changes_applied");
                if applied == 0 {
                    return None;
                }
                self.check_capacity();
                self.view.refresh_rankings(&self.config.ranking);
                Some(&self.view)
            }
        }
    }

    fn load(&mut self, tickets: Vec<TicketRecord>) {
        self.view.replace_all(tickets);
        self.check_capacity();
        self.view.refresh_rankings(&self.config.ranking);
    }

    /// Returns whether the view changed.
    fn apply_change(&mut self, change: FeedChange) -> bool {
        let FeedChange { kind, record } = change;
        match kind {
            ChangeKind::Added => {
                let inserted = self.view.insert(record);
                if !inserted {
                    debug!("feed_redundant_add");
                }
                inserted
            }
            ChangeKind::Modified => {
                let id = record.id.clone();
                let modified = self.view.modify(record);
                if !modified {
                    debug!(id = %id, "feed_modify_unknown_id");
                }
                modified
            }
            ChangeKind::Removed => self.view.remove(&record.id),
            ChangeKind::Unknown => {
                report(&FeedViolation::UnknownChangeKind { id: record.id });
                false
            }
        }
    }

    fn check_capacity(&self) {
        if self.view.len() > self.config.capacity {
            report(&FeedViolation::OverCapacity {
                len: self.view.len(),
                capacity: self.config.capacity,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Utc};
    use proptest::prelude::*;

    use super::*;

    fn ticket(id: &str, minute: i64, teller: &str) -> TicketRecord {
        let raw = format!("Reference Code\nREF-{id}\nTeller\n{teller}");
        TicketRecord {
            id: id.to_string(),
            employee_name: "Ana".into(),
            department: "Ops".into(),
            parsed_data: intake::parse(&raw),
            raw_input: raw,
            ticket_type: "Reversal".into(),
            description: String::new(),
            submitted_at: DateTime::<Utc>::UNIX_EPOCH + Duration::minutes(minute),
            submitted_by: "ana".into(),
        }
    }

    fn live(tickets: Vec<TicketRecord>) -> Reconciler {
        let mut reconciler = Reconciler::new(FeedConfig::default());
        reconciler.start();
        assert!(reconciler.apply(FeedBatch::Snapshot(tickets)).is_some());
        reconciler
    }

    fn ids(view: &ViewState) -> Vec<&str> {
        view.tickets().iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn snapshot_loads_in_feed_order_and_goes_live() {
        let mut reconciler = Reconciler::new(FeedConfig::default());
        assert_eq!(reconciler.state(), ReconcilerState::Unsubscribed);
        reconciler.start();
        assert_eq!(reconciler.state(), ReconcilerState::Loading);

        let view = reconciler
            .apply(FeedBatch::Snapshot(vec![ticket("b", 2, "T1"), ticket("a", 1, "T1")]))
            .expect("snapshot emits");
        assert_eq!(ids(view), vec!["b", "a"]);
        assert!(view.contains("a"));
        assert_eq!(view.rankings()[0].count, 2);
        assert_eq!(reconciler.state(), ReconcilerState::Live);
    }

    #[test]
    fn added_goes_to_the_front() {
        let mut reconciler = live(vec![ticket("b", 2, "T"), ticket("a", 1, "T")]);
        let view = reconciler
            .apply(FeedBatch::Changes(vec![FeedChange::added(ticket("c", 3, "T"))]))
            .expect("add emits");
        assert_eq!(ids(view), vec!["c", "b", "a"]);
    }

    #[test]
    fn older_add_lands_in_timestamp_order() {
        let mut reconciler = live(vec![ticket("c", 5, "T"), ticket("b", 3, "T")]);

        // A window backfill after a removal delivers a ticket older than the tail.
        let view = reconciler
            .apply(FeedBatch::Changes(vec![FeedChange::added(ticket("a", 1, "T"))]))
            .expect("add emits");
        assert_eq!(ids(view), vec!["c", "b", "a"]);

        let view = reconciler
            .apply(FeedBatch::Changes(vec![FeedChange::added(ticket("m", 4, "T"))]))
            .expect("add emits");
        assert_eq!(ids(view), vec!["c", "m", "b", "a"]);
    }

    #[test]
    fn redundant_add_is_ignored() {
        let mut reconciler = live(vec![]);
        let add = FeedChange::added(ticket("a", 1, "T"));
        assert!(reconciler
            .apply(FeedBatch::Changes(vec![add.clone()]))
            .is_some());
        assert!(reconciler.apply(FeedBatch::Changes(vec![add.clone()])).is_none());

        let view = reconciler
            .apply(FeedBatch::Changes(vec![add.clone(), add]))
            .map(ViewState::len);
        assert_eq!(view, None);
        assert_eq!(reconciler.view().len(), 1);
    }

    #[test]
    fn modified_replaces_in_place() {
        let mut reconciler = live(vec![ticket("b", 2, "T"), ticket("a", 1, "T")]);
        let mut edited = ticket("a", 1, "T");
        edited.description = "reviewed".into();

        let view = reconciler
            .apply(FeedBatch::Changes(vec![FeedChange::modified(edited)]))
            .expect("modify emits");
        assert_eq!(ids(view), vec!["b", "a"]);
        assert_eq!(view.get("a").map(|t| t.description.as_str()), Some("reviewed"));
    }

    #[test]
    fn modified_keeps_position_even_if_timestamp_moves() {
        let mut reconciler = live(vec![ticket("b", 2, "T"), ticket("a", 1, "T")]);
        let view = reconciler
            .apply(FeedBatch::Changes(vec![FeedChange::modified(ticket("a", 9, "T"))]))
            .expect("modify emits");
        assert_eq!(ids(view), vec!["b", "a"]);
    }

    #[test]
    fn removed_drops_from_sequence_and_ids() {
        let mut reconciler = live(vec![ticket("b", 2, "T"), ticket("a", 1, "T")]);
        let view = reconciler
            .apply(FeedBatch::Changes(vec![FeedChange::removed(ticket("b", 2, "T"))]))
            .expect("remove emits");
        assert_eq!(ids(view), vec!["a"]);
        assert!(!view.contains("b"));
    }

    #[test]
    fn batch_is_applied_whole_then_rankings_refresh() {
        let mut reconciler = live(vec![ticket("a", 1, "A")]);
        let batch: Vec<FeedChange> = (2..7)
            .map(|m| FeedChange::added(ticket(&format!("b{m}"), m, "B")))
            .collect();
        let view = reconciler.apply(FeedBatch::Changes(batch)).expect("emits once");
        assert_eq!(view.len(), 6);
        let leader = &view.rankings()[0];
        assert_eq!((leader.teller.as_str(), leader.count), ("B", 5));
        assert!(leader.is_top_offender);
    }

    #[test]
    fn unknown_kind_is_skipped() {
        let mut reconciler = live(vec![ticket("a", 1, "T")]);
        let odd = FeedChange {
            kind: ChangeKind::Unknown,
            record: ticket("z", 5, "T"),
        };
        let view = reconciler
            .apply(FeedBatch::Changes(vec![odd, FeedChange::added(ticket("b", 2, "T"))]))
            .expect("valid part of the batch still applies");
        assert_eq!(ids(view), vec!["b", "a"]);
    }

    #[test]
    fn changes_before_snapshot_are_ignored() {
        let mut reconciler = Reconciler::new(FeedConfig::default());
        reconciler.start();
        let out = reconciler.apply(FeedBatch::Changes(vec![FeedChange::added(ticket("a", 1, "T"))]));
        assert!(out.is_none());
        assert_eq!(reconciler.state(), ReconcilerState::Loading);
        assert!(reconciler.view().is_empty());
    }

    #[test]
    fn second_snapshot_resyncs() {
        let mut reconciler = live(vec![ticket("a", 1, "T")]);
        let view = reconciler
            .apply(FeedBatch::Snapshot(vec![ticket("x", 3, "T")]))
            .expect("resync emits");
        assert_eq!(ids(view), vec!["x"]);
        assert!(!view.contains("a"));
    }

    #[test]
    fn over_capacity_is_kept_not_truncated() {
        let config = FeedConfig {
            capacity: 1,
            ..Default::default()
        };
        let mut reconciler = Reconciler::new(config);
        reconciler.start();
        let view = reconciler
            .apply(FeedBatch::Snapshot(vec![ticket("b", 2, "T"), ticket("a", 1, "T")]))
            .expect("snapshot emits");
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn stopped_reconciler_discards_and_keeps_view() {
        let mut reconciler = live(vec![ticket("a", 1, "T")]);
        reconciler.stop();
        let out = reconciler.apply(FeedBatch::Changes(vec![FeedChange::removed(ticket("a", 1, "T"))]));
        assert!(out.is_none());
        assert_eq!(ids(reconciler.view()), vec!["a"]);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add,
        Remove(usize),
    }

    fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
        prop::collection::vec(
            prop_oneof![Just(Op::Add), (0usize..64).prop_map(Op::Remove)],
            0..80,
        )
    }

    proptest! {
        /// Newest-first adds and arbitrary removals keep the view sorted and the id set in sync.
        #[test]
        fn prop_view_stays_sorted(ops in arb_ops(), batch_size in 1usize..4) {
            let mut reconciler = live(vec![]);
            let mut minute = 0i64;
            let mut pending = Vec::new();

            for op in ops {
                match op {
                    Op::Add => {
                        minute += 1;
                        pending.push(FeedChange::added(ticket(&format!("t{minute}"), minute, "T")));
                    }
                    Op::Remove(pick) => {
                        let tickets = reconciler.view().tickets();
                        if !tickets.is_empty() {
                            let victim = tickets[pick % tickets.len()].clone();
                            pending.push(FeedChange::removed(victim));
                        }
                    }
                }
                if pending.len() >= batch_size {
                    reconciler.apply(FeedBatch::Changes(std::mem::take(&mut pending)));
                }
            }
            if !pending.is_empty() {
                reconciler.apply(FeedBatch::Changes(pending));
            }

            let view = reconciler.view();
            for pair in view.tickets().windows(2) {
                prop_assert!(pair[0].submitted_at >= pair[1].submitted_at);
            }
            prop_assert_eq!(view.tickets().len(), view.tickets().iter().filter(|t| view.contains(&t.id)).count());
        }
    }
}
