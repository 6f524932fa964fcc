//! # Ticket Feed
//!
//! Keeps a local, ordered projection of the newest tickets in sync with the
//! store's change feed and derives the teller leaderboard from it.
//!
//! The work is split in two layers:
//!
//! - [`Reconciler`]: a synchronous state machine (`Unsubscribed`, `Loading`,
//!   `Live`) that applies [`store::FeedBatch`]es to a [`ViewState`]. Redundant
//!   adds are dropped by id, modifications replace in place, removals drop the
//!   ticket, and rankings are recomputed once per batch.
//! - [`subscribe`]: opens the store subscription, drives a [`Reconciler`] on a
//!   tokio task, and calls back with the view after every batch that changed
//!   it. The returned [`Subscription`] stops delivery when unsubscribed or
//!   dropped.
//!
//! [`compute_rankings`] is also usable on its own over any slice of records.
//!
//! ## Example
//!
//! ```
//! use feed::{FeedBatch, FeedConfig, Reconciler, ReconcilerState};
//!
//! let mut reconciler = Reconciler::new(FeedConfig::default());
//! reconciler.start();
//! assert_eq!(reconciler.state(), ReconcilerState::Loading);
//!
//! let view = reconciler.apply(FeedBatch::Snapshot(Vec::new())).unwrap();
//! assert!(view.is_empty());
//! assert_eq!(reconciler.state(), ReconcilerState::Live);
//! ```

mod config;
mod ranking;
mod reconciler;
mod subscription;
mod view;

pub use crate::config::{FeedConfig, FeedConfigError};
pub use crate::ranking::{compute_rankings, compute_rankings_with, RankingConfig, RankingEntry};
pub use crate::reconciler::{FeedViolation, Reconciler, ReconcilerState};
pub use crate::subscription::{subscribe, Subscription};
pub use crate::view::ViewState;

pub use store::{ChangeKind, FeedBatch, FeedChange};
