//! Workspace umbrella crate for ticketdesk.
//!
//! This crate ties the intake parser, the ticket store seam and the live feed
//! together: [`Submitter`] runs a form through intake, the [`DuplicateGuard`]
//! and the store write, and [`feed::subscribe`] keeps a ranked view of the
//! newest tickets in sync with the store.
//!
//! ```
//! use std::sync::Arc;
//!
//! use ticketdesk::{InMemoryStore, SubmissionForm, Submitter, TicketDeskConfig};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let cfg = TicketDeskConfig::default();
//! let store = Arc::new(InMemoryStore::with_collection(cfg.store.collection.clone()));
//! let submitter = Submitter::new(store.clone(), cfg.intake.clone(), cfg.store.clone());
//!
//! let form = SubmissionForm {
//!     employee_name: "Ana Cruz".into(),
//!     department: "Operations".into(),
//!     ticket_type: "Reversal".into(),
//!     description: String::new(),
//!     raw_input: "Reference Code\nef31fb9dc29e4\nTeller\nDDN-165".into(),
//!     submitted_by: "ana@example.com".into(),
//! };
//! let record = submitter.submit(form.clone()).await.unwrap();
//! assert_eq!(record.teller(), Some("DDN-165"));
//! assert!(submitter.submit(form).await.is_err());
//! # });
//! ```

mod config;
mod error;
mod guard;
mod metrics;
mod submit;

pub use crate::config::{ConfigLoadError, TicketDeskConfig};
pub use crate::error::SubmitError;
pub use crate::guard::DuplicateGuard;
pub use crate::metrics::{SubmitMetrics, set_submit_metrics};
pub use crate::submit::Submitter;

pub use feed::{
    FeedConfig, RankingConfig, RankingEntry, Reconciler, ReconcilerState, Subscription,
    ViewState, compute_rankings, compute_rankings_with, subscribe,
};
pub use intake::{
    IntakeConfig, IntakeError, NewTicket, ParsedRecord, SubmissionForm, TicketRecord, intake,
    parse,
};
pub use store::{
    FeedBatch, FeedChange, FeedQuery, InMemoryStore, StoreConfig, StoreError, TicketStore,
};
