use std::collections::HashSet;

use intake::TicketRecord;
use serde::Serialize;

use crate::ranking::{compute_rankings_with, RankingConfig, RankingEntry};

/// The locally reconciled projection of the remote ticket window.
///
/// Tickets are kept newest first. `known_ids` mirrors the ids in `tickets` so
/// redundant deliveries can be rejected without a scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewState {
    tickets: Vec<TicketRecord>,
    #[serde(skip)]
    known_ids: HashSet<String>,
    rankings: Vec<RankingEntry>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tickets(&self) -> &[TicketRecord] {
        &self.tickets
    }

    pub fn rankings(&self) -> &[RankingEntry] {
        &self.rankings
    }

    pub fn contains(&self, id: &str) -> bool {
        self.known_ids.contains(id)
    }

    pub fn get(&self, id: &str) -> Option<&TicketRecord> {
        if !self.contains(id) {
            return None;
        }
        self.tickets.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    pub(crate) fn replace_all(&mut self, tickets: Vec<TicketRecord>) {
        self.known_ids = tickets.iter().map(|t| t.id.clone()).collect();
        self.tickets = tickets;
    }

    /// Returns false when the id is already present.
    pub(crate) fn insert(&mut self, ticket: TicketRecord) -> bool {
        if self.known_ids.contains(&ticket.id) {
            return false;
        }
        // Normally the newest ticket, which lands at index 0.
        let at = self
            .tickets
            .iter()
            .position(|t| t.submitted_at <= ticket.submitted_at)
            .unwrap_or(self.tickets.len());
        self.known_ids.insert(ticket.id.clone());
        self.tickets.insert(at, ticket);
        true
    }

    /// Replace in place; position is left alone. Returns false for unknown ids.
    pub(crate) fn modify(&mut self, ticket: TicketRecord) -> bool {
        if !self.known_ids.contains(&ticket.id) {
            return false;
        }
        match self.tickets.iter_mut().find(|t| t.id == ticket.id) {
            Some(slot) => {
                *slot = ticket;
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, id: &str) -> bool {
        if !self.known_ids.remove(id) {
            return false;
        }
        self.tickets.retain(|t| t.id != id);
        true
    }

    pub(crate) fn refresh_rankings(&mut self, cfg: &RankingConfig) {
        self.rankings = compute_rankings_with(&self.tickets, cfg);
    }
}
