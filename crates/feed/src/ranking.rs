//! Teller leaderboard derived from the live ticket view.
use std::collections::HashMap;

use intake::TicketRecord;
use serde::{Deserialize, Serialize};

/// One leaderboard row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub teller: String,
    pub count: usize,
    /// 1-based position in the sorted list. Ties keep first-seen order.
    pub rank: usize,
    pub is_top_offender: bool,
}

/// Leaderboard tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankingConfig {
    /// Rows kept after sorting.
    #[serde(default = "RankingConfig::default_top_n")]
    pub top_n: usize,

    /// Minimum leading count before anyone is flagged.
    #[serde(default = "RankingConfig::default_offender_threshold")]
    pub offender_threshold: usize,

    /// Group name for tickets without a teller field.
    #[serde(default = "RankingConfig::default_unknown_teller")]
    pub unknown_teller: String,
}

impl RankingConfig {
    pub(crate) fn default_top_n() -> usize {
        10
    }

    pub(crate) fn default_offender_threshold() -> usize {
        5
    }

    pub(crate) fn default_unknown_teller() -> String {
        "Unknown".to_string()
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_n: Self::default_top_n(),
            offender_threshold: Self::default_offender_threshold(),
            unknown_teller: Self::default_unknown_teller(),
        }
    }
}

/// Rank tellers by ticket count with the default settings.
///
/// ```
/// use feed::compute_rankings;
///
/// assert!(compute_rankings(&[]).is_empty());
/// ```
pub fn compute_rankings(records: &[TicketRecord]) -> Vec<RankingEntry> {
    compute_rankings_with(records, &RankingConfig::default())
}

/// Group by teller, count, sort descending (stable), keep `top_n`, then flag
/// every row that shares the maximum count when that maximum reaches
/// `offender_threshold`.
pub fn compute_rankings_with(records: &[TicketRecord], cfg: &RankingConfig) -> Vec<RankingEntry> {
    let mut groups: Vec<(&str, usize)> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let teller = record
            .teller()
            .filter(|t| !t.is_empty())
            .unwrap_or(cfg.unknown_teller.as_str());
        let slot = *slots.entry(teller).or_insert_with(|| {
            groups.push((teller, 0));
            groups.len() - 1
        });
        groups[slot].1 += 1;
    }

    // `sort_by` is stable, so equal counts stay in first-seen order.
    groups.sort_by(|a, b| b.1.cmp(&a.1));

    let max = groups.first().map(|(_, count)| *count).unwrap_or(0);
    let flag_leaders = max >= cfg.offender_threshold;

    groups
        .into_iter()
        .take(cfg.top_n)
        .enumerate()
        .map(|(idx, (teller, count))| RankingEntry {
            teller: teller.to_string(),
            count,
            rank: idx + 1,
            is_top_offender: flag_leaders && count == max,
        })
        .collect()
}
