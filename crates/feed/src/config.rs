use serde::{Deserialize, Serialize};
use store::DEFAULT_FEED_LIMIT;
use thiserror::Error;

use crate::ranking::RankingConfig;

/// Live view settings.
///
/// ```yaml
/// feed:
///   capacity: 100
///   ranking:
///     top_n: 10
///     offender_threshold: 5
///     unknown_teller: "Unknown"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedConfig {
    /// Window requested from the store. The reconciler never truncates on its
    /// own; a longer view is logged as a feed protocol violation.
    #[serde(default = "FeedConfig::default_capacity")]
    pub capacity: usize,

    #[serde(default)]
    pub ranking: RankingConfig,
}

impl FeedConfig {
    pub(crate) fn default_capacity() -> usize {
        DEFAULT_FEED_LIMIT
    }

    pub fn validate(&self) -> Result<(), FeedConfigError> {
        if self.capacity == 0 {
            return Err(FeedConfigError::Invalid(
                "capacity must be greater than zero".into(),
            ));
        }
        if self.ranking.top_n == 0 {
            return Err(FeedConfigError::Invalid(
                "ranking.top_n must be greater than zero".into(),
            ));
        }
        if self.ranking.unknown_teller.trim().is_empty() {
            return Err(FeedConfigError::Invalid(
                "ranking.unknown_teller must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            capacity: Self::default_capacity(),
            ranking: RankingConfig::default(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FeedConfigError {
    #[error("invalid feed config: {0}")]
    Invalid(String),
}
