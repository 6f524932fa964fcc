//! YAML Configuration File Support for ticketdesk
//!
//! Loads the intake, store and feed settings from a single YAML file. Every
//! section is optional and falls back to the crate defaults.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "branch-ops"
//!
//! intake:
//!   max_input_chars: 5000
//!   strip_control_chars: true
//!   require_description: false
//!
//! store:
//!   collection: "tickets"
//!   query_timeout_ms: 5000
//!   feed_limit: 100
//!
//! feed:
//!   capacity: 100
//!   ranking:
//!     top_n: 10
//!     offender_threshold: 5
//!     unknown_teller: "Unknown"
//! ```

use std::fs;
use std::path::Path;

use feed::FeedConfig;
use intake::IntakeConfig;
use serde::{Deserialize, Serialize};
use store::StoreConfig;
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct TicketDeskConfig {
    /// Configuration format version
    pub version: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub intake: IntakeConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub feed: FeedConfig,
}

impl TicketDeskConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: TicketDeskConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigLoadError> {
        Ok(serde_yaml::to_string(self)?)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.intake
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("intake: {e}")))?;
        self.store
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("store: {e}")))?;
        self.feed
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("feed: {e}")))?;

        if self.feed.capacity != self.store.feed_limit {
            tracing::warn!(
                feed_capacity = self.feed.capacity,
                store_feed_limit = self.store.feed_limit,
                "feed capacity differs from the store window; the feed setting wins"
            );
        }

        Ok(())
    }
}

impl Default for TicketDeskConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            intake: IntakeConfig::default(),
            store: StoreConfig::default(),
            feed: FeedConfig::default(),
        }
    }
}
