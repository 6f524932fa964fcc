//! Configuration for the intake gate.
//!
//! ```rust
//! use intake::IntakeConfig;
//!
//! let config = IntakeConfig::default();
//! assert_eq!(config.max_input_chars, 5_000);
//! config.validate().expect("default config is valid");
//! ```
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Runtime configuration for [`intake`](crate::intake).
///
/// Serializable so it can be embedded in the top-level YAML config:
///
/// ```yaml
/// intake:
///   max_input_chars: 5000
///   strip_control_chars: true
///   require_description: false
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IntakeConfig {
    /// Maximum raw input length, counted in chars rather than bytes.
    ///
    /// Default: `5000`
    #[serde(default = "IntakeConfig::default_max_input_chars")]
    pub max_input_chars: usize,

    /// Strip control characters from form fields (not from the raw blob,
    /// whose newlines carry structure).
    ///
    /// Default: `true`
    #[serde(default = "IntakeConfig::default_strip_control_chars")]
    pub strip_control_chars: bool,

    /// Reject submissions whose free-text description is blank.
    ///
    /// Default: `false`
    #[serde(default)]
    pub require_description: bool,
}

impl IntakeConfig {
    pub(crate) fn default_max_input_chars() -> usize {
        5_000
    }

    pub(crate) fn default_strip_control_chars() -> bool {
        true
    }

    /// Check the configuration before handling traffic.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_input_chars == 0 {
            return Err(ConfigError::ZeroInputLimit);
        }
        Ok(())
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_input_chars: Self::default_max_input_chars(),
            strip_control_chars: Self::default_strip_control_chars(),
            require_description: false,
        }
    }
}

/// Errors raised by [`IntakeConfig::validate`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// `max_input_chars` was zero, which would reject every submission.
    #[error("max_input_chars must be greater than zero")]
    ZeroInputLimit,
}
