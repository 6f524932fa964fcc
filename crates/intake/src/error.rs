//! Error types produced by the intake crate.
//!
//! Parsing itself never fails; an empty parse is reported through
//! [`ParsedRecord::valid`](crate::ParsedRecord::valid). These errors cover the
//! submission gate in front of the store write, where an unparseable blob or a
//! half-filled form must be bounced back to the user.
//!
//! | Error | Meaning | Recoverable by |
//! |-------|---------|----------------|
//! | [`EmptyInput`](IntakeError::EmptyInput) | Raw text blank after trimming | Pasting the ticket text |
//! | [`MissingField`](IntakeError::MissingField) | Required form field blank | Filling the field |
//! | [`InputTooLarge`](IntakeError::InputTooLarge) | Raw text over the char limit | Shortening the paste |
//! | [`ParseAmbiguous`](IntakeError::ParseAmbiguous) | Parser extracted no fields | Re-editing the input |
use thiserror::Error;

/// Errors that can occur while validating a submission.
///
/// ```rust
/// use intake::IntakeError;
///
/// let err = IntakeError::MissingField("department".to_string());
/// assert_eq!(err.to_string(), "required field is empty: department");
/// assert!(err.is_client_error());
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IntakeError {
    /// Raw input was empty or whitespace-only.
    #[error("raw input is empty")]
    EmptyInput,

    /// A required form field was empty after sanitization.
    #[error("required field is empty: {0}")]
    MissingField(String),

    /// Raw input exceeded the configured character limit.
    #[error("raw input has {chars} characters, limit is {limit}")]
    InputTooLarge { chars: usize, limit: usize },

    /// The parser produced no fields from non-empty input.
    #[error("could not parse ticket details, check the format")]
    ParseAmbiguous,
}

impl IntakeError {
    /// Every intake error is caused by user input.
    pub fn is_client_error(&self) -> bool {
        true
    }
}
