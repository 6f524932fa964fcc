use intake::IntakeError;
use store::StoreError;
use thiserror::Error;

/// Why a submission did not produce a stored ticket.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubmitError {
    /// The form or raw input was rejected before any store call.
    #[error("intake rejected: {0}")]
    Intake(#[from] IntakeError),

    /// A ticket with the same reference code and teller already exists.
    #[error("duplicate ticket: reference code {reference_code} for teller {teller} already exists")]
    Duplicate {
        reference_code: String,
        teller: String,
    },

    /// The duplicate query or the write failed.
    #[error("store failure: {0}")]
    Store(#[from] StoreError),

    /// Another submission from this submitter has not finished yet.
    #[error("a submission is already in flight")]
    InFlight,
}

impl SubmitError {
    /// Whether the user can fix the problem by editing the form.
    pub fn is_client_error(&self) -> bool {
        match self {
            SubmitError::Intake(err) => err.is_client_error(),
            SubmitError::Duplicate { .. } => true,
            SubmitError::Store(_) | SubmitError::InFlight => false,
        }
    }

    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SubmitError::Intake(IntakeError::ParseAmbiguous) => "parse_ambiguous",
            SubmitError::Intake(_) => "invalid_form",
            SubmitError::Duplicate { .. } => "duplicate",
            SubmitError::Store(_) => "store_unavailable",
            SubmitError::InFlight => "in_flight",
        }
    }
}
