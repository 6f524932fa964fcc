//! Ticket Intake Layer
//!
//! This is where tickets enter the system. A support agent pastes whatever the
//! branch system printed (a label/value dump, a chat message, a half-filled
//! template) and we turn it into a structured record that the duplicate guard
//! and the live views can work with.
//!
//! ## What we do here
//!
//! - **Parse free-form text** - [`parse`] detects the layout (alternating
//!   label/value lines or `label: value` lines mixed with prose) and extracts
//!   normalized fields. It never fails; an empty parse is `valid == false`.
//! - **Gate submissions** - [`intake`] sanitizes the form fields, enforces the
//!   raw input size limit, rejects unparseable input, and builds the
//!   [`NewTicket`] that gets written to the store.
//! - **Own the data model** - [`TicketRecord`] is what the store persists and
//!   what the change feed delivers to every live view.
//! - **Log it** - Structured logs via tracing, one event per submission.
//!
//! ## Example
//!
//! ```
//! use intake::{intake, IntakeConfig, SubmissionForm};
//!
//! let form = SubmissionForm {
//!     employee_name: "Ana Cruz".into(),
//!     department: "Branch Ops".into(),
//!     ticket_type: "Reversal".into(),
//!     description: String::new(),
//!     raw_input: "Reference Code\nef31fb9dc29e4\nTeller\nDDN-165".into(),
//!     submitted_by: "ana@example.com".into(),
//! };
//!
//! let ticket = intake(form, &IntakeConfig::default()).unwrap();
//! assert_eq!(ticket.parsed_data.teller(), Some("DDN-165"));
//! ```
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{info, warn, Level};

mod config;
mod error;
mod form;
mod parser;
mod types;

use crate::form::sanitize_form;

pub use crate::config::{ConfigError, IntakeConfig};
pub use crate::error::IntakeError;
pub use crate::parser::{detect_format, normalize_key, parse, MISSING_VALUE};
pub use crate::types::{
    InputFormat, NewTicket, ParsedRecord, SubmissionForm, TicketRecord, DESCRIPTION_FIELD,
    REFERENCE_CODE_FIELD, TELLER_FIELD,
};

/// Validate a submission form and parse its raw input, stamped with the current time.
pub fn intake(form: SubmissionForm, cfg: &IntakeConfig) -> Result<NewTicket, IntakeError> {
    intake_at(form, cfg, Utc::now())
}

/// Same as [`intake`] with an explicit submission timestamp.
pub fn intake_at(
    form: SubmissionForm,
    cfg: &IntakeConfig,
    submitted_at: DateTime<Utc>,
) -> Result<NewTicket, IntakeError> {
    let start = Instant::now();
    let span = tracing::span!(Level::INFO, "intake.intake", submitted_by = %form.submitted_by);
    let _guard = span.enter();

    match intake_inner(form, cfg, submitted_at) {
        Ok(ticket) => {
            info!(
                fields = ticket.parsed_data.len(),
                format = ?ticket.parsed_data.format,
                has_duplicate_key = ticket.parsed_data.reference_code().is_some()
                    && ticket.parsed_data.teller().is_some(),
                elapsed_micros = start.elapsed().as_micros(),
                "intake_success"
            );
            Ok(ticket)
        }
        Err(err) => {
            warn!(
                error = %err,
                elapsed_micros = start.elapsed().as_micros(),
                "intake_failure"
            );
            Err(err)
        }
    }
}

fn intake_inner(
    form: SubmissionForm,
    cfg: &IntakeConfig,
    submitted_at: DateTime<Utc>,
) -> Result<NewTicket, IntakeError> {
    let form = sanitize_form(form, cfg)?;

    let parsed = parse(&form.raw_input);
    if !parsed.is_valid() {
        return Err(IntakeError::ParseAmbiguous);
    }

    Ok(NewTicket {
        employee_name: form.employee_name,
        department: form.department,
        raw_input: form.raw_input,
        parsed_data: parsed,
        ticket_type: form.ticket_type,
        description: form.description,
        submitted_at,
        submitted_by: form.submitted_by,
    })
}
