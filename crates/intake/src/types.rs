//! Core data model types for the intake crate.
//!
//! These types describe what a submission looks like before it is parsed, the
//! structured record the parser extracts from free-form text, and the ticket
//! entity that the store persists and the change feed delivers.
//!
//! # Type Hierarchy
//!
//! ```text
//! SubmissionForm
//! ├── employee_name: String
//! ├── department: String
//! ├── ticket_type: String
//! ├── description: String
//! ├── raw_input: String          ──► parse() ──► ParsedRecord
//! └── submitted_by: String                       ├── fields: BTreeMap<String, String>
//!                                                ├── valid: bool
//!         ↓ intake()                             └── format: InputFormat
//!
//! NewTicket (everything but the id)
//!
//!         ↓ TicketStore::insert()
//!
//! TicketRecord (id assigned by the store)
//! ```
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Field carrying the external transaction reference, half of the duplicate key.
pub const REFERENCE_CODE_FIELD: &str = "reference_code";

/// Field carrying the teller identifier, the other half of the duplicate key.
pub const TELLER_FIELD: &str = "teller";

/// Field that collects free-text lines the parser could not split.
pub const DESCRIPTION_FIELD: &str = "description";

/// Layout the parser detected for a piece of input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    /// No non-blank lines were found.
    #[default]
    Empty,
    /// Alternating label line / value line.
    Structured,
    /// `label: value` / `label - value` lines mixed with free text.
    Unstructured,
}

/// Structured view of a pasted text blob.
///
/// Keys are normalized field names (`[a-z0-9_]`), values are trimmed. A key
/// appears at most once; when the parser produces the same key twice the last
/// value wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ParsedRecord {
    pub fields: BTreeMap<String, String>,
    /// True iff at least one field was extracted.
    pub valid: bool,
    #[serde(default)]
    pub format: InputFormat,
}

impl ParsedRecord {
    pub(crate) fn from_fields(fields: BTreeMap<String, String>, format: InputFormat) -> Self {
        let valid = !fields.is_empty();
        Self {
            fields,
            valid,
            format,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn reference_code(&self) -> Option<&str> {
        self.get(REFERENCE_CODE_FIELD)
    }

    pub fn teller(&self) -> Option<&str> {
        self.get(TELLER_FIELD)
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Everything the form collaborator hands over on submit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SubmissionForm {
    pub employee_name: String,
    pub department: String,
    pub ticket_type: String,
    /// Free-text summary typed next to the pasted blob. May be empty.
    #[serde(default)]
    pub description: String,
    pub raw_input: String,
    pub submitted_by: String,
}

/// A validated ticket that has not been written yet.
///
/// This is the store write payload: a [`TicketRecord`] minus the `id`, which
/// the store assigns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTicket {
    pub employee_name: String,
    pub department: String,
    pub raw_input: String,
    pub parsed_data: ParsedRecord,
    pub ticket_type: String,
    pub description: String,
    pub submitted_at: DateTime<Utc>,
    pub submitted_by: String,
}

impl NewTicket {
    /// Attach a store-assigned identifier.
    pub fn into_record(self, id: impl Into<String>) -> TicketRecord {
        TicketRecord {
            id: id.into(),
            employee_name: self.employee_name,
            department: self.department,
            raw_input: self.raw_input,
            parsed_data: self.parsed_data,
            ticket_type: self.ticket_type,
            description: self.description,
            submitted_at: self.submitted_at,
            submitted_by: self.submitted_by,
        }
    }
}

/// The persisted ticket entity as the change feed delivers it.
///
/// The intake core never mutates a record after creation; review status and
/// similar fields belong to an external workflow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TicketRecord {
    pub id: String,
    pub employee_name: String,
    pub department: String,
    pub raw_input: String,
    pub parsed_data: ParsedRecord,
    #[serde(rename = "type")]
    pub ticket_type: String,
    pub description: String,
    pub submitted_at: DateTime<Utc>,
    pub submitted_by: String,
}

impl TicketRecord {
    pub fn teller(&self) -> Option<&str> {
        self.parsed_data.teller()
    }

    pub fn reference_code(&self) -> Option<&str> {
        self.parsed_data.reference_code()
    }
}
