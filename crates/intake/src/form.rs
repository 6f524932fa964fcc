//! Submission form sanitization.
//!
//! Form fields are typed by hand and occasionally pasted from terminals, so
//! they get the same treatment: control characters stripped (when enabled),
//! edges trimmed, blanks rejected. The raw ticket blob is only trimmed and
//! length-checked; its line structure is what the parser reads.
use crate::config::IntakeConfig;
use crate::error::IntakeError;
use crate::types::SubmissionForm;

/// Form fields after sanitization. The raw blob is trimmed but otherwise intact.
pub(crate) struct SanitizedForm {
    pub(crate) employee_name: String,
    pub(crate) department: String,
    pub(crate) ticket_type: String,
    pub(crate) description: String,
    pub(crate) raw_input: String,
    pub(crate) submitted_by: String,
}

pub(crate) fn sanitize_form(
    form: SubmissionForm,
    cfg: &IntakeConfig,
) -> Result<SanitizedForm, IntakeError> {
    let SubmissionForm {
        employee_name,
        department,
        ticket_type,
        description,
        raw_input,
        submitted_by,
    } = form;

    let raw_input = raw_input.trim().to_string();
    if raw_input.is_empty() {
        return Err(IntakeError::EmptyInput);
    }
    let chars = raw_input.chars().count();
    if chars > cfg.max_input_chars {
        return Err(IntakeError::InputTooLarge {
            chars,
            limit: cfg.max_input_chars,
        });
    }

    let strip = cfg.strip_control_chars;
    let description = sanitize_optional_string(Some(description), strip).unwrap_or_default();
    if cfg.require_description && description.is_empty() {
        return Err(IntakeError::MissingField("description".into()));
    }

    Ok(SanitizedForm {
        employee_name: sanitize_required_field("employee_name", employee_name, strip)?,
        department: sanitize_required_field("department", department, strip)?,
        ticket_type: sanitize_required_field("ticket_type", ticket_type, strip)?,
        description,
        raw_input,
        submitted_by: sanitize_required_field("submitted_by", submitted_by, strip)?,
    })
}

/// Strips control characters (optionally) and trims; `None` when nothing is left.
pub(crate) fn sanitize_optional_string(
    value: Option<String>,
    strip_control: bool,
) -> Option<String> {
    value.and_then(|raw| {
        let filtered = if strip_control {
            raw.chars().filter(|c| !c.is_control()).collect::<String>()
        } else {
            raw
        };
        let trimmed = filtered.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}

pub(crate) fn sanitize_required_field(
    field: &str,
    value: String,
    strip_control: bool,
) -> Result<String, IntakeError> {
    sanitize_optional_string(Some(value), strip_control)
        .ok_or_else(|| IntakeError::MissingField(field.to_string()))
}
