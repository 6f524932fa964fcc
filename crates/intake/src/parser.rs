//! Free-form text → [`ParsedRecord`].
//!
//! Pasted ticket text arrives in one of two shapes:
//!
//! ```text
//! Structured                Unstructured
//! ──────────────            ─────────────────────────────
//! Ticket Code               Type: Hardware
//! ABC123                    Teller - DDN-165
//! Reference Code            printer jams on every second page
//! ef31fb9dc29e4
//! Teller
//! DDN-165
//! ```
//!
//! Detection is global: a single label-then-value pair anywhere in the input
//! switches the whole input to structured mode. Mixed layouts are therefore
//! parsed best-effort and can land values in the wrong bucket.
use std::collections::BTreeMap;

use tracing::debug;

use crate::types::{InputFormat, ParsedRecord, DESCRIPTION_FIELD};

/// Labels must be strictly shorter than this (in chars).
const LABEL_MAX_CHARS: usize = 50;

/// A line longer than this (in chars) reads as a value.
const VALUE_MIN_CHARS: usize = 5;

/// Stored when an unstructured `label:` line carries no value.
pub const MISSING_VALUE: &str = "N/A";

/// Parse pasted text into a [`ParsedRecord`].
///
/// Never fails: input that yields no fields produces a record with
/// `valid == false`. The function is pure, so the same text always produces
/// the same record.
///
/// ```
/// use intake::parse;
///
/// let record = parse("Ticket Code\nABC123\nTeller\nDDN-165");
/// assert!(record.valid);
/// assert_eq!(record.get("ticket_code"), Some("ABC123"));
/// assert_eq!(record.teller(), Some("DDN-165"));
///
/// assert!(!parse("   \n  ").valid);
/// ```
pub fn parse(text: &str) -> ParsedRecord {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let format = detect_format(&lines);
    let fields = match format {
        InputFormat::Empty => BTreeMap::new(),
        InputFormat::Structured => parse_structured(&lines),
        InputFormat::Unstructured => parse_unstructured(&lines),
    };

    ParsedRecord::from_fields(fields, format)
}

/// Classify already-trimmed, non-empty lines.
pub fn detect_format(lines: &[&str]) -> InputFormat {
    if lines.is_empty() {
        return InputFormat::Empty;
    }
    let structured = lines
        .windows(2)
        .any(|pair| looks_like_label(pair[0]) && looks_like_value(pair[1]));
    if structured {
        InputFormat::Structured
    } else {
        InputFormat::Unstructured
    }
}

fn looks_like_label(line: &str) -> bool {
    !line.is_empty()
        && line.chars().count() < LABEL_MAX_CHARS
        && line
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c.is_whitespace() || c == '(' || c == ')')
}

fn looks_like_value(line: &str) -> bool {
    line.contains('-')
        || line.chars().count() > VALUE_MIN_CHARS
        || line.chars().any(|c| c.is_ascii_digit())
}

fn parse_structured(lines: &[&str]) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();
    for pair in lines.chunks(2) {
        match pair {
            [label, value] => {
                let key = normalize_key(label);
                let value = strip_trailing_parenthetical(value);
                if !key.is_empty() && !value.is_empty() {
                    fields.insert(key, value.to_string());
                }
            }
            [orphan] => {
                debug!(orphan_chars = orphan.chars().count(), "structured_orphan_dropped");
            }
            _ => {}
        }
    }
    fields
}

fn parse_unstructured(lines: &[&str]) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();
    for line in lines {
        match split_label_value(line, ':').or_else(|| split_label_value(line, '-')) {
            Some((key, value)) => {
                let value = if value.is_empty() {
                    MISSING_VALUE.to_string()
                } else {
                    value.to_string()
                };
                fields.insert(key, value);
            }
            None => append_description(&mut fields, line),
        }
    }
    fields
}

/// Split at the first `sep`; rejects lines whose label normalizes to nothing.
fn split_label_value(line: &str, sep: char) -> Option<(String, &str)> {
    let (label, value) = line.split_once(sep)?;
    let key = normalize_key(label);
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}

fn append_description(fields: &mut BTreeMap<String, String>, line: &str) {
    fields
        .entry(DESCRIPTION_FIELD.to_string())
        .and_modify(|existing| {
            existing.push('\n');
            existing.push_str(line);
        })
        .or_insert_with(|| line.to_string());
}

/// Normalize a human label into a field key.
///
/// Parenthetical content is dropped, the rest is lowercased, whitespace runs
/// become a single `_`, and anything outside `[a-z0-9_]` is removed.
///
/// ```
/// use intake::normalize_key;
///
/// assert_eq!(normalize_key("Reference Code (optional)"), "reference_code");
/// assert_eq!(normalize_key("E-mail Address"), "email_address");
/// ```
pub fn normalize_key(label: &str) -> String {
    let stripped = strip_parenthetical(label);
    let lowered = stripped.trim().to_lowercase();

    let mut key = String::with_capacity(lowered.len());
    let mut in_whitespace = false;
    for c in lowered.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                key.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_alphanumeric() || c == '_' {
            key.push(c);
        }
    }
    key
}

/// Remove every closed `( … )` group. An unclosed `(` is kept verbatim.
fn strip_parenthetical(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('(') {
        match rest[open..].find(')') {
            Some(close) => {
                out.push_str(&rest[..open]);
                rest = &rest[open + close + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

/// Drop a single trailing `( … )` group, e.g. `DDN-165 (main branch)`.
fn strip_trailing_parenthetical(value: &str) -> &str {
    let trimmed = value.trim();
    let Some(inner_end) = trimmed.strip_suffix(')') else {
        return trimmed;
    };
    match inner_end.rfind('(') {
        Some(open) if !inner_end[open + 1..].contains(')') => inner_end[..open].trim_end(),
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn structured_example() {
        let record =
            parse("Ticket Code\nABC123\nReference Code\nef31fb9dc29e4\nTeller\nDDN-165");
        assert!(record.valid);
        assert_eq!(record.format, InputFormat::Structured);
        assert_eq!(record.len(), 3);
        assert_eq!(record.get("ticket_code"), Some("ABC123"));
        assert_eq!(record.reference_code(), Some("ef31fb9dc29e4"));
        assert_eq!(record.teller(), Some("DDN-165"));
    }

    #[test]
    fn unstructured_example() {
        let record = parse("Type: Hardware\nNotes here without a colon");
        assert!(record.valid);
        assert_eq!(record.format, InputFormat::Unstructured);
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("type"), Some("Hardware"));
        assert_eq!(record.get("description"), Some("Notes here without a colon"));
    }

    #[test]
    fn empty_and_blank_input_is_invalid() {
        for input in ["", "   ", "\n\n\t  \r\n"] {
            let record = parse(input);
            assert!(!record.valid, "input {input:?} should be invalid");
            assert!(record.is_empty());
            assert_eq!(record.format, InputFormat::Empty);
        }
    }

    #[test]
    fn long_input_is_handled() {
        let line = "x".repeat(99);
        let text = std::iter::repeat(line.as_str())
            .take(50)
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(text.chars().count(), 5_000 - 1);
        let record = parse(&text);
        assert!(record.valid);
        assert_eq!(record.format, InputFormat::Unstructured);
        assert_eq!(record.get("description").map(|d| d.lines().count()), Some(50));
    }

    #[test]
    fn parse_is_deterministic() {
        let input = "Teller - DDN-165\nreference code: abc\nsomething else\nmore text";
        assert_eq!(parse(input), parse(input));
    }

    #[test]
    fn structured_strips_parentheticals() {
        let record = parse("Teller (branch)\nDDN-165 (main office)\nAmount (PHP)\n1,500.00");
        assert_eq!(record.teller(), Some("DDN-165"));
        assert_eq!(record.get("amount"), Some("1,500.00"));
    }

    #[test]
    fn structured_skips_pairs_that_clean_to_empty() {
        let record = parse("Teller\n(none)\nReference Code\nREF-1");
        assert_eq!(record.teller(), None);
        assert_eq!(record.reference_code(), Some("REF-1"));
    }

    #[test]
    fn structured_drops_trailing_orphan() {
        let record = parse("Teller\nDDN-165\nLeftover");
        assert_eq!(record.len(), 1);
        assert_eq!(record.teller(), Some("DDN-165"));
    }

    #[test]
    fn unstructured_colon_beats_hyphen() {
        let record = parse("Teller: DDN-165");
        assert_eq!(record.teller(), Some("DDN-165"));

        let record = parse("Teller - DDN-165");
        assert_eq!(record.teller(), Some("DDN-165"));
    }

    #[test]
    fn unstructured_empty_value_becomes_marker() {
        let record = parse("Remarks:\nStatus: open");
        assert_eq!(record.get("remarks"), Some(MISSING_VALUE));
        assert_eq!(record.get("status"), Some("open"));
    }

    #[test]
    fn unstructured_accumulates_description() {
        let record = parse("Type: Printer\nit jams, badly.\nevery morning.");
        assert_eq!(record.get("type"), Some("Printer"));
        assert_eq!(record.get("description"), Some("it jams, badly.\nevery morning."));
    }

    #[test]
    fn last_write_wins_for_repeated_keys() {
        let record = parse("Status: open\nStatus: closed");
        assert_eq!(record.get("status"), Some("closed"));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn symbol_only_label_falls_back_to_description() {
        let record = parse("!!!: loud\nok");
        assert_eq!(record.get("description"), Some("!!!: loud\nok"));
    }

    #[test]
    fn mixed_input_is_classified_globally() {
        // One label/value pair flips the whole input to structured mode.
        let record = parse("Type: Hardware\nTeller\nDDN-165");
        assert_eq!(record.format, InputFormat::Structured);
        assert_eq!(record.get("type"), None);
    }

    #[test]
    fn key_normalization() {
        let cases = [
            ("Ticket Code", "ticket_code"),
            ("Reference   Code", "reference_code"),
            ("Amount (PHP)", "amount"),
            ("E-mail Address", "email_address"),
            ("Teller #", "teller_"),
            ("(only parens)", ""),
        ];
        for (label, expected) in cases {
            assert_eq!(normalize_key(label), expected, "label {label:?}");
        }
    }

    #[test]
    fn label_and_value_heuristics() {
        assert!(looks_like_label("Reference Code"));
        assert!(looks_like_label("Amount (PHP)"));
        assert!(!looks_like_label("Type: Hardware"));
        assert!(!looks_like_label(&"a".repeat(LABEL_MAX_CHARS)));

        assert!(looks_like_value("DDN-165"));
        assert!(looks_like_value("abcdef"));
        assert!(looks_like_value("42"));
        assert!(!looks_like_value("abc"));
    }

    const PASTE_CHARS: &[char] = &[
        'a', 'b', '(', ')', ':', ' ', '-', '\n', '\r', '\t', '1', 'é', '_', '\u{200b}', 'Ä', 'Z',
        '9',
    ];

    fn assert_well_formed(record: &ParsedRecord) {
        assert_eq!(record.valid, !record.fields.is_empty());
        for key in record.fields.keys() {
            assert!(
                key.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'),
                "key {key:?} is not normalized"
            );
        }
    }

    #[test]
    fn exact_length_limit_input_is_handled() {
        let text: String = "Ab(".repeat(1_700).chars().take(5_000).collect();
        assert_eq!(text.chars().count(), 5_000);
        let record = parse(&text);
        assert_well_formed(&record);
        assert_eq!(record, parse(&text));
    }

    proptest! {
        /// Arbitrary pastes never panic and always yield normalized keys.
        #[test]
        fn prop_parse_output_is_well_formed(
            chars in prop::collection::vec(prop::sample::select(PASTE_CHARS), 0..400)
        ) {
            let text: String = chars.into_iter().collect();
            let record = parse(&text);
            prop_assert_eq!(record.valid, !record.fields.is_empty());
            for key in record.fields.keys() {
                prop_assert!(
                    key.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'),
                    "key {:?} is not normalized",
                    key
                );
            }
            prop_assert_eq!(&record, &parse(&text));
        }

        #[test]
        fn prop_arbitrary_unicode_never_panics(text in "\\PC{0,300}") {
            let record = parse(&text);
            prop_assert_eq!(record.valid, !record.fields.is_empty());
        }
    }
}
