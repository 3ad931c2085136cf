//! Communication-log entry formatting.
//!
//! The client renders an entry at optimistic-apply time and the remote store
//! renders the same raw text independently when the write lands, so both
//! sides need the exact same rules: a timestamp prefix, the rep name (with a
//! fallback when blank), and newest-first prepending with a blank line
//! between entries.

use chrono::{DateTime, Utc};

/// Timestamp prefix for log entries, e.g. "04/08/2026 14:05".
pub const NOTE_TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M";

pub const UNKNOWN_REP: &str = "Unknown Rep";

/// Render a single log entry: `<timestamp> - <rep>: <text>`.
pub fn format_note_entry(text: &str, rep_name: &str, at: DateTime<Utc>) -> String {
    let rep = if rep_name.trim().is_empty() {
        UNKNOWN_REP
    } else {
        rep_name
    };
    format!("{} - {}: {}", at.format(NOTE_TIMESTAMP_FORMAT), rep, text)
}

/// Prepend `entry` to an existing log, blank-line separated. An empty log
/// gets no separator.
pub fn prepend_note(existing: &str, entry: &str) -> String {
    if existing.is_empty() {
        entry.to_string()
    } else {
        format!("{entry}\n\n{existing}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_note_entry() {
        let at = Utc.with_ymd_and_hms(2024, 12, 25, 10, 30, 45).unwrap();
        assert_eq!(
            format_note_entry("Called, no answer", "Alice", at),
            "25/12/2024 10:30 - Alice: Called, no answer"
        );
    }

    #[test]
    fn test_format_note_entry_unknown_rep() {
        let at = Utc.with_ymd_and_hms(2024, 12, 25, 10, 30, 0).unwrap();
        assert_eq!(
            format_note_entry("Left voicemail", "  ", at),
            "25/12/2024 10:30 - Unknown Rep: Left voicemail"
        );
    }

    #[test]
    fn test_prepend_note() {
        assert_eq!(prepend_note("", "first entry"), "first entry");
        assert_eq!(
            prepend_note("first entry", "second entry"),
            "second entry\n\nfirst entry"
        );
    }
}
