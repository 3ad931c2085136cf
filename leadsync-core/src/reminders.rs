//! Per-lead reminders.
//!
//! Reminders are a local-only overlay on lead records: stored beside the
//! record cache, merged onto leads at read time, and never written to the
//! remote store. A reminder lives until it is explicitly cleared; firing or
//! going overdue only changes how it is displayed.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Lead;

/// Format produced by datetime-local form controls, e.g. "2024-12-25T10:30".
pub const REMINDER_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    #[serde(rename = "ReminderDateTime")]
    pub due_at: DateTime<Utc>,

    #[serde(rename = "ReminderNote", default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Reminder {
    /// Parse raw form input. An empty note becomes `None`.
    pub fn from_input(due_at: &str, note: &str) -> Result<Self, chrono::ParseError> {
        let due = NaiveDateTime::parse_from_str(due_at.trim(), REMINDER_INPUT_FORMAT)?;
        let note = note.trim();
        Ok(Self {
            due_at: due.and_utc(),
            note: (!note.is_empty()).then(|| note.to_string()),
        })
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_at < now
    }
}

/// The overlay store's value: lead id to reminder.
pub type ReminderMap = HashMap<String, Reminder>;

/// Leads carrying a reminder, soonest due first.
pub fn upcoming(leads: &[Lead]) -> Vec<&Lead> {
    let mut with_reminders: Vec<&Lead> = leads
        .iter()
        .filter(|lead| lead.reminder_due_at.is_some())
        .collect();
    with_reminders.sort_by_key(|lead| lead.reminder_due_at);
    with_reminders
}

/// Human-readable distance between `target` and `now`, e.g. "3 days ago",
/// "2 hours from now", or "just now" within five seconds.
pub fn format_distance(target: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - target).num_seconds();
    if seconds.abs() < 5 {
        return "just now".to_string();
    }

    let suffix = if seconds > 0 { "ago" } else { "from now" };
    let abs = seconds.abs();

    const UNITS: [(i64, &str); 5] = [
        (31_536_000, "year"),
        (2_592_000, "month"),
        (86_400, "day"),
        (3_600, "hour"),
        (60, "minute"),
    ];

    for (length, unit) in UNITS {
        if abs > length {
            let count = abs / length;
            let plural = if count > 1 { "s" } else { "" };
            return format!("{count} {unit}{plural} {suffix}");
        }
    }

    let plural = if abs > 1 { "s" } else { "" };
    format!("{abs} second{plural} {suffix}")
}
