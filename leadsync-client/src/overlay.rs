use std::sync::Arc;

use leadsync_core::models::Lead;
use leadsync_core::reminders::{Reminder, ReminderMap};

use crate::storage::{LocalStore, REMINDERS_KEY};

/// The reminder overlay store: lead id to reminder, kept beside the record
/// cache and merged onto leads at read time.
///
/// Reminders never travel through the offline queue or the remote store.
/// Writes are last-write-wins with no versioning. Storage trouble is logged
/// and degrades to an empty map; nothing here returns an error.
pub struct ReminderOverlay {
    store: Arc<LocalStore>,
}

impl ReminderOverlay {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }

    /// Every stored reminder, keyed by lead id.
    pub async fn get(&self) -> ReminderMap {
        match self.store.read_blob(REMINDERS_KEY).await {
            Ok(Some(map)) => map,
            Ok(None) => ReminderMap::new(),
            Err(e) => {
                tracing::error!("REMINDERS: failed to read overlay, treating as empty: {e}");
                ReminderMap::new()
            }
        }
    }

    /// Insert or overwrite (`Some`) or delete (`None`) one lead's reminder.
    pub async fn set(&self, lead_id: &str, reminder: Option<Reminder>) {
        let mut map = self.get().await;
        match reminder {
            Some(reminder) => {
                map.insert(lead_id.to_string(), reminder);
            }
            None => {
                map.remove(lead_id);
            }
        }

        if let Err(e) = self.store.write_blob(REMINDERS_KEY, &map).await {
            tracing::error!("REMINDERS: failed to persist overlay for lead {lead_id}: {e}");
        }
    }

    /// Overlay reminder fields onto a lead list. A lead without an entry gets
    /// its reminder fields cleared, so a deleted reminder disappears from the
    /// merged view.
    pub async fn merge_into(&self, leads: &mut [Lead]) {
        let map = self.get().await;
        for lead in leads.iter_mut() {
            match map.get(&lead.id) {
                Some(reminder) => {
                    lead.reminder_due_at = Some(reminder.due_at);
                    lead.reminder_note = reminder.note.clone();
                }
                None => {
                    lead.reminder_due_at = None;
                    lead.reminder_note = None;
                }
            }
        }
    }
}
