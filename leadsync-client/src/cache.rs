use std::sync::Arc;

use tokio::sync::Mutex;

use leadsync_core::models::{Lead, LeadFields};
use leadsync_core::reminders::Reminder;

use crate::overlay::ReminderOverlay;
use crate::storage::{LocalStore, LEADS_CACHE_KEY};

/// The durable local copy of the lead list plus the in-memory working view.
///
/// Storage failures never propagate out of this type: a failed read degrades
/// to the empty list and a failed write keeps the previous durable state,
/// with the failure logged. The in-memory view always reflects the latest
/// optimistic state; the durable blob only advances on `load`, `replace` and
/// `persist`.
pub struct RecordCache {
    store: Arc<LocalStore>,
    reminders: Arc<ReminderOverlay>,
    records: Mutex<Vec<Lead>>,
}

impl RecordCache {
    pub fn new(store: Arc<LocalStore>, reminders: Arc<ReminderOverlay>) -> Self {
        Self {
            store,
            reminders,
            records: Mutex::new(Vec::new()),
        }
    }

    /// Load the cached lead list, merged with the reminder overlay, and make
    /// it the in-memory view.
    pub async fn load(&self) -> Vec<Lead> {
        let mut leads: Vec<Lead> = match self.store.read_blob(LEADS_CACHE_KEY).await {
            Ok(Some(leads)) => leads,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::error!("CACHE: failed to read lead cache, starting empty: {e}");
                Vec::new()
            }
        };

        self.reminders.merge_into(&mut leads).await;
        *self.records.lock().await = leads.clone();
        leads
    }

    /// Replace the cached list with freshly fetched records: overlay merge,
    /// durable write, then the in-memory view. If the durable write fails the
    /// previous in-memory view stays.
    pub async fn replace(&self, mut leads: Vec<Lead>) -> Vec<Lead> {
        self.reminders.merge_into(&mut leads).await;

        if let Err(e) = self.store.write_blob(LEADS_CACHE_KEY, &leads).await {
            tracing::error!("CACHE: failed to persist replacement lead list: {e}");
            return self.records.lock().await.clone();
        }

        *self.records.lock().await = leads.clone();
        leads
    }

    /// Merge a partial field set into the in-memory view only; an unknown id
    /// is a no-op. Returns the updated sequence. Durable state is untouched
    /// until `persist` confirms the mutation.
    pub async fn apply_fields(&self, id: &str, fields: &LeadFields) -> Vec<Lead> {
        let mut records = self.records.lock().await;
        if let Some(lead) = records.iter_mut().find(|lead| lead.id == id) {
            fields.apply_to(lead);
        }
        records.clone()
    }

    /// Update one lead's reminder fields in the in-memory view.
    pub async fn apply_reminder(&self, id: &str, reminder: Option<&Reminder>) {
        let mut records = self.records.lock().await;
        if let Some(lead) = records.iter_mut().find(|lead| lead.id == id) {
            lead.reminder_due_at = reminder.map(|r| r.due_at);
            lead.reminder_note = reminder.and_then(|r| r.note.clone());
        }
    }

    /// Write the current in-memory view to durable storage. Called once a
    /// remote mutation is confirmed; a failure is logged and the durable
    /// state stays behind until the next refresh.
    pub async fn persist(&self) {
        let snapshot = self.records.lock().await.clone();
        if let Err(e) = self.store.write_blob(LEADS_CACHE_KEY, &snapshot).await {
            tracing::error!("CACHE: failed to persist lead cache: {e}");
        }
    }

    pub async fn records(&self) -> Vec<Lead> {
        self.records.lock().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Lead> {
        self.records
            .lock()
            .await
            .iter()
            .find(|lead| lead.id == id)
            .cloned()
    }
}
