use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use leadsync_core::models::{Connectivity, Lead, LeadFields, NotePayload, OfflineAction};
use leadsync_core::notes::{format_note_entry, prepend_note};
use leadsync_core::reminders::Reminder;

use crate::cache::RecordCache;
use crate::errors::{ClientError, ClientResult};
use crate::events::EventDispatcher;
use crate::offline_queue::OfflineQueue;
use crate::overlay::ReminderOverlay;
use crate::remote::RemoteStore;
use crate::session::Session;
use crate::storage::LocalStore;
use crate::sync_engine::{SyncEngine, SyncState};

/// The lead-management client: optimistic local mutations over a durable
/// cache, with offline queuing and connectivity-driven sync.
///
/// Every mutation is applied to the in-memory view immediately, online or
/// offline. Online, the remote write follows; a remote failure keeps the
/// optimistic change and leaves reconciliation to the next successful
/// refresh. Offline, the mutation joins the offline queue and is replayed in
/// submission order when connectivity returns.
pub struct Client {
    cache: Arc<RecordCache>,
    queue: Arc<OfflineQueue>,
    reminders: Arc<ReminderOverlay>,
    remote: Arc<dyn RemoteStore>,
    session: Arc<Session>,
    engine: Arc<SyncEngine>,
    dispatcher: Arc<EventDispatcher>,
    selected: Mutex<Option<Lead>>,
}

impl Client {
    /// Open (creating if needed) the local database and assemble the client.
    ///
    /// Construction never touches the network: call [`Client::start`] or wait
    /// for a connectivity transition to reach the remote store.
    pub async fn new(
        database_url: &str,
        remote: Arc<dyn RemoteStore>,
        initial_connectivity: Connectivity,
    ) -> ClientResult<Self> {
        let store = Arc::new(LocalStore::new(database_url).await?);
        store.init_schema().await?;

        let session = Arc::new(Session::new(initial_connectivity));
        let dispatcher = Arc::new(EventDispatcher::new());
        let reminders = Arc::new(ReminderOverlay::new(Arc::clone(&store)));
        let cache = Arc::new(RecordCache::new(Arc::clone(&store), Arc::clone(&reminders)));
        let queue = Arc::new(OfflineQueue::new(Arc::clone(&store)));

        let engine = Arc::new(SyncEngine::new(
            Arc::clone(&cache),
            Arc::clone(&queue),
            Arc::clone(&remote),
            Arc::clone(&session),
            Arc::clone(&dispatcher),
        ));
        Arc::clone(&engine).spawn_connectivity_listener();

        Ok(Self {
            cache,
            queue,
            reminders,
            remote,
            session,
            engine,
            dispatcher,
            selected: Mutex::new(None),
        })
    }

    pub fn events(&self) -> Arc<EventDispatcher> {
        Arc::clone(&self.dispatcher)
    }

    pub fn is_online(&self) -> bool {
        self.session.is_online()
    }

    pub fn is_syncing(&self) -> bool {
        self.session.is_syncing()
    }

    pub fn sync_state(&self) -> SyncState {
        self.engine.state()
    }

    /// Record a connectivity transition (the external network-status
    /// signal). Moving offline-to-online kicks off a sync cycle through the
    /// background listener.
    pub fn set_connectivity(&self, connectivity: Connectivity) {
        let previous = self.session.set_connectivity(connectivity);
        if previous != connectivity {
            tracing::info!("CLIENT: connectivity is now {connectivity}");
            self.dispatcher
                .emit_connectivity_changed(connectivity.is_online());
        }
    }

    /// Bring the session up the way the UI does on login: surface cached
    /// data immediately, then drain and refresh when online.
    pub async fn start(&self) -> Vec<Lead> {
        let cached = self.cache.load().await;
        if !self.session.is_online() {
            return cached;
        }

        if let Err(e) = self.engine.sync().await {
            tracing::warn!("CLIENT: initial sync failed: {e}");
        }
        self.cache.records().await
    }

    /// Cached leads merged with the reminder overlay, installed as the
    /// in-memory view.
    pub async fn load_leads(&self) -> Vec<Lead> {
        self.cache.load().await
    }

    /// The current in-memory view.
    pub async fn leads(&self) -> Vec<Lead> {
        self.cache.records().await
    }

    pub async fn lead(&self, id: &str) -> Option<Lead> {
        self.cache.get(id).await
    }

    pub async fn pending_actions(&self) -> usize {
        self.queue.len().await
    }

    /// Run a drain-then-refresh cycle now.
    pub async fn sync(&self) -> ClientResult<()> {
        self.engine.sync().await
    }

    /// Reload the cache from the remote store.
    pub async fn refresh(&self) -> ClientResult<Vec<Lead>> {
        self.engine.refresh().await
    }

    // --- selection: the display-bound copy ---

    /// Mark a lead as displayed. Mutations targeting it are mirrored into
    /// the returned copy until the selection changes.
    pub async fn select_lead(&self, id: &str) -> Option<Lead> {
        let lead = self.cache.get(id).await;
        *self.selected.lock().await = lead.clone();
        lead
    }

    pub async fn selected_lead(&self) -> Option<Lead> {
        self.selected.lock().await.clone()
    }

    pub async fn clear_selection(&self) {
        *self.selected.lock().await = None;
    }

    async fn patch_selected(&self, id: &str, fields: &LeadFields) {
        let mut selected = self.selected.lock().await;
        if let Some(lead) = selected.as_mut() {
            if lead.id == id {
                fields.apply_to(lead);
            }
        }
    }

    // --- optimistic mutations ---

    /// Patch a subset of fields on one lead.
    ///
    /// The in-memory view (and the selected copy) updates unconditionally.
    /// Online, the remote write follows: success confirms the change into
    /// the durable cache; failure emits [`RemoteSaveFailed`] and returns the
    /// error WITHOUT rolling back, leaving the durable cache behind so the
    /// next successful refresh reconciles from the remote source of truth.
    /// Offline, the patch joins the offline queue.
    ///
    /// [`RemoteSaveFailed`]: crate::events::ClientEvent::RemoteSaveFailed
    pub async fn update_lead(&self, id: &str, fields: LeadFields) -> ClientResult<()> {
        self.cache.apply_fields(id, &fields).await;
        self.patch_selected(id, &fields).await;

        if !self.session.is_online() {
            self.queue
                .enqueue(OfflineAction::UpdateLead {
                    id: id.to_string(),
                    fields,
                })
                .await;
            return Ok(());
        }

        match self.remote.patch_fields(id, &fields).await {
            Ok(()) => {
                self.cache.persist().await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("CLIENT: remote patch for lead {id} failed: {e}");
                self.dispatcher.emit_remote_save_failed(id, e.to_string());
                Err(e.into())
            }
        }
    }

    /// Append a note to a lead's communication log.
    ///
    /// The entry is formatted with the client clock at apply time so the
    /// local view matches what the remote will eventually hold; the remote
    /// formats the raw text independently with its own clock, so the two
    /// renderings are not guaranteed to match byte for byte.
    pub async fn add_note(&self, id: &str, note_text: &str, rep_name: &str) -> ClientResult<()> {
        if note_text.trim().is_empty() {
            return Err(ClientError::Validation("note text required".to_string()));
        }

        let entry = format_note_entry(note_text, rep_name, Utc::now());
        let existing = self
            .cache
            .get(id)
            .await
            .map(|lead| lead.notes)
            .unwrap_or_default();
        let fields = LeadFields {
            notes: Some(prepend_note(&existing, &entry)),
            ..LeadFields::default()
        };

        self.cache.apply_fields(id, &fields).await;
        self.patch_selected(id, &fields).await;

        if !self.session.is_online() {
            self.queue
                .enqueue(OfflineAction::AddNote {
                    id: id.to_string(),
                    note_text: note_text.to_string(),
                    rep_name: rep_name.to_string(),
                })
                .await;
            return Ok(());
        }

        let payload = NotePayload {
            note_text: note_text.to_string(),
            rep_name: rep_name.to_string(),
        };
        match self.remote.append_note(id, &payload).await {
            Ok(()) => {
                self.cache.persist().await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("CLIENT: remote note append for lead {id} failed: {e}");
                self.dispatcher.emit_remote_save_failed(id, e.to_string());
                Err(e.into())
            }
        }
    }

    // --- reminders: the local-only overlay ---

    /// Set (`Some`) or clear (`None`) the reminder for a lead. Reminders
    /// live in the local overlay only: they are never queued and never reach
    /// the remote store.
    pub async fn set_reminder(&self, id: &str, reminder: Option<Reminder>) {
        self.reminders.set(id, reminder.clone()).await;
        self.cache.apply_reminder(id, reminder.as_ref()).await;

        let mut selected = self.selected.lock().await;
        if let Some(lead) = selected.as_mut() {
            if lead.id == id {
                lead.reminder_due_at = reminder.as_ref().map(|r| r.due_at);
                lead.reminder_note = reminder.as_ref().and_then(|r| r.note.clone());
            }
        }
    }

    /// Set a reminder from raw form input ("YYYY-MM-DDTHH:MM" plus an
    /// optional note). An empty date is a validation error.
    pub async fn set_reminder_input(
        &self,
        id: &str,
        due_at: &str,
        note: &str,
    ) -> ClientResult<()> {
        if due_at.trim().is_empty() {
            return Err(ClientError::Validation(
                "a reminder needs a date and time".to_string(),
            ));
        }

        let reminder = Reminder::from_input(due_at, note)?;
        self.set_reminder(id, Some(reminder)).await;
        Ok(())
    }

    pub async fn clear_reminder(&self, id: &str) {
        self.set_reminder(id, None).await;
    }
}
