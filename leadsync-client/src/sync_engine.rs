use std::sync::Arc;

use tokio::sync::watch;
use uuid::Uuid;

use leadsync_core::models::{Connectivity, Lead, NotePayload, OfflineAction};

use crate::cache::RecordCache;
use crate::errors::ClientResult;
use crate::events::EventDispatcher;
use crate::offline_queue::OfflineQueue;
use crate::remote::RemoteStore;
use crate::session::Session;

/// Sync cycle phase, published through a watch channel so the UI can follow
/// a cycle as it moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No cycle in flight.
    Idle,
    /// Replaying the offline action queue against the remote store.
    Draining,
    /// Reloading the record cache from the remote store.
    Refreshing,
}

impl std::fmt::Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Draining => write!(f, "Draining"),
            Self::Refreshing => write!(f, "Refreshing"),
        }
    }
}

/// Drives drain-then-refresh cycles against the remote store.
///
/// A cycle runs on every offline-to-online transition (through the spawned
/// connectivity listener) or on demand via `sync`. The session's syncing
/// flag keeps cycles non-reentrant; a triggered cycle that finds one already
/// in flight is dropped, not queued.
pub struct SyncEngine {
    cache: Arc<RecordCache>,
    queue: Arc<OfflineQueue>,
    remote: Arc<dyn RemoteStore>,
    session: Arc<Session>,
    dispatcher: Arc<EventDispatcher>,
    state: watch::Sender<SyncState>,
}

impl SyncEngine {
    pub fn new(
        cache: Arc<RecordCache>,
        queue: Arc<OfflineQueue>,
        remote: Arc<dyn RemoteStore>,
        session: Arc<Session>,
        dispatcher: Arc<EventDispatcher>,
    ) -> Self {
        let (state, _) = watch::channel(SyncState::Idle);
        Self {
            cache,
            queue,
            remote,
            session,
            dispatcher,
            state,
        }
    }

    pub fn state(&self) -> SyncState {
        *self.state.borrow()
    }

    /// Watch state transitions (Idle -> Draining -> Refreshing -> Idle).
    pub fn state_receiver(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    fn set_state(&self, state: SyncState) {
        self.state.send_replace(state);
    }

    /// Spawn the background task that runs a sync cycle on every
    /// offline-to-online transition.
    pub fn spawn_connectivity_listener(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut rx = self.session.subscribe();
            let mut previous = *rx.borrow();
            while rx.changed().await.is_ok() {
                let current = *rx.borrow();
                if previous == Connectivity::Offline && current == Connectivity::Online {
                    tracing::info!("SYNC: connectivity restored, starting sync cycle");
                    if let Err(e) = self.sync().await {
                        tracing::error!("SYNC: cycle after reconnect failed: {e}");
                    }
                }
                previous = current;
            }
            tracing::debug!("SYNC: connectivity listener stopped");
        });
    }

    /// Run one drain-then-refresh cycle.
    ///
    /// A cycle already in flight makes this a no-op. A drain failure is
    /// returned to the caller after the failure notice fires; the queue keeps
    /// the unapplied suffix and nothing retries until the next trigger. A
    /// refresh failure degrades to cached data and does not fail the cycle.
    pub async fn sync(&self) -> ClientResult<()> {
        if !self.session.try_begin_sync() {
            tracing::debug!("SYNC: cycle already in flight, skipping");
            return Ok(());
        }

        let result = self.run_cycle().await;
        self.set_state(SyncState::Idle);
        self.session.end_sync();
        result
    }

    async fn run_cycle(&self) -> ClientResult<()> {
        let pending = self.queue.len().await;
        if pending > 0 {
            self.set_state(SyncState::Draining);
            self.dispatcher.emit_sync_started();
            tracing::info!("SYNC: draining {pending} offline actions");

            let drained = self
                .queue
                .drain(|action| {
                    let remote = Arc::clone(&self.remote);
                    async move { replay_action(remote, action).await }
                })
                .await;

            match drained {
                Ok(applied) => self.dispatcher.emit_sync_completed(applied),
                Err(e) => {
                    self.dispatcher.emit_sync_failed(e.to_string());
                    return Err(e);
                }
            }
        }

        self.set_state(SyncState::Refreshing);
        if let Err(e) = self.refresh().await {
            tracing::warn!("SYNC: refresh failed, keeping cached data: {e}");
            self.dispatcher.emit_refresh_failed(e.to_string());
        }
        Ok(())
    }

    /// Fetch every lead from the remote store and replace the cache.
    ///
    /// Fetched records lacking an identifier get one generated here; each
    /// assignment is written back by a spawned task whose failure is logged
    /// and otherwise ignored, so the load itself never blocks on it.
    pub async fn refresh(&self) -> ClientResult<Vec<Lead>> {
        let mut leads = self.remote.fetch_all().await?;
        self.backfill_identifiers(&mut leads);

        let leads = self.cache.replace(leads).await;
        self.dispatcher.emit_leads_refreshed(leads.len());
        Ok(leads)
    }

    fn backfill_identifiers(&self, leads: &mut [Lead]) {
        for (position, lead) in leads.iter_mut().enumerate() {
            if !lead.id.is_empty() {
                continue;
            }

            let id = Uuid::new_v4().to_string();
            lead.id = id.clone();
            tracing::info!("SYNC: assigned id {id} to lead at row {position}");

            let remote = Arc::clone(&self.remote);
            tokio::spawn(async move {
                if let Err(e) = remote.persist_identifier(position, &id).await {
                    tracing::warn!(
                        "SYNC: failed to persist generated id {id} for row {position}: {e}"
                    );
                }
            });
        }
    }
}

async fn replay_action(remote: Arc<dyn RemoteStore>, action: OfflineAction) -> ClientResult<()> {
    match action {
        OfflineAction::UpdateLead { id, fields } => {
            remote.patch_fields(&id, &fields).await?;
        }
        OfflineAction::AddNote {
            id,
            note_text,
            rep_name,
        } => {
            let payload = NotePayload {
                note_text,
                rep_name,
            };
            remote.append_note(&id, &payload).await?;
        }
    }
    Ok(())
}
