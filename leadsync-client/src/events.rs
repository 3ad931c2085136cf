//! User-facing notifications from the sync client.
//!
//! The embedding UI registers callbacks to hear about sync cycles,
//! refreshes, remote save failures and connectivity changes. Callbacks run
//! inline on the emitting task, so they should be cheap and must not block.

use std::sync::Mutex;

use crate::errors::{ClientError, ClientResult};

/// Events surfaced to the embedding UI.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// An offline-queue drain began; the UI should block mutating
    /// interactions until the cycle finishes.
    SyncStarted,

    /// The drain finished; `applied` offline actions reached the remote.
    SyncCompleted { applied: usize },

    /// The drain halted on a failure. Unapplied actions stay queued for the
    /// next connectivity restoration or manual sync.
    SyncFailed { message: String },

    /// A refresh failed; cached data remains on display.
    RefreshFailed { message: String },

    /// The cache was replaced with freshly fetched records.
    LeadsRefreshed { count: usize },

    /// An online optimistic mutation failed remotely. The local change is
    /// kept; the next successful refresh reconciles it.
    RemoteSaveFailed { lead_id: String, message: String },

    /// The connectivity flag changed.
    ConnectivityChanged { online: bool },
}

type EventCallback = Box<dyn Fn(&ClientEvent) + Send + Sync>;

/// Fan-out dispatcher for [`ClientEvent`]s.
pub struct EventDispatcher {
    callbacks: Mutex<Vec<EventCallback>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            callbacks: Mutex::new(Vec::new()),
        }
    }

    /// Register a callback invoked for every event.
    pub fn register<F>(&self, callback: F) -> ClientResult<()>
    where
        F: Fn(&ClientEvent) + Send + Sync + 'static,
    {
        let mut callbacks = self
            .callbacks
            .lock()
            .map_err(|e| ClientError::Lock(e.to_string()))?;
        callbacks.push(Box::new(callback));
        Ok(())
    }

    pub fn emit(&self, event: ClientEvent) {
        let Ok(callbacks) = self.callbacks.lock() else {
            tracing::error!("EVENTS: dropping {event:?}, callback registry poisoned");
            return;
        };
        for callback in callbacks.iter() {
            callback(&event);
        }
    }

    pub fn emit_sync_started(&self) {
        self.emit(ClientEvent::SyncStarted);
    }

    pub fn emit_sync_completed(&self, applied: usize) {
        self.emit(ClientEvent::SyncCompleted { applied });
    }

    pub fn emit_sync_failed(&self, message: impl Into<String>) {
        self.emit(ClientEvent::SyncFailed {
            message: message.into(),
        });
    }

    pub fn emit_refresh_failed(&self, message: impl Into<String>) {
        self.emit(ClientEvent::RefreshFailed {
            message: message.into(),
        });
    }

    pub fn emit_leads_refreshed(&self, count: usize) {
        self.emit(ClientEvent::LeadsRefreshed { count });
    }

    pub fn emit_remote_save_failed(&self, lead_id: &str, message: impl Into<String>) {
        self.emit(ClientEvent::RemoteSaveFailed {
            lead_id: lead_id.to_string(),
            message: message.into(),
        });
    }

    pub fn emit_connectivity_changed(&self, online: bool) {
        self.emit(ClientEvent::ConnectivityChanged { online });
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
