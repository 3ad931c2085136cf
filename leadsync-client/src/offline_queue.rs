use std::future::Future;
use std::sync::Arc;

use leadsync_core::models::OfflineAction;

use crate::errors::ClientResult;
use crate::storage::{LocalStore, OFFLINE_QUEUE_KEY};

/// Durable FIFO log of mutations recorded while the remote store is
/// unreachable.
///
/// Actions keep submission order: two updates to the same field replay in the
/// order they were made, last write wins at the remote. The queue is consumed
/// only by `drain`.
pub struct OfflineQueue {
    store: Arc<LocalStore>,
}

impl OfflineQueue {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }

    /// Append an action to the durable log. A storage failure is logged and
    /// the action is dropped; the session keeps working.
    pub async fn enqueue(&self, action: OfflineAction) {
        let mut pending = self.pending().await;
        tracing::info!(
            "QUEUE: recording offline {} for lead {}",
            action_kind(&action),
            lead_id(&action),
        );
        pending.push(action);

        if let Err(e) = self.store.write_blob(OFFLINE_QUEUE_KEY, &pending).await {
            tracing::error!("QUEUE: failed to persist offline action: {e}");
        }
    }

    /// Pending actions in submission order. Fail-soft: storage trouble reads
    /// as an empty queue.
    pub async fn pending(&self) -> Vec<OfflineAction> {
        match self.store.read_blob(OFFLINE_QUEUE_KEY).await {
            Ok(Some(actions)) => actions,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::error!("QUEUE: failed to read offline queue, treating as empty: {e}");
                Vec::new()
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.pending().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pending().await.is_empty()
    }

    /// Replay every queued action in FIFO order through `send_fn`.
    ///
    /// Each action is attempted exactly once per drain. The first failure
    /// stops the drain immediately: already-applied actions are consumed, the
    /// failed action and everything after it stay queued untouched, and the
    /// error is returned for the caller to retry a whole drain later. A fully
    /// successful drain clears the log and returns the number of actions
    /// applied. Draining an empty queue never invokes `send_fn`.
    pub async fn drain<F, Fut>(&self, mut send_fn: F) -> ClientResult<usize>
    where
        F: FnMut(OfflineAction) -> Fut,
        Fut: Future<Output = ClientResult<()>>,
    {
        let pending = self.pending().await;
        if pending.is_empty() {
            return Ok(0);
        }

        for (index, action) in pending.iter().enumerate() {
            if let Err(e) = send_fn(action.clone()).await {
                tracing::warn!(
                    "QUEUE: replay halted at action {} of {} ({} for lead {}): {e}",
                    index + 1,
                    pending.len(),
                    action_kind(action),
                    lead_id(action),
                );

                let remaining = pending[index..].to_vec();
                if let Err(persist_err) =
                    self.store.write_blob(OFFLINE_QUEUE_KEY, &remaining).await
                {
                    tracing::error!(
                        "QUEUE: failed to persist {} remaining actions: {persist_err}",
                        remaining.len(),
                    );
                }
                return Err(e);
            }
        }

        let applied = pending.len();
        if let Err(e) = self
            .store
            .write_blob(OFFLINE_QUEUE_KEY, &Vec::<OfflineAction>::new())
            .await
        {
            tracing::error!("QUEUE: drained {applied} actions but failed to clear the log: {e}");
        }

        tracing::info!("QUEUE: drained {applied} offline actions");
        Ok(applied)
    }
}

pub fn lead_id(action: &OfflineAction) -> &str {
    match action {
        OfflineAction::UpdateLead { id, .. } => id,
        OfflineAction::AddNote { id, .. } => id,
    }
}

pub fn action_kind(action: &OfflineAction) -> &'static str {
    match action {
        OfflineAction::UpdateLead { .. } => "update",
        OfflineAction::AddNote { .. } => "note",
    }
}
